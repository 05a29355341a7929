//! Sparse level-keyed tables.

/// Values that change at specific character levels.
///
/// Entries are kept sorted by level; [`at`](LevelTable::at) returns the value
/// of the highest threshold not exceeding the queried level.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Vec<(u32, T)>", into = "Vec<(u32, T)>"))]
#[cfg_attr(feature = "serde", serde(bound(serialize = "T: Clone + serde::Serialize")))]
#[cfg_attr(feature = "serde", serde(bound(deserialize = "T: serde::Deserialize<'de>")))]
pub struct LevelTable<T> {
    entries: Vec<(u32, T)>,
}

impl<T> LevelTable<T> {
    pub fn new(entries: impl IntoIterator<Item = (u32, T)>) -> Self {
        let mut entries: Vec<(u32, T)> = entries.into_iter().collect();
        entries.sort_by_key(|(level, _)| *level);
        Self { entries }
    }

    pub fn at(&self, level: u32) -> Option<&T> {
        level_lookup(&self.entries, level)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(u32, T)] {
        &self.entries
    }
}

impl<T> Default for LevelTable<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

/// Value of the highest threshold not exceeding `level` in a level-sorted slice.
pub fn level_lookup<T>(entries: &[(u32, T)], level: u32) -> Option<&T> {
    let idx = entries.partition_point(|(threshold, _)| *threshold <= level);
    idx.checked_sub(1).map(|i| &entries[i].1)
}

impl<T> From<Vec<(u32, T)>> for LevelTable<T> {
    fn from(entries: Vec<(u32, T)>) -> Self {
        Self::new(entries)
    }
}

impl<T: Clone> From<LevelTable<T>> for Vec<(u32, T)> {
    fn from(table: LevelTable<T>) -> Self {
        table.entries
    }
}
