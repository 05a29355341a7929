/// Tunable rules constants.
///
/// `Default` reproduces the standard rules; callers may load overrides from
/// a rules file.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RulesConfig {
    /// Maneuver save DC when the maneuver user is a monster.
    pub monster_maneuver_dc: i32,
    pub ai: AiWeights,
}

impl RulesConfig {
    pub const DEFAULT_MONSTER_MANEUVER_DC: i32 = 10;

    pub fn new() -> Self {
        Self {
            monster_maneuver_dc: Self::DEFAULT_MONSTER_MANEUVER_DC,
            ai: AiWeights::default(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Monster AI target scoring and bonus-action thresholds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiWeights {
    // ===== target scoring =====
    pub base_score: i32,
    /// Subtracted per foot of distance to the target.
    pub distance_penalty: i32,
    /// Added when the target is below a quarter of its max HP.
    pub critical_hp_bonus: i32,
    /// Added when the target is below half of its max HP.
    pub bloodied_bonus: i32,
    pub spellcaster_bonus: i32,
    pub concentration_bonus: i32,

    // ===== bonus-action thresholds =====
    /// Second Wind when HP is below this percentage of max.
    pub second_wind_hp_percent: u32,
    /// Disengage when HP is below this percentage of max...
    pub disengage_hp_percent: u32,
    /// ...and at least this many enemies are adjacent.
    pub disengage_min_adjacent: usize,
    /// Dash when no enemy is adjacent and the nearest is farther than this.
    pub dash_distance_ft: u32,
}

impl Default for AiWeights {
    fn default() -> Self {
        Self {
            base_score: 100,
            distance_penalty: 2,
            critical_hp_bonus: 40,
            bloodied_bonus: 20,
            spellcaster_bonus: 15,
            concentration_bonus: 25,
            second_wind_hp_percent: 50,
            disengage_hp_percent: 40,
            disengage_min_adjacent: 2,
            dash_distance_ft: 15,
        }
    }
}
