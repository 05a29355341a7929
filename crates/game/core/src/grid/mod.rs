//! Battle grid, distance rules, line of sight and pathfinding.
//!
//! The grid is immutable once built for an encounter. Occupancy is never
//! stored on cells; callers derive it from combatant positions and pass it to
//! the queries that care.

mod distance;
mod path;
mod sight;

use std::collections::BTreeSet;

use bitflags::bitflags;

use crate::env::{MapDimensions, MapPreset};
use crate::state::Position;

pub use distance::{FEET_PER_SQUARE, diagonal_rule_distance, distance_feet, push_destination};
pub use path::{Path, calculate_path_cost, find_path, get_reachable_positions, step_cost};
pub use sight::{
    RangedTargeting, blocks_line_of_sight, can_target_with_ranged_attack, get_line_between,
    get_line_targets, has_line_of_sight,
};

bitflags! {
    /// What an obstacle blocks.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct BlockFlags: u8 {
        const MOVEMENT = 1 << 0;
        const SIGHT    = 1 << 1;
    }
}

/// Obstacle kinds found on battle maps.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ObstacleKind {
    Wall,
    Pillar,
    Tree,
    Boulder,
    /// Low cover: blocks movement, not sight.
    Furniture,
    /// Magical darkness or thick smoke: blocks sight, not movement.
    Curtain,
}

impl ObstacleKind {
    pub const fn blocks(self) -> BlockFlags {
        match self {
            Self::Wall | Self::Pillar | Self::Tree | Self::Boulder => {
                BlockFlags::MOVEMENT.union(BlockFlags::SIGHT)
            }
            Self::Furniture => BlockFlags::MOVEMENT,
            Self::Curtain => BlockFlags::SIGHT,
        }
    }
}

/// Terrain tags that alter movement.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Terrain {
    /// Costs double movement to enter.
    Difficult,
    /// Passable at normal cost; harmful to stand in.
    Hazard,
}

/// One cell of the battle grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCell {
    pub elevation: i32,
    pub obstacle: Option<ObstacleKind>,
    pub terrain: Option<Terrain>,
    /// Elevation reachable from this cell by stairs.
    pub stair_to: Option<i32>,
}

impl GridCell {
    pub fn blocks_movement(&self) -> bool {
        self.obstacle
            .is_some_and(|o| o.blocks().contains(BlockFlags::MOVEMENT))
    }

    pub fn blocks_sight(&self) -> bool {
        self.obstacle
            .is_some_and(|o| o.blocks().contains(BlockFlags::SIGHT))
    }

    pub fn is_difficult(&self) -> bool {
        self.terrain == Some(Terrain::Difficult)
    }
}

/// Errors raised while building a grid from a preset.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    EmptyGrid { width: u32, height: u32 },
    #[error("preset `{preset}` places {what} outside the grid at {position}")]
    OutOfBounds {
        preset: String,
        what: &'static str,
        position: Position,
    },
}

/// Rectangular battle grid.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    dimensions: MapDimensions,
    cells: Vec<GridCell>,
}

impl Grid {
    /// An open grid of plain cells at elevation 0.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            dimensions: MapDimensions::new(width, height),
            cells: vec![GridCell::default(); width as usize * height as usize],
        }
    }

    pub fn from_preset(preset: &MapPreset) -> Result<Self, GridError> {
        let MapDimensions { width, height } = preset.dimensions;
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid { width, height });
        }
        let mut grid = Self::new(width, height);
        let out_of_bounds = |what: &'static str, position: Position| GridError::OutOfBounds {
            preset: preset.id.clone(),
            what,
            position,
        };

        for spec in &preset.elevations {
            let cell = grid
                .cell_mut(spec.position)
                .ok_or_else(|| out_of_bounds("an elevation", spec.position))?;
            cell.elevation = spec.elevation;
        }
        for spec in &preset.obstacles {
            let cell = grid
                .cell_mut(spec.position)
                .ok_or_else(|| out_of_bounds("an obstacle", spec.position))?;
            cell.obstacle = Some(spec.kind);
        }
        for spec in &preset.terrain {
            let cell = grid
                .cell_mut(spec.position)
                .ok_or_else(|| out_of_bounds("terrain", spec.position))?;
            cell.terrain = Some(spec.terrain);
        }
        for spec in &preset.stairs {
            let cell = grid
                .cell_mut(spec.position)
                .ok_or_else(|| out_of_bounds("a stair", spec.position))?;
            cell.stair_to = Some(spec.to_elevation);
        }

        tracing::debug!(preset = %preset.id, width, height, "built grid from preset");
        Ok(grid)
    }

    // ========================================================================
    // Builders
    // ========================================================================

    pub fn with_obstacle(mut self, position: Position, kind: ObstacleKind) -> Self {
        if let Some(cell) = self.cell_mut(position) {
            cell.obstacle = Some(kind);
        }
        self
    }

    pub fn with_wall(self, position: Position) -> Self {
        self.with_obstacle(position, ObstacleKind::Wall)
    }

    pub fn with_terrain(mut self, position: Position, terrain: Terrain) -> Self {
        if let Some(cell) = self.cell_mut(position) {
            cell.terrain = Some(terrain);
        }
        self
    }

    pub fn with_elevation(mut self, position: Position, elevation: i32) -> Self {
        if let Some(cell) = self.cell_mut(position) {
            cell.elevation = elevation;
        }
        self
    }

    pub fn with_stair(mut self, position: Position, to_elevation: i32) -> Self {
        if let Some(cell) = self.cell_mut(position) {
            cell.stair_to = Some(to_elevation);
        }
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    pub fn contains(&self, position: Position) -> bool {
        self.dimensions.contains(position)
    }

    pub fn cell(&self, position: Position) -> Option<&GridCell> {
        self.index(position).map(|idx| &self.cells[idx])
    }

    fn cell_mut(&mut self, position: Position) -> Option<&mut GridCell> {
        self.index(position).map(move |idx| &mut self.cells[idx])
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.y as usize * self.dimensions.width as usize + position.x as usize)
    }

    /// In bounds and free of movement-blocking obstacles.
    pub fn is_walkable(&self, position: Position) -> bool {
        self.cell(position).is_some_and(|c| !c.blocks_movement())
    }

    /// Whether a single step between two adjacent cells is possible given elevation.
    ///
    /// Same-elevation cells always connect; different elevations connect only
    /// through a stair on either cell leading to the other's elevation.
    pub fn connects(&self, from: Position, to: Position) -> bool {
        let (Some(a), Some(b)) = (self.cell(from), self.cell(to)) else {
            return false;
        };
        a.elevation == b.elevation
            || a.stair_to == Some(b.elevation)
            || b.stair_to == Some(a.elevation)
    }
}

/// Cells hidden from view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FogOfWar {
    hidden: BTreeSet<Position>,
}

impl FogOfWar {
    pub fn new(hidden: impl IntoIterator<Item = Position>) -> Self {
        Self {
            hidden: hidden.into_iter().collect(),
        }
    }

    pub fn is_fogged(&self, position: Position) -> bool {
        self.hidden.contains(&position)
    }

    pub fn reveal(&mut self, position: Position) {
        self.hidden.remove(&position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{ObstacleSpec, StairSpec, TerrainSpec};

    #[test]
    fn preset_places_obstacles_and_terrain() {
        let mut preset = MapPreset::open("yard", 6, 4);
        preset.obstacles.push(ObstacleSpec {
            position: Position::new(2, 1),
            kind: ObstacleKind::Wall,
        });
        preset.terrain.push(TerrainSpec {
            position: Position::new(3, 3),
            terrain: Terrain::Difficult,
        });
        let grid = Grid::from_preset(&preset).unwrap();

        assert!(grid.cell(Position::new(2, 1)).unwrap().blocks_sight());
        assert!(!grid.is_walkable(Position::new(2, 1)));
        assert!(grid.cell(Position::new(3, 3)).unwrap().is_difficult());
        assert!(grid.cell(Position::new(6, 0)).is_none());
    }

    #[test]
    fn preset_rejects_out_of_bounds_entries() {
        let mut preset = MapPreset::open("tiny", 2, 2);
        preset.stairs.push(StairSpec {
            position: Position::new(5, 5),
            to_elevation: 1,
        });
        assert!(matches!(
            Grid::from_preset(&preset),
            Err(GridError::OutOfBounds { what: "a stair", .. })
        ));
    }

    #[test]
    fn furniture_blocks_movement_but_not_sight() {
        let grid = Grid::new(3, 3).with_obstacle(Position::new(1, 1), ObstacleKind::Furniture);
        let cell = grid.cell(Position::new(1, 1)).unwrap();
        assert!(cell.blocks_movement());
        assert!(!cell.blocks_sight());
    }

    #[test]
    fn wide_grids_index_row_major() {
        let grid = Grid::new(70_000, 2).with_wall(Position::new(69_999, 1));
        assert_eq!(grid.cells.len(), 140_000);
        assert!(grid.cell(Position::new(69_999, 1)).unwrap().blocks_sight());
        assert!(!grid.cell(Position::new(69_999, 0)).unwrap().blocks_sight());
        assert!(!grid.cell(Position::new(0, 1)).unwrap().blocks_sight());
        assert!(grid.cell(Position::new(70_000, 0)).is_none());
    }

    #[test]
    fn elevation_changes_need_stairs() {
        let grid = Grid::new(3, 1)
            .with_elevation(Position::new(1, 0), 1)
            .with_elevation(Position::new(2, 0), 1)
            .with_stair(Position::new(0, 0), 1);
        let without_stair = Grid::new(2, 1).with_elevation(Position::new(1, 0), 1);

        assert!(grid.connects(Position::new(0, 0), Position::new(1, 0)));
        assert!(grid.connects(Position::new(1, 0), Position::new(2, 0)));
        assert!(!without_stair.connects(Position::new(0, 0), Position::new(1, 0)));
    }
}
