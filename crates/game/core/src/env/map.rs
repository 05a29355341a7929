use crate::grid::{ObstacleKind, Terrain};
use crate::state::Position;

/// Width and height of a battle map in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }
}

/// Obstacle placed on one cell of a preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstacleSpec {
    pub position: Position,
    pub kind: ObstacleKind,
}

/// Terrain tag placed on one cell of a preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainSpec {
    pub position: Position,
    pub terrain: Terrain,
}

/// Elevation of one cell of a preset (cells default to 0).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElevationSpec {
    pub position: Position,
    pub elevation: i32,
}

/// Stair on one cell leading to another elevation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StairSpec {
    pub position: Position,
    pub to_elevation: i32,
}

/// Static map preset supplied by the content catalog, used only to build a
/// [`crate::grid::Grid`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapPreset {
    pub id: String,
    pub name: String,
    pub dimensions: MapDimensions,
    #[cfg_attr(feature = "serde", serde(default))]
    pub obstacles: Vec<ObstacleSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub terrain: Vec<TerrainSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub elevations: Vec<ElevationSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stairs: Vec<StairSpec>,
}

impl MapPreset {
    pub fn open(id: impl Into<String>, width: u32, height: u32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            dimensions: MapDimensions::new(width, height),
            obstacles: Vec::new(),
            terrain: Vec::new(),
            elevations: Vec::new(),
            stairs: Vec::new(),
        }
    }
}
