//! Area-of-effect targeting.

use crate::combat::is_dead;
use crate::grid::{FEET_PER_SQUARE, Grid, distance_feet, get_line_targets};
use crate::state::{Combatant, CombatantId, Position};

use super::{AreaOfEffect, Spell};

/// Where an area spell is aimed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AoeOrigin {
    Position(Position),
    /// The current position of this combatant.
    Target(CombatantId),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpellTargetError {
    #[error("spell {0} has no area of effect")]
    NoArea(String),
    #[error("target {0} not found")]
    TargetNotFound(CombatantId),
}

impl crate::error::RuleError for SpellTargetError {
    fn kind(&self) -> crate::error::RejectionKind {
        match self {
            Self::NoArea(_) => crate::error::RejectionKind::Precondition,
            Self::TargetNotFound(_) => crate::error::RejectionKind::NotFound,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoArea(_) => "no_area",
            Self::TargetNotFound(_) => "target_not_found",
        }
    }
}

/// Whether `cell` lies inside `area` aimed at `origin` by a caster at `caster`.
///
/// Radius shapes use movement distance from the origin; cubes are centred on
/// it. Lines and cones start next to the caster and head toward the origin; a
/// diagonal cone covers the whole quadrant out to its length.
pub fn is_in_area(
    grid: &Grid,
    area: AreaOfEffect,
    caster: Position,
    origin: Position,
    cell: Position,
) -> bool {
    let direction = ((origin.x - caster.x).signum(), (origin.y - caster.y).signum());
    match area {
        AreaOfEffect::Sphere { radius } | AreaOfEffect::Cylinder { radius } => {
            distance_feet(origin, cell) <= radius
        }
        AreaOfEffect::Cube { size } => {
            let half = size / 2;
            let dx = origin.x.abs_diff(cell.x) * FEET_PER_SQUARE;
            let dy = origin.y.abs_diff(cell.y) * FEET_PER_SQUARE;
            dx <= half && dy <= half
        }
        AreaOfEffect::Line { length } => {
            get_line_targets(grid, caster, direction, length).contains(&cell)
        }
        AreaOfEffect::Cone { length } => {
            let (dx, dy) = direction;
            if dx == 0 && dy == 0 {
                return false;
            }
            let along_x = (cell.x - caster.x) * dx;
            let along_y = (cell.y - caster.y) * dy;
            let reach = (length / FEET_PER_SQUARE) as i32;
            if dx != 0 && dy != 0 {
                let forward = along_x.max(along_y);
                return along_x >= 0 && along_y >= 0 && (1..=reach).contains(&forward);
            }
            let (forward, lateral) = if dx != 0 {
                (along_x, (cell.y - caster.y).abs())
            } else {
                (along_y, (cell.x - caster.x).abs())
            };
            (1..=reach).contains(&forward) && lateral * 2 <= forward
        }
    }
}

/// Combatants caught in `spell`'s area.
///
/// The caster and the dead are never included. Player casters only hit
/// monsters; a monster caster hits everyone else inside.
pub fn find_aoe_targets(
    grid: &Grid,
    caster: &Combatant,
    spell: &Spell,
    origin: AoeOrigin,
    combatants: &[Combatant],
) -> Result<Vec<CombatantId>, SpellTargetError> {
    let area = spell
        .area_of_effect
        .ok_or_else(|| SpellTargetError::NoArea(spell.id.clone()))?;
    let origin = match origin {
        AoeOrigin::Position(position) => position,
        AoeOrigin::Target(id) => combatants
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.position)
            .ok_or(SpellTargetError::TargetNotFound(id))?,
    };

    Ok(combatants
        .iter()
        .filter(|c| c.id != caster.id && !is_dead(c))
        .filter(|c| !caster.is_character() || c.is_monster())
        .filter(|c| is_in_area(grid, area, caster.position, origin, c.position))
        .map(|c| c.id)
        .collect())
}
