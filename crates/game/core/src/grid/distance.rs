//! Distance rules.

use std::collections::BTreeSet;

use crate::state::Position;

use super::Grid;

/// Feet covered by one grid square.
pub const FEET_PER_SQUARE: u32 = 5;

/// Movement distance in feet: every step, diagonal or not, costs one square.
pub fn distance_feet(a: Position, b: Position) -> u32 {
    a.chebyshev(b) * FEET_PER_SQUARE
}

/// Range distance in feet using the alternating diagonal rule.
///
/// The first diagonal step costs 5 ft, the second 10 ft, the third 5 ft, and
/// so on; straight steps always cost 5 ft.
pub fn diagonal_rule_distance(a: Position, b: Position) -> u32 {
    let dx = (a.x - b.x).unsigned_abs();
    let dy = (a.y - b.y).unsigned_abs();
    let diagonal = dx.min(dy);
    let straight = dx.max(dy) - diagonal;
    (straight + diagonal + diagonal / 2) * FEET_PER_SQUARE
}

/// Where a creature at `target` ends up when shoved `feet` straight away from `from`.
///
/// Movement stops early at the grid edge, at movement-blocking obstacles, at
/// elevation changes without stairs, and at cells in `occupied`.
pub fn push_destination(
    grid: &Grid,
    from: Position,
    target: Position,
    feet: u32,
    occupied: &BTreeSet<Position>,
) -> Position {
    let dx = (target.x - from.x).signum();
    let dy = (target.y - from.y).signum();
    if dx == 0 && dy == 0 {
        return target;
    }

    let mut current = target;
    for _ in 0..feet / FEET_PER_SQUARE {
        let next = current.offset(dx, dy);
        if !grid.is_walkable(next) || occupied.contains(&next) || !grid.connects(current, next) {
            break;
        }
        current = next;
    }
    current
}
