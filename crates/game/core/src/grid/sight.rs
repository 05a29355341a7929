//! Line of sight and ranged targeting.

use crate::state::Position;

use super::distance::{FEET_PER_SQUARE, diagonal_rule_distance};
use super::{FogOfWar, Grid, GridCell};

/// Outcome of a ranged targeting check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangedTargeting {
    pub can_target: bool,
    /// First wall or fogged cell on the line; `None` when the range check failed
    /// or nothing blocks.
    pub blocked_by: Option<Position>,
}

pub fn blocks_line_of_sight(cell: &GridCell) -> bool {
    cell.blocks_sight()
}

/// Cells strictly between `a` and `b` on a Bresenham line, ordered from `a`.
///
/// The same cells are produced regardless of argument order. Adjacent or
/// identical endpoints yield an empty line.
pub fn get_line_between(a: Position, b: Position) -> Vec<Position> {
    if a.chebyshev(b) <= 1 {
        return Vec::new();
    }
    let (start, end, reversed) = if a <= b { (a, b, false) } else { (b, a, true) };

    let dx = (end.x - start.x).abs();
    let dy = -(end.y - start.y).abs();
    let sx = if start.x < end.x { 1 } else { -1 };
    let sy = if start.y < end.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (start.x, start.y);
    let mut cells = Vec::new();

    loop {
        if x == end.x && y == end.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        if x == end.x && y == end.y {
            break;
        }
        cells.push(Position::new(x, y));
    }

    if reversed {
        cells.reverse();
    }
    cells
}

fn is_fogged(fog: Option<&FogOfWar>, position: Position) -> bool {
    fog.is_some_and(|f| f.is_fogged(position))
}

fn first_obstruction(
    grid: &Grid,
    from: Position,
    to: Position,
    fog: Option<&FogOfWar>,
) -> Option<Position> {
    if is_fogged(fog, from) {
        return Some(from);
    }
    let intermediate = get_line_between(from, to).into_iter().find(|&p| {
        is_fogged(fog, p) || grid.cell(p).is_some_and(blocks_line_of_sight)
    });
    if intermediate.is_some() {
        return intermediate;
    }
    is_fogged(fog, to).then_some(to)
}

/// Whether `from` can see `to`.
///
/// Adjacent cells always see each other, fog or not. Otherwise a fogged
/// endpoint or a fogged/sight-blocking intermediate cell breaks the line.
pub fn has_line_of_sight(
    grid: &Grid,
    from: Position,
    to: Position,
    fog: Option<&FogOfWar>,
) -> bool {
    if from.chebyshev(to) <= 1 {
        return true;
    }
    first_obstruction(grid, from, to, fog).is_none()
}

/// Range first, then line of sight.
///
/// An out-of-range target reports no `blocked_by`: sight is never checked.
pub fn can_target_with_ranged_attack(
    grid: &Grid,
    from: Position,
    to: Position,
    range: u32,
    fog: Option<&FogOfWar>,
) -> RangedTargeting {
    if diagonal_rule_distance(from, to) > range {
        return RangedTargeting {
            can_target: false,
            blocked_by: None,
        };
    }
    if from.chebyshev(to) <= 1 {
        return RangedTargeting {
            can_target: true,
            blocked_by: None,
        };
    }
    match first_obstruction(grid, from, to, fog) {
        Some(blocked) => RangedTargeting {
            can_target: false,
            blocked_by: Some(blocked),
        },
        None => RangedTargeting {
            can_target: true,
            blocked_by: None,
        },
    }
}

/// Cells struck by a line effect from `origin` heading `direction`.
///
/// Walks unit steps (the sign of each direction component) until the grid
/// edge, `max_range` feet, or the first sight-blocking cell, which is excluded.
pub fn get_line_targets(
    grid: &Grid,
    origin: Position,
    direction: (i32, i32),
    max_range: u32,
) -> Vec<Position> {
    let (dx, dy) = (direction.0.signum(), direction.1.signum());
    if dx == 0 && dy == 0 {
        return Vec::new();
    }

    let mut cells = Vec::new();
    let mut current = origin;
    for _ in 0..max_range / FEET_PER_SQUARE {
        current = current.offset(dx, dy);
        match grid.cell(current) {
            Some(cell) if !blocks_line_of_sight(cell) => cells.push(current),
            _ => break,
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_excludes_endpoints() {
        let line = get_line_between(Position::new(0, 0), Position::new(4, 0));
        assert_eq!(
            line,
            vec![Position::new(1, 0), Position::new(2, 0), Position::new(3, 0)]
        );
        assert!(get_line_between(Position::new(0, 0), Position::new(1, 1)).is_empty());
        assert!(get_line_between(Position::new(2, 2), Position::new(2, 2)).is_empty());
    }

    #[test]
    fn line_is_the_same_in_both_directions() {
        let a = Position::new(0, 0);
        let b = Position::new(5, 3);
        let mut forward = get_line_between(a, b);
        let backward = get_line_between(b, a);
        forward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn walls_block_sight_symmetrically() {
        let grid = Grid::new(10, 10).with_wall(Position::new(3, 2));
        for (a, b) in [
            (Position::new(0, 0), Position::new(6, 4)),
            (Position::new(1, 4), Position::new(7, 0)),
            (Position::new(3, 0), Position::new(3, 6)),
            (Position::new(0, 2), Position::new(9, 2)),
        ] {
            assert_eq!(
                has_line_of_sight(&grid, a, b, None),
                has_line_of_sight(&grid, b, a, None),
                "asymmetric sight between {a} and {b}"
            );
        }
        assert!(!has_line_of_sight(&grid, Position::new(0, 2), Position::new(9, 2), None));
    }

    #[test]
    fn adjacent_cells_always_see_each_other() {
        let fog = FogOfWar::new([Position::new(1, 0)]);
        let grid = Grid::new(3, 3);
        assert!(has_line_of_sight(&grid, Position::new(0, 0), Position::new(1, 0), Some(&fog)));
    }

    #[test]
    fn fog_blocks_distant_sight() {
        let grid = Grid::new(6, 1);
        let fogged_middle = FogOfWar::new([Position::new(2, 0)]);
        let fogged_target = FogOfWar::new([Position::new(5, 0)]);
        let from = Position::new(0, 0);
        let to = Position::new(5, 0);

        assert!(has_line_of_sight(&grid, from, to, None));
        assert!(!has_line_of_sight(&grid, from, to, Some(&fogged_middle)));
        assert!(!has_line_of_sight(&grid, from, to, Some(&fogged_target)));
    }

    #[test]
    fn ranged_check_reports_first_blocker() {
        let grid = Grid::new(10, 1)
            .with_wall(Position::new(3, 0))
            .with_wall(Position::new(5, 0));
        let result =
            can_target_with_ranged_attack(&grid, Position::new(0, 0), Position::new(8, 0), 80, None);
        assert_eq!(
            result,
            RangedTargeting {
                can_target: false,
                blocked_by: Some(Position::new(3, 0)),
            }
        );
    }

    #[test]
    fn range_is_checked_before_sight() {
        let grid = Grid::new(10, 1).with_wall(Position::new(3, 0));
        let result =
            can_target_with_ranged_attack(&grid, Position::new(0, 0), Position::new(7, 0), 30, None);
        assert_eq!(
            result,
            RangedTargeting {
                can_target: false,
                blocked_by: None,
            }
        );
    }

    #[test]
    fn line_targets_stop_at_walls_and_range() {
        let grid = Grid::new(10, 1).with_wall(Position::new(4, 0));
        let cells = get_line_targets(&grid, Position::new(0, 0), (1, 0), 60);
        assert_eq!(
            cells,
            vec![Position::new(1, 0), Position::new(2, 0), Position::new(3, 0)]
        );

        let short = get_line_targets(&grid, Position::new(0, 0), (1, 0), 10);
        assert_eq!(short, vec![Position::new(1, 0), Position::new(2, 0)]);

        assert!(get_line_targets(&grid, Position::new(0, 0), (0, 0), 60).is_empty());
        assert!(get_line_targets(&grid, Position::new(0, 0), (-1, 0), 60).is_empty());
    }
}
