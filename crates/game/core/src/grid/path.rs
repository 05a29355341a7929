//! A* pathfinding and movement reachability.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use crate::state::Position;

use super::Grid;
use super::distance::FEET_PER_SQUARE;

/// A walkable route, including both endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    pub positions: Vec<Position>,
    /// Total movement cost in feet.
    pub cost: u32,
}

impl Path {
    pub fn destination(&self) -> Option<Position> {
        self.positions.last().copied()
    }

    /// Number of steps taken (positions minus the start).
    pub fn steps(&self) -> usize {
        self.positions.len().saturating_sub(1)
    }
}

/// Cost in feet of stepping from `from` into the adjacent cell `to`.
///
/// `None` when the step is impossible: not adjacent, out of bounds, blocked,
/// or an elevation change without stairs. Difficult terrain doubles the cost.
pub fn step_cost(grid: &Grid, from: Position, to: Position) -> Option<u32> {
    if !from.is_adjacent(to) || !grid.is_walkable(to) || !grid.connects(from, to) {
        return None;
    }
    let cell = grid.cell(to)?;
    Some(if cell.is_difficult() {
        FEET_PER_SQUARE * 2
    } else {
        FEET_PER_SQUARE
    })
}

/// Sum of per-step costs along `path`; `None` if any step is impossible.
pub fn calculate_path_cost(grid: &Grid, path: &[Position]) -> Option<u32> {
    path.windows(2)
        .map(|pair| step_cost(grid, pair[0], pair[1]))
        .sum()
}

fn heuristic(a: Position, b: Position) -> u32 {
    a.chebyshev(b) * FEET_PER_SQUARE
}

fn rebuild(came_from: &BTreeMap<Position, Position>, goal: Position) -> Vec<Position> {
    let mut positions = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        positions.push(prev);
        current = prev;
    }
    positions.reverse();
    positions
}

/// Cheapest route from `start` to `goal`.
///
/// Cells in `occupied` are impassable except the goal itself, so a creature
/// can path to the cell of the creature it is chasing.
pub fn find_path(
    grid: &Grid,
    start: Position,
    goal: Position,
    occupied: &BTreeSet<Position>,
) -> Option<Path> {
    if !grid.contains(start) || !grid.is_walkable(goal) {
        return None;
    }
    if start == goal {
        return Some(Path {
            positions: vec![start],
            cost: 0,
        });
    }

    let mut open = BinaryHeap::new();
    let mut best: BTreeMap<Position, u32> = BTreeMap::new();
    let mut came_from: BTreeMap<Position, Position> = BTreeMap::new();
    let mut closed: BTreeSet<Position> = BTreeSet::new();

    best.insert(start, 0);
    open.push(Reverse((heuristic(start, goal), 0u32, start)));

    while let Some(Reverse((_, cost, current))) = open.pop() {
        if current == goal {
            return Some(Path {
                positions: rebuild(&came_from, goal),
                cost,
            });
        }
        if !closed.insert(current) {
            continue;
        }

        for next in current.neighbors() {
            if next != goal && occupied.contains(&next) {
                continue;
            }
            let Some(step) = step_cost(grid, current, next) else {
                continue;
            };
            let tentative = cost + step;
            if best.get(&next).is_none_or(|&known| tentative < known) {
                best.insert(next, tentative);
                came_from.insert(next, current);
                open.push(Reverse((tentative + heuristic(next, goal), tentative, next)));
            }
        }
    }

    None
}

/// Every cell reachable from `origin` within `budget` feet, with its cheapest cost.
///
/// The origin is included at cost 0. Occupied cells are never entered.
pub fn get_reachable_positions(
    grid: &Grid,
    origin: Position,
    budget: u32,
    occupied: &BTreeSet<Position>,
) -> BTreeMap<Position, u32> {
    let mut reached: BTreeMap<Position, u32> = BTreeMap::new();
    if !grid.contains(origin) {
        return reached;
    }

    let mut frontier = BinaryHeap::new();
    reached.insert(origin, 0);
    frontier.push(Reverse((0u32, origin)));

    while let Some(Reverse((cost, current))) = frontier.pop() {
        if reached.get(&current).is_some_and(|&known| cost > known) {
            continue;
        }
        for next in current.neighbors() {
            if occupied.contains(&next) {
                continue;
            }
            let Some(step) = step_cost(grid, current, next) else {
                continue;
            };
            let total = cost + step;
            if total > budget {
                continue;
            }
            if reached.get(&next).is_none_or(|&known| total < known) {
                reached.insert(next, total);
                frontier.push(Reverse((total, next)));
            }
        }
    }

    reached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Terrain;

    #[test]
    fn straight_path_on_open_grid() {
        let grid = Grid::new(6, 6);
        let path = find_path(&grid, Position::new(0, 0), Position::new(3, 3), &BTreeSet::new())
            .unwrap();
        assert_eq!(path.steps(), 3);
        assert_eq!(path.cost, 15);
        assert_eq!(path.positions.first(), Some(&Position::new(0, 0)));
        assert_eq!(path.destination(), Some(Position::new(3, 3)));
    }

    #[test]
    fn path_routes_around_walls() {
        let grid = Grid::new(5, 5)
            .with_wall(Position::new(2, 0))
            .with_wall(Position::new(2, 1))
            .with_wall(Position::new(2, 2))
            .with_wall(Position::new(2, 3));
        let path = find_path(&grid, Position::new(0, 0), Position::new(4, 0), &BTreeSet::new())
            .unwrap();
        assert!(path.positions.contains(&Position::new(2, 4)));
        assert_eq!(calculate_path_cost(&grid, &path.positions), Some(path.cost));
    }

    #[test]
    fn path_avoids_difficult_terrain_when_cheaper() {
        let grid = Grid::new(5, 3)
            .with_terrain(Position::new(1, 1), Terrain::Difficult)
            .with_terrain(Position::new(2, 1), Terrain::Difficult)
            .with_terrain(Position::new(3, 1), Terrain::Difficult);
        let path = find_path(&grid, Position::new(0, 1), Position::new(4, 1), &BTreeSet::new())
            .unwrap();
        assert_eq!(path.cost, 20);
    }

    #[test]
    fn occupied_cells_are_skipped_but_goal_is_allowed() {
        let grid = Grid::new(3, 1);
        let occupied = BTreeSet::from([Position::new(1, 0)]);
        assert!(find_path(&grid, Position::new(0, 0), Position::new(2, 0), &occupied).is_none());

        let goal_occupied = BTreeSet::from([Position::new(2, 0)]);
        assert!(find_path(&grid, Position::new(0, 0), Position::new(2, 0), &goal_occupied).is_some());
    }

    #[test]
    fn unreachable_goal_returns_none() {
        let grid = Grid::new(3, 3).with_wall(Position::new(2, 2));
        assert!(find_path(&grid, Position::new(0, 0), Position::new(2, 2), &BTreeSet::new()).is_none());
    }

    #[test]
    fn path_cost_counts_difficult_terrain_double() {
        let grid = Grid::new(4, 1).with_terrain(Position::new(2, 0), Terrain::Difficult);
        let path = [Position::new(0, 0), Position::new(1, 0), Position::new(2, 0), Position::new(3, 0)];
        assert_eq!(calculate_path_cost(&grid, &path), Some(20));
        assert_eq!(calculate_path_cost(&grid, &[Position::new(0, 0), Position::new(2, 0)]), None);
    }

    #[test]
    fn reachable_positions_respect_budget() {
        let grid = Grid::new(10, 10);
        let reach = get_reachable_positions(&grid, Position::new(5, 5), 10, &BTreeSet::new());
        assert_eq!(reach.len(), 25);
        assert_eq!(reach.get(&Position::new(5, 5)), Some(&0));
        assert_eq!(reach.get(&Position::new(7, 7)), Some(&10));
        assert!(!reach.contains_key(&Position::new(8, 5)));
    }

    #[test]
    fn reachable_positions_skip_occupied_and_pay_for_terrain() {
        let grid = Grid::new(5, 1).with_terrain(Position::new(1, 0), Terrain::Difficult);
        let reach = get_reachable_positions(&grid, Position::new(0, 0), 15, &BTreeSet::new());
        assert_eq!(reach.get(&Position::new(1, 0)), Some(&10));
        assert_eq!(reach.get(&Position::new(2, 0)), Some(&15));
        assert!(!reach.contains_key(&Position::new(3, 0)));

        let occupied = BTreeSet::from([Position::new(1, 0)]);
        let blocked = get_reachable_positions(&grid, Position::new(0, 0), 30, &occupied);
        assert_eq!(blocked.len(), 1);
    }
}
