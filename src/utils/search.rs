//! # Grid Search
//!
//! Breadth-first searches over the board, built on the `pathfinding` crate.

use crate::game::{Grid, Position};
use pathfinding::prelude::{bfs, bfs_reach};
use std::collections::HashSet;

/// Every passable cell reachable from `start` through passable neighbours.
///
/// Returns an empty set when `start` itself is not passable.
pub fn reachable_cells(grid: &Grid, start: Position) -> HashSet<Position> {
    if !grid.is_passable(start) {
        return HashSet::new();
    }
    bfs_reach(start, |&pos| grid.passable_neighbors(pos)).collect()
}

/// Nearest cell to `start` (in breadth-first order) that satisfies `predicate`.
///
/// With `through_walls` the search walks every in-bounds cell, which finds
/// open cells from a start position buried inside a wall. Without it only
/// passable cells are expanded.
pub fn nearest_cell(
    grid: &Grid,
    start: Position,
    through_walls: bool,
    predicate: impl Fn(Position) -> bool,
) -> Option<Position> {
    if !grid.is_valid_position(start) {
        return None;
    }
    bfs_reach(start, |&pos| {
        pos.cardinal_adjacent_positions()
            .into_iter()
            .filter(|&next| {
                if through_walls {
                    grid.is_valid_position(next)
                } else {
                    grid.is_passable(next)
                }
            })
            .collect::<Vec<_>>()
    })
    .find(|&pos| predicate(pos))
}

/// Nearest passable cell, searching through walls.
pub fn nearest_passable(grid: &Grid, start: Position) -> Option<Position> {
    nearest_cell(grid, start, true, |pos| grid.is_passable(pos))
}

/// Shortest passable path from `start` to the first cell matching `goal`,
/// never entering a cell for which `blocked` holds. The path includes `start`.
pub fn path_to_nearest(
    grid: &Grid,
    start: Position,
    blocked: impl Fn(Position) -> bool,
    goal: impl Fn(Position) -> bool,
) -> Option<Vec<Position>> {
    bfs(
        &start,
        |&pos| {
            grid.passable_neighbors(pos)
                .into_iter()
                .filter(|&next| !blocked(next))
                .collect::<Vec<_>>()
        },
        |&pos| pos != start && goal(pos),
    )
}
