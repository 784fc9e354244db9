//! Cost-aware route planning over the mansion grid
//!
//! Uniform-cost search where obstacles are penalized rather than forbidden:
//! a closed door costs a little, an intact wall a lot, so routes prefer open
//! passages but will still line up against a wall the caller intends to
//! break through. Invoked on every movement decision - walls, doors, and
//! hazards change between calls.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::types::GridPos;
use crate::mansion::board::MansionBoard;
use crate::sim::constants::{DOOR_PENALTY, HEURISTIC_NOISE_MAX, WALL_PENALTY};

/// Node in the open set
#[derive(Debug, Clone)]
struct PathNode {
    pos: GridPos,
    priority: f32, // accumulated cost + heuristic guidance
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cost of stepping from `u` into `v`
fn edge_cost(board: &MansionBoard, u: GridPos, v: GridPos) -> u32 {
    let mut cost = 1 + board.hazard(v).traversal_surcharge();
    if board.wall_blocked(u, v) {
        cost += WALL_PENALTY;
    }
    if board.door_blocked(u, v) {
        cost += DOOR_PENALTY;
    }
    cost
}

/// Manhattan distance to the nearest goal, used to bias frontier exploration
/// (guidance only - it never enters the cost accounting). With a noise
/// source, ties break randomly in a bounded way; without one, the search is
/// fully deterministic.
fn guidance(pos: GridPos, goals: &[GridPos], noise: Option<&mut ChaCha8Rng>) -> f32 {
    let base = goals
        .iter()
        .map(|goal| pos.manhattan(goal))
        .min()
        .unwrap_or(0) as f32;
    match noise {
        Some(rng) => base + rng.gen_range(0.0..HEURISTIC_NOISE_MAX),
        None => base,
    }
}

/// A goal sealed behind intact non-door walls on every side cannot be
/// entered without breaking in first; it is unreachable for this attempt.
fn enterable(board: &MansionBoard, goal: GridPos) -> bool {
    board
        .neighbors(goal)
        .iter()
        .any(|n| !board.wall_blocked(*n, goal))
}

/// Find the cheapest route from `start` to any of `goals`.
///
/// Returns the ordered cells from (excluding) `start` to (including) the
/// reached goal. Returns an empty route when already standing on a goal, or
/// when no goal is supplied or reachable - the caller treats that as
/// "cannot move this attempt".
pub fn plan_route(
    board: &MansionBoard,
    start: GridPos,
    goals: &[GridPos],
    mut noise: Option<&mut ChaCha8Rng>,
) -> Vec<GridPos> {
    let goals: Vec<GridPos> = goals
        .iter()
        .copied()
        .filter(|goal| enterable(board, *goal))
        .collect();
    if goals.is_empty() || goals.contains(&start) {
        return Vec::new();
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();
    let mut g_scores: HashMap<GridPos, u32> = HashMap::new();

    g_scores.insert(start, 0);
    open_set.push(PathNode {
        pos: start,
        priority: guidance(start, &goals, noise.as_deref_mut()),
    });

    while let Some(current) = open_set.pop() {
        if goals.contains(&current.pos) {
            return reconstruct_path(&came_from, current.pos);
        }

        let current_g = *g_scores.get(&current.pos).unwrap_or(&u32::MAX);

        for neighbor in board.neighbors(current.pos) {
            let tentative_g = current_g.saturating_add(edge_cost(board, current.pos, neighbor));
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.pos);
                g_scores.insert(neighbor, tentative_g);

                let priority =
                    tentative_g as f32 + guidance(neighbor, &goals, noise.as_deref_mut());
                open_set.push(PathNode {
                    pos: neighbor,
                    priority,
                });
            }
        }
    }

    Vec::new() // no reachable goal
}

/// Reconstruct the route from the came_from map, dropping the start cell
fn reconstruct_path(came_from: &HashMap<GridPos, GridPos>, goal: GridPos) -> Vec<GridPos> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.pop();
    path.reverse();
    path
}
