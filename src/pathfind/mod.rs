//! A* pathfinding over the terrain grid
//!
//! 4-connected, uniform edge cost, Manhattan heuristic (admissible on this
//! grid). Returns the full tile sequence including both endpoints, or None
//! when the goal is unreachable. A failed search is not an error: callers
//! treat None as "no path" and fall back (task failure or idle).

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::core::types::GridPos;
use crate::map::TerrainMap;

/// Node in the A* open set
#[derive(Debug, Clone)]
struct PathNode {
    pos: GridPos,
    f_cost: u32,
    /// Insertion sequence, used to break f-cost ties in FIFO order
    seq: u32,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; earlier insertion wins ties
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a path from `start` to `goal` using A*
///
/// Returns None if either endpoint is off-grid or non-walkable, or if no
/// 4-connected walkable route exists. Safe to call many times per tick; no
/// search state is shared between calls.
pub fn find_path(map: &TerrainMap, start: GridPos, goal: GridPos) -> Option<Vec<GridPos>> {
    if !map.is_walkable(start) || !map.is_walkable(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();
    let mut g_scores: HashMap<GridPos, u32> = HashMap::new();
    let mut seq = 0u32;

    g_scores.insert(start, 0);
    open_set.push(PathNode {
        pos: start,
        f_cost: start.manhattan(&goal),
        seq,
    });

    while let Some(current) = open_set.pop() {
        if current.pos == goal {
            return Some(reconstruct_path(&came_from, current.pos));
        }

        let current_g = *g_scores.get(&current.pos).unwrap_or(&u32::MAX);

        for neighbor in current.pos.neighbors4() {
            if !map.is_walkable(neighbor) {
                continue;
            }

            let tentative_g = current_g + 1;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.pos);
                g_scores.insert(neighbor, tentative_g);
                seq += 1;
                open_set.push(PathNode {
                    pos: neighbor,
                    f_cost: tentative_g + neighbor.manhattan(&goal),
                    seq,
                });
            }
        }
    }

    None // No path found
}

/// Reconstruct path from came_from map
fn reconstruct_path(came_from: &HashMap<GridPos, GridPos>, mut current: GridPos) -> Vec<GridPos> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
