//! Path following
//!
//! Per tick a serf covers `serf_speed * tile_size * dt` world units along
//! its path. On reaching a waypoint it snaps exactly to the tile center,
//! advances the cursor, and spends any leftover step budget on the next
//! edge within the same tick.

use crate::agent::serf::Serf;
use crate::core::config::SimulationConfig;
use crate::core::types::GridPos;
use crate::map::TerrainMap;
use crate::pathfind;

/// Result of one movement integration step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Still en route
    Moving,
    /// Final waypoint reached this tick; path state cleared
    Arrived,
    /// No usable path (empty or exhausted without arrival)
    PathLost,
}

/// Compute and install a path on the serf. Returns false when no path
/// exists; the serf's path state is left cleared in that case.
pub fn set_route(serf: &mut Serf, map: &TerrainMap, dest: GridPos, tile_size: f32) -> bool {
    let start = serf.grid_pos(tile_size);
    match pathfind::find_path(map, start, dest) {
        Some(path) => {
            serf.path = path;
            serf.path_cursor = 0;
            true
        }
        None => {
            serf.clear_path();
            false
        }
    }
}

/// Advance the serf along its installed path by one tick
pub fn follow_path(serf: &mut Serf, config: &SimulationConfig, dt: f32) -> MoveOutcome {
    if serf.path.is_empty() || serf.path_cursor >= serf.path.len() {
        serf.clear_path();
        return MoveOutcome::PathLost;
    }

    let mut budget = config.serf_speed * config.tile_size * dt;
    while budget > 0.0 {
        let target = serf.path[serf.path_cursor].center(config.tile_size);
        let dist = serf.position.distance(&target);

        if dist <= budget {
            serf.position = target;
            budget -= dist;
            serf.path_cursor += 1;
            if serf.path_cursor >= serf.path.len() {
                serf.clear_path();
                return MoveOutcome::Arrived;
            }
        } else {
            let dir = (target - serf.position).normalize();
            serf.position = serf.position + dir * budget;
            return MoveOutcome::Moving;
        }
    }

    MoveOutcome::Moving
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::profession::Profession;
    use crate::core::types::{SerfId, Vec2};
    use crate::map::Terrain;

    fn setup() -> (Serf, TerrainMap, SimulationConfig) {
        let config = SimulationConfig::default();
        let map = TerrainMap::filled(10, 10, Terrain::Grass).unwrap();
        let serf = Serf::new(
            SerfId(0),
            Profession::Carrier,
            GridPos::new(0, 0).center(config.tile_size),
            6,
        );
        (serf, map, config)
    }

    #[test]
    fn test_set_route_and_arrive() {
        let (mut serf, map, config) = setup();
        assert!(set_route(&mut serf, &map, GridPos::new(3, 0), config.tile_size));
        assert_eq!(serf.path_cursor, 0);
        assert!(!serf.path.is_empty());

        // speed 1 tile per time unit: 3 tiles away, arrive within 4 units
        let mut arrived = false;
        for _ in 0..4 {
            if follow_path(&mut serf, &config, 1.0) == MoveOutcome::Arrived {
                arrived = true;
                break;
            }
        }
        assert!(arrived);
        assert_eq!(serf.grid_pos(config.tile_size), GridPos::new(3, 0));
        // Arrival clears path state
        assert!(serf.path.is_empty());
        assert_eq!(serf.path_cursor, 0);
    }

    #[test]
    fn test_waypoint_snap() {
        let (mut serf, map, config) = setup();
        assert!(set_route(&mut serf, &map, GridPos::new(2, 0), config.tile_size));

        // Oversized step overshoots every waypoint; must snap to the goal
        let outcome = follow_path(&mut serf, &config, 100.0);
        assert_eq!(outcome, MoveOutcome::Arrived);
        let goal_center = GridPos::new(2, 0).center(config.tile_size);
        assert!(serf.position.distance(&goal_center) < 0.001);
    }

    #[test]
    fn test_set_route_failure_clears_path() {
        let (mut serf, mut map, config) = setup();
        let goal = GridPos::new(5, 5);
        for n in goal.neighbors4() {
            map.set_tile(n, Terrain::Water);
        }

        assert!(!set_route(&mut serf, &map, goal, config.tile_size));
        assert!(serf.path.is_empty());
    }

    #[test]
    fn test_follow_without_path_is_lost() {
        let (mut serf, _map, config) = setup();
        assert_eq!(follow_path(&mut serf, &config, 1.0), MoveOutcome::PathLost);
    }

    #[test]
    fn test_partial_progress() {
        let (mut serf, map, config) = setup();
        assert!(set_route(&mut serf, &map, GridPos::new(5, 0), config.tile_size));

        let start = serf.position;
        assert_eq!(follow_path(&mut serf, &config, 0.5), MoveOutcome::Moving);
        let moved = serf.position.distance(&start);
        assert!((moved - 0.5 * config.serf_speed * config.tile_size).abs() < 0.001);
    }
}
