//! Serf entities and their arena

use serde::{Deserialize, Serialize};

use crate::agent::behavior::SerfState;
use crate::agent::profession::Profession;
use crate::core::types::{FacilityId, GridPos, SerfId, TaskId, Vec2};
use crate::economy::inventory::CarriedLoad;

/// A mobile worker agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Serf {
    pub id: SerfId,
    pub profession: Profession,
    /// World-space position (continuous; tiles are `tile_size` wide)
    pub position: Vec2,
    pub carried: CarriedLoad,
    /// The task currently binding this serf, if any
    pub task: Option<TaskId>,
    pub state: SerfState,
    /// Remaining route, set by a movement order; empty when not moving
    pub path: Vec<GridPos>,
    pub path_cursor: usize,
    /// Facility this serf deposits to / works at, if assigned one
    pub workplace: Option<FacilityId>,
}

impl Serf {
    pub fn new(id: SerfId, profession: Profession, position: Vec2, capacity: u32) -> Self {
        Self {
            id,
            profession,
            position,
            carried: CarriedLoad::new(capacity),
            task: None,
            state: SerfState::Idle,
            path: Vec::new(),
            path_cursor: 0,
            workplace: None,
        }
    }

    /// The tile this serf currently stands on
    pub fn grid_pos(&self, tile_size: f32) -> GridPos {
        GridPos::new(
            (self.position.x / tile_size).floor() as i32,
            (self.position.y / tile_size).floor() as i32,
        )
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SerfState::Idle)
    }

    /// Drop any path state (arrival or route loss)
    pub fn clear_path(&mut self) {
        self.path.clear();
        self.path_cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_pos_from_world() {
        let serf = Serf::new(SerfId(0), Profession::Builder, Vec2::new(25.0, 5.0), 6);
        assert_eq!(serf.grid_pos(10.0), GridPos::new(2, 0));
    }

    #[test]
    fn test_new_serf_is_idle_and_empty() {
        let serf = Serf::new(SerfId(0), Profession::Carrier, Vec2::new(0.0, 0.0), 6);
        assert!(serf.is_idle());
        assert!(serf.carried.is_empty());
        assert!(serf.task.is_none());
        assert!(serf.path.is_empty());
    }
}
