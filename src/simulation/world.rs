//! The simulation world: every arena plus map, stockpile, and config
//!
//! All state is reachable from this one struct and every system takes it as
//! an explicit argument. Entities live in flat `Vec` arenas indexed by their
//! id newtypes; ids are handed out sequentially and never reused, so
//! iteration order is creation order.

use serde::Serialize;

use crate::agent::profession::Profession;
use crate::agent::serf::Serf;
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{FacilityId, GridPos, NodeId, SerfId, TaskId, Tick};
use crate::economy::facility::{Facility, FacilityKind};
use crate::economy::resources::ResourceKind;
use crate::economy::stockpile::Stockpile;
use crate::map::nodes::NodeRegistry;
use crate::map::terrain::TerrainMap;
use crate::task::{Task, TaskKind, TaskPriority};

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub config: SimulationConfig,
    pub map: TerrainMap,
    pub nodes: NodeRegistry,
    pub stockpile: Stockpile,
    /// Tile gatherers walk to when no facility receives their load
    pub stockpile_position: GridPos,
    pub serfs: Vec<Serf>,
    pub facilities: Vec<Facility>,
    pub tasks: Vec<Task>,
    /// Accumulated simulation time
    pub time: f32,
    pub tick: Tick,
}

impl World {
    pub fn new(map: TerrainMap, stockpile_position: GridPos) -> Self {
        Self::with_config(map, stockpile_position, SimulationConfig::default())
    }

    pub fn with_config(map: TerrainMap, stockpile_position: GridPos, config: SimulationConfig) -> Self {
        let stockpile = match config.stockpile_cap {
            Some(cap) => Stockpile::with_cap(cap),
            None => Stockpile::new(),
        };
        Self {
            config,
            map,
            nodes: NodeRegistry::new(),
            stockpile,
            stockpile_position,
            serfs: Vec::new(),
            facilities: Vec::new(),
            tasks: Vec::new(),
            time: 0.0,
            tick: 0,
        }
    }

    /// Spawn a serf standing at the center of `tile`
    pub fn spawn_serf(&mut self, profession: Profession, tile: GridPos) -> SerfId {
        let id = SerfId(self.serfs.len() as u32);
        let position = tile.center(self.config.tile_size);
        self.serfs
            .push(Serf::new(id, profession, position, self.config.serf_capacity));
        id
    }

    /// Spawn a facility as a construction site with its kind's default
    /// construction time and buffer capacities
    pub fn spawn_facility(&mut self, kind: FacilityKind, position: GridPos) -> FacilityId {
        self.spawn_facility_with(kind, position, kind.construction_time())
    }

    /// Spawn a facility that is already built
    pub fn spawn_facility_built(&mut self, kind: FacilityKind, position: GridPos) -> FacilityId {
        self.spawn_facility_with(kind, position, 0.0)
    }

    fn spawn_facility_with(&mut self, kind: FacilityKind, position: GridPos, construction_time: f32) -> FacilityId {
        let id = FacilityId(self.facilities.len() as u32);
        self.facilities
            .push(Facility::new(id, kind, position, construction_time));
        id
    }

    /// Spawn a resource node
    pub fn spawn_node(&mut self, position: GridPos, resource: ResourceKind, amount: u32) -> NodeId {
        self.nodes.spawn(position, resource, amount)
    }

    /// Create a Pending task
    pub fn add_task(&mut self, kind: TaskKind, priority: TaskPriority) -> TaskId {
        let id = TaskId(self.tasks.len() as u32);
        self.tasks.push(Task::new(id, kind, priority, self.tick));
        id
    }

    pub fn serf(&self, id: SerfId) -> Option<&Serf> {
        self.serfs.get(id.0 as usize)
    }

    pub fn serf_mut(&mut self, id: SerfId) -> Option<&mut Serf> {
        self.serfs.get_mut(id.0 as usize)
    }

    pub fn facility(&self, id: FacilityId) -> Option<&Facility> {
        self.facilities.get(id.0 as usize)
    }

    pub fn facility_mut(&mut self, id: FacilityId) -> Option<&mut Facility> {
        self.facilities.get_mut(id.0 as usize)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id.0 as usize)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(id.0 as usize)
    }

    /// Serialize the observable state to JSON (for inspection and logging)
    pub fn snapshot_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Snapshot<'a> {
            time: f32,
            tick: Tick,
            serfs: &'a [Serf],
            facilities: &'a [Facility],
            tasks: &'a [Task],
            stockpile: &'a Stockpile,
            nodes: &'a NodeRegistry,
        }
        let snapshot = Snapshot {
            time: self.time,
            tick: self.tick,
            serfs: &self.serfs,
            facilities: &self.facilities,
            tasks: &self.tasks,
            stockpile: &self.stockpile,
            nodes: &self.nodes,
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::terrain::Terrain;

    fn open_map() -> TerrainMap {
        TerrainMap::filled(8, 8, Terrain::Grass).unwrap()
    }

    #[test]
    fn test_spawn_serf_at_tile_center() {
        let mut world = World::new(open_map(), GridPos::new(0, 0));
        let id = world.spawn_serf(Profession::Builder, GridPos::new(3, 2));
        let serf = world.serf(id).unwrap();
        assert_eq!(serf.position.x, 3.5);
        assert_eq!(serf.position.y, 2.5);
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut world = World::new(open_map(), GridPos::new(0, 0));
        let a = world.spawn_facility_built(FacilityKind::Sawmill, GridPos::new(1, 1));
        let b = world.spawn_facility_built(FacilityKind::Bakery, GridPos::new(2, 2));
        assert_eq!(a, FacilityId(0));
        assert_eq!(b, FacilityId(1));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut world = World::new(open_map(), GridPos::new(0, 0));
        world.spawn_serf(Profession::Carrier, GridPos::new(0, 0));
        world.spawn_node(GridPos::new(4, 4), ResourceKind::Wood, 7);
        let json = world.snapshot_json().unwrap();
        assert!(json.contains("\"tick\""));
        assert!(json.contains("Carrier"));
    }
}
