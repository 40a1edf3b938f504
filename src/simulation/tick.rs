//! The tick orchestrator
//!
//! One call to `run_simulation_tick` advances the whole world by `dt`:
//!
//! 1. Facilities, in creation order (construction, food upkeep, production)
//! 2. Serfs, in creation order (task upkeep, then the behavior machine)
//!
//! Everything runs on the caller's thread with no interior mutability, so
//! identical initial state and an identical dt sequence replay identically.

use tracing::debug;

use crate::agent::behavior;
use crate::core::types::{FacilityId, NodeId, SerfId, TaskId};
use crate::economy::facility::FacilityEvent;
use crate::economy::resources::ResourceKind;
use crate::simulation::world::World;
use crate::task;

/// Observable outcomes of one tick, for the embedding layer
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    ConstructionComplete { facility: FacilityId },
    ProductionComplete { facility: FacilityId, resource: ResourceKind },
    RecipeCycleComplete { facility: FacilityId, recipe_id: String },
    FoodHalted { facility: FacilityId },
    FoodRestored { facility: FacilityId },
    TaskCompleted { task: TaskId, serf: SerfId },
    TaskFailed { task: TaskId, serf: SerfId },
    ResourceDeposited { serf: SerfId, facility: FacilityId, resource: ResourceKind, amount: u32 },
    StockpileDeposit { serf: SerfId, resource: ResourceKind, amount: u32 },
    NodeDepleted { node: NodeId },
    SaplingPlanted { serf: SerfId, node: NodeId },
    ConstructionAttended { serf: SerfId, facility: FacilityId },
}

/// Advance the world by `dt` time units
pub fn run_simulation_tick(world: &mut World, dt: f32) -> Vec<SimulationEvent> {
    let mut events = Vec::new();

    for i in 0..world.facilities.len() {
        let facility_id = FacilityId(i as u32);
        let facility_events = world.facilities[i].update(dt, &mut world.stockpile);
        for event in facility_events {
            events.push(match event {
                FacilityEvent::ConstructionComplete => {
                    SimulationEvent::ConstructionComplete { facility: facility_id }
                }
                FacilityEvent::Produced { resource } => {
                    SimulationEvent::ProductionComplete { facility: facility_id, resource }
                }
                FacilityEvent::CycleComplete { recipe_id } => {
                    SimulationEvent::RecipeCycleComplete { facility: facility_id, recipe_id }
                }
                FacilityEvent::FoodHalted => SimulationEvent::FoodHalted { facility: facility_id },
                FacilityEvent::FoodRestored => SimulationEvent::FoodRestored { facility: facility_id },
            });
        }
    }

    for i in 0..world.serfs.len() {
        let serf_id = SerfId(i as u32);
        if let Some(task_id) = world.serfs[i].task {
            task::update(world, task_id, dt);
        }
        behavior::execute(world, serf_id, dt, &mut events);
    }

    world.time += dt;
    world.tick += 1;

    if !events.is_empty() {
        debug!(tick = world.tick, count = events.len(), "tick events");
    }

    events
}
