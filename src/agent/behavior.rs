//! Per-serf behavior state machine
//!
//! Every serf is driven by one exhaustive match over its `SerfState`. Each
//! arm advances at most one step per tick: follow the route, gather a unit,
//! unload, check a completion condition. Transitions that end a task go
//! through the task lifecycle functions, which clear both sides of the
//! task<->serf binding and leave the serf Idle.
//!
//! A serf whose state references a vanished entity (facility gone, node
//! missing) logs the inconsistency and recovers to Idle rather than
//! wedging the simulation.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::agent::movement::{self, MoveOutcome};
use crate::core::types::{FacilityId, NodeId, SerfId};
use crate::economy::resources::ResourceKind;
use crate::simulation::tick::SimulationEvent;
use crate::simulation::world::World;
use crate::task::{self, TaskKind};

/// What a serf does on arrival when the walk itself carries no context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Continuation {
    BeginConstruction,
    BeginWorking,
    BeginFieldWork,
}

/// The full behavior state of one serf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SerfState {
    Idle,
    /// Generic walk; on arrival the continuation picks the next state
    MovingToTarget { continuation: Continuation },

    // Gather cycle
    SearchingForResource { resource: ResourceKind },
    MovingToResourceNode { node: NodeId },
    GatheringFromNode { node: NodeId, work: f32 },
    MovingToDeposit { facility: FacilityId },
    DepositingAtFacility { facility: FacilityId },
    /// Gather delivery with no receiving facility: walk to the stockpile
    ReturningToDropoff,
    DepositingToStockpile,

    // Construction / staffing
    Constructing { next_pulse: f32 },
    WorkingAtFacility { facility: FacilityId },

    // Transport cycle
    MovingToPickup,
    PickingUp,
    MovingToDropoff,
    DroppingOff,

    // Forestry
    PerformingFieldWork { remaining: f32 },
}

/// Advance one serf by `dt`, pushing observable transitions into `events`
pub fn execute(world: &mut World, serf_id: SerfId, dt: f32, events: &mut Vec<SimulationEvent>) {
    let idx = serf_id.0 as usize;
    if idx >= world.serfs.len() {
        return;
    }
    let state = world.serfs[idx].state.clone();

    match state {
        SerfState::Idle => {}

        SerfState::MovingToTarget { continuation } => {
            match movement::follow_path(&mut world.serfs[idx], &world.config, dt) {
                MoveOutcome::Moving => {}
                MoveOutcome::Arrived => arrive_at_target(world, serf_id, continuation, events),
                MoveOutcome::PathLost => fail_current_task(world, serf_id, events),
            }
        }

        SerfState::SearchingForResource { resource } => {
            let tile_size = world.config.tile_size;
            let here = world.serfs[idx].grid_pos(tile_size);
            let found = world.nodes.find_nearest(resource, here).map(|n| (n.id, n.position));
            match found {
                Some((node, pos)) => {
                    if movement::set_route(&mut world.serfs[idx], &world.map, pos, tile_size) {
                        world.serfs[idx].state = SerfState::MovingToResourceNode { node };
                    } else {
                        // Unreachable node; give up this tick, retry later
                        world.serfs[idx].state = SerfState::Idle;
                    }
                }
                None => {
                    // Nothing left on the map. The task stays Active so the
                    // search retries once new nodes appear.
                    world.serfs[idx].state = SerfState::Idle;
                }
            }
        }

        SerfState::MovingToResourceNode { node } => {
            match movement::follow_path(&mut world.serfs[idx], &world.config, dt) {
                MoveOutcome::Moving => {}
                MoveOutcome::Arrived => {
                    world.serfs[idx].state = SerfState::GatheringFromNode { node, work: 0.0 };
                }
                MoveOutcome::PathLost => {
                    world.serfs[idx].state = SerfState::Idle;
                }
            }
        }

        SerfState::GatheringFromNode { node, work } => {
            gather_step(world, serf_id, node, work, dt, events);
        }

        SerfState::MovingToDeposit { facility } => {
            match movement::follow_path(&mut world.serfs[idx], &world.config, dt) {
                MoveOutcome::Moving => {}
                MoveOutcome::Arrived => {
                    world.serfs[idx].state = SerfState::DepositingAtFacility { facility };
                }
                MoveOutcome::PathLost => {
                    world.serfs[idx].state = SerfState::Idle;
                }
            }
        }

        SerfState::DepositingAtFacility { facility } => {
            if world.facility(facility).is_none() {
                recover_to_idle(world, serf_id, "deposit target facility is gone");
                return;
            }
            let load = world.serfs[idx].carried.take_all();
            for (kind, amount) in load {
                let accepted = match world.facility_mut(facility) {
                    Some(f) => f.add_resource(kind, amount),
                    None => 0,
                };
                if accepted > 0 {
                    events.push(SimulationEvent::ResourceDeposited {
                        serf: serf_id,
                        facility,
                        resource: kind,
                        amount: accepted,
                    });
                }
                if accepted < amount {
                    // Buffer full; keep the remainder on our back
                    world.serfs[idx].carried.add(kind, amount - accepted);
                }
            }
            // The gather task persists; its update re-issues the search.
            world.serfs[idx].state = SerfState::Idle;
        }

        SerfState::ReturningToDropoff => {
            match movement::follow_path(&mut world.serfs[idx], &world.config, dt) {
                MoveOutcome::Moving => {}
                MoveOutcome::Arrived => {
                    world.serfs[idx].state = SerfState::DepositingToStockpile;
                }
                MoveOutcome::PathLost => {
                    world.serfs[idx].state = SerfState::Idle;
                }
            }
        }

        SerfState::DepositingToStockpile => {
            let load = world.serfs[idx].carried.take_all();
            for (kind, amount) in load {
                if world.stockpile.add(kind, amount) {
                    events.push(SimulationEvent::StockpileDeposit {
                        serf: serf_id,
                        resource: kind,
                        amount,
                    });
                } else {
                    world.serfs[idx].carried.add(kind, amount);
                }
            }
            world.serfs[idx].state = SerfState::Idle;
        }

        SerfState::Constructing { next_pulse } => {
            let Some(task_id) = world.serfs[idx].task else {
                recover_to_idle(world, serf_id, "constructing without a task");
                return;
            };
            if task::is_complete(world, task_id) {
                let facility = construction_target(world, serf_id);
                task::complete(world, task_id);
                events.push(SimulationEvent::TaskCompleted { task: task_id, serf: serf_id });
                if let Some(facility) = facility {
                    events.push(SimulationEvent::ConstructionAttended { serf: serf_id, facility });
                }
                return;
            }
            // Construction time is advanced by the facility itself; the
            // builder just re-checks on a fixed cadence.
            let mut next_pulse = next_pulse - dt;
            if next_pulse <= 0.0 {
                next_pulse = world.config.construction_pulse_interval;
            }
            world.serfs[idx].state = SerfState::Constructing { next_pulse };
        }

        SerfState::WorkingAtFacility { facility } => {
            let Some(task_id) = world.serfs[idx].task else {
                recover_to_idle(world, serf_id, "working without a task");
                return;
            };
            if world.facility(facility).is_none() {
                recover_to_idle(world, serf_id, "workplace facility is gone");
                return;
            }
            if task::is_complete(world, task_id) {
                // Output buffer is full; free the serf for other work.
                task::complete(world, task_id);
                events.push(SimulationEvent::TaskCompleted { task: task_id, serf: serf_id });
            }
            // Otherwise stand at the facility; production runs in the
            // facility update as long as we occupy a worker slot.
        }

        SerfState::MovingToPickup => {
            match movement::follow_path(&mut world.serfs[idx], &world.config, dt) {
                MoveOutcome::Moving => {}
                MoveOutcome::Arrived => {
                    world.serfs[idx].state = SerfState::PickingUp;
                }
                MoveOutcome::PathLost => fail_current_task(world, serf_id, events),
            }
        }

        SerfState::PickingUp => {
            pickup_step(world, serf_id, events);
        }

        SerfState::MovingToDropoff => {
            match movement::follow_path(&mut world.serfs[idx], &world.config, dt) {
                MoveOutcome::Moving => {}
                MoveOutcome::Arrived => {
                    world.serfs[idx].state = SerfState::DroppingOff;
                }
                MoveOutcome::PathLost => fail_current_task(world, serf_id, events),
            }
        }

        SerfState::DroppingOff => {
            dropoff_step(world, serf_id, events);
        }

        SerfState::PerformingFieldWork { remaining } => {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                world.serfs[idx].state = SerfState::PerformingFieldWork { remaining };
                return;
            }
            let Some(task_id) = world.serfs[idx].task else {
                recover_to_idle(world, serf_id, "field work without a task");
                return;
            };
            let position = match world.task(task_id).map(|t| t.kind.clone()) {
                Some(TaskKind::PlantSapling { position }) => position,
                _ => {
                    recover_to_idle(world, serf_id, "field work task is not a planting task");
                    return;
                }
            };
            let amount = world.config.planted_node_amount;
            let node = world.nodes.spawn(position, ResourceKind::Wood, amount);
            events.push(SimulationEvent::SaplingPlanted { serf: serf_id, node });
            task::complete(world, task_id);
            events.push(SimulationEvent::TaskCompleted { task: task_id, serf: serf_id });
        }
    }
}

/// Arrival handler for `MovingToTarget`
fn arrive_at_target(
    world: &mut World,
    serf_id: SerfId,
    continuation: Continuation,
    events: &mut Vec<SimulationEvent>,
) {
    let idx = serf_id.0 as usize;
    match continuation {
        Continuation::BeginConstruction => {
            let Some(facility) = construction_target(world, serf_id) else {
                recover_to_idle(world, serf_id, "arrived to construct but the task is not a construction task");
                return;
            };
            let attended = world
                .facility_mut(facility)
                .is_some_and(|f| f.assign_worker(serf_id));
            if !attended {
                fail_current_task(world, serf_id, events);
                return;
            }
            world.serfs[idx].state = SerfState::Constructing {
                next_pulse: world.config.construction_pulse_interval,
            };
        }
        Continuation::BeginWorking => {
            let facility = match world.serfs[idx].task.and_then(|t| world.task(t)).map(|t| t.kind.clone()) {
                Some(TaskKind::WorkAtBuilding { facility }) => facility,
                _ => {
                    recover_to_idle(world, serf_id, "arrived to work but the task is not a staffing task");
                    return;
                }
            };
            let seated = world
                .facility_mut(facility)
                .is_some_and(|f| f.assign_worker(serf_id));
            if !seated {
                fail_current_task(world, serf_id, events);
                return;
            }
            world.serfs[idx].workplace = Some(facility);
            world.serfs[idx].state = SerfState::WorkingAtFacility { facility };
        }
        Continuation::BeginFieldWork => {
            world.serfs[idx].state = SerfState::PerformingFieldWork {
                remaining: world.config.planting_duration,
            };
        }
    }
}

/// One tick of gathering at a node
fn gather_step(
    world: &mut World,
    serf_id: SerfId,
    node: NodeId,
    work: f32,
    dt: f32,
    events: &mut Vec<SimulationEvent>,
) {
    let idx = serf_id.0 as usize;
    let Some(resource) = world.nodes.get(node).map(|n| n.resource) else {
        recover_to_idle(world, serf_id, "gather node is gone");
        return;
    };

    let per_unit = world.config.gather_time_per_unit;
    let mut work = work + dt;
    let mut depleted = world.nodes.get(node).is_some_and(|n| n.is_depleted());

    while work >= per_unit && !world.serfs[idx].carried.is_full() && !depleted {
        let taken = world.nodes.gather(node, 1);
        if taken == 0 {
            depleted = true;
            break;
        }
        work -= per_unit;
        world.serfs[idx].carried.add(resource, taken);
        if world.nodes.get(node).is_some_and(|n| n.is_depleted()) {
            depleted = true;
            events.push(SimulationEvent::NodeDepleted { node });
        }
    }

    if world.serfs[idx].carried.is_full() {
        begin_delivery(world, serf_id, events);
    } else if depleted {
        if world.serfs[idx].carried.is_empty() {
            world.serfs[idx].state = SerfState::SearchingForResource { resource };
        } else {
            begin_delivery(world, serf_id, events);
        }
    } else {
        world.serfs[idx].state = SerfState::GatheringFromNode { node, work };
    }
}

/// Route a loaded gatherer to its delivery point: the task's deposit
/// facility, the serf's workplace, or the global stockpile drop-off.
fn begin_delivery(world: &mut World, serf_id: SerfId, events: &mut Vec<SimulationEvent>) {
    let idx = serf_id.0 as usize;
    let tile_size = world.config.tile_size;

    let deposit = match world.serfs[idx].task.and_then(|t| world.task(t)).map(|t| t.kind.clone()) {
        Some(TaskKind::GatherFromNode { deposit, .. }) => deposit,
        _ => None,
    };
    let target = deposit.or(world.serfs[idx].workplace);

    if let Some(facility) = target {
        let Some(pos) = world.facility(facility).map(|f| f.position) else {
            recover_to_idle(world, serf_id, "delivery facility is gone");
            return;
        };
        if movement::set_route(&mut world.serfs[idx], &world.map, pos, tile_size) {
            world.serfs[idx].state = SerfState::MovingToDeposit { facility };
        } else {
            fail_current_task(world, serf_id, events);
        }
    } else {
        let pos = world.stockpile_position;
        if movement::set_route(&mut world.serfs[idx], &world.map, pos, tile_size) {
            world.serfs[idx].state = SerfState::ReturningToDropoff;
        } else {
            fail_current_task(world, serf_id, events);
        }
    }
}

/// Load up at the transport source facility and head for the destination
fn pickup_step(world: &mut World, serf_id: SerfId, events: &mut Vec<SimulationEvent>) {
    let idx = serf_id.0 as usize;
    let Some(task_id) = world.serfs[idx].task else {
        recover_to_idle(world, serf_id, "picking up without a task");
        return;
    };
    let (from, to, resource, amount) = match world.task(task_id).map(|t| t.kind.clone()) {
        Some(TaskKind::Transport { from, to, resource, amount }) => (from, to, resource, amount),
        _ => {
            recover_to_idle(world, serf_id, "pickup task is not a transport task");
            return;
        }
    };

    let free = world.serfs[idx]
        .carried
        .max_capacity()
        .saturating_sub(world.serfs[idx].carried.total());
    let want = amount.min(free);
    let got = match world.facility_mut(from) {
        Some(f) => f.remove_resource(resource, want),
        None => 0,
    };
    if got == 0 {
        // Nothing to haul; the order cannot be fulfilled.
        fail_current_task(world, serf_id, events);
        return;
    }
    world.serfs[idx].carried.add(resource, got);

    let tile_size = world.config.tile_size;
    let Some(pos) = world.facility(to).map(|f| f.position) else {
        recover_to_idle(world, serf_id, "transport destination is gone");
        return;
    };
    if movement::set_route(&mut world.serfs[idx], &world.map, pos, tile_size) {
        world.serfs[idx].state = SerfState::MovingToDropoff;
    } else {
        fail_current_task(world, serf_id, events);
    }
}

/// Unload at the transport destination and complete the haul
fn dropoff_step(world: &mut World, serf_id: SerfId, events: &mut Vec<SimulationEvent>) {
    let idx = serf_id.0 as usize;
    let Some(task_id) = world.serfs[idx].task else {
        recover_to_idle(world, serf_id, "dropping off without a task");
        return;
    };
    let to = match world.task(task_id).map(|t| t.kind.clone()) {
        Some(TaskKind::Transport { to, .. }) => to,
        _ => {
            recover_to_idle(world, serf_id, "dropoff task is not a transport task");
            return;
        }
    };
    if world.facility(to).is_none() {
        recover_to_idle(world, serf_id, "dropoff facility is gone");
        return;
    }

    let load = world.serfs[idx].carried.take_all();
    for (kind, amount) in load {
        let accepted = match world.facility_mut(to) {
            Some(f) => f.add_resource(kind, amount),
            None => 0,
        };
        if accepted > 0 {
            events.push(SimulationEvent::ResourceDeposited {
                serf: serf_id,
                facility: to,
                resource: kind,
                amount: accepted,
            });
        }
        if accepted < amount {
            world.serfs[idx].carried.add(kind, amount - accepted);
        }
    }

    task::complete(world, task_id);
    events.push(SimulationEvent::TaskCompleted { task: task_id, serf: serf_id });
}

/// The facility of the serf's construction task, if that is what it holds
fn construction_target(world: &World, serf_id: SerfId) -> Option<FacilityId> {
    let task_id = world.serf(serf_id)?.task?;
    match world.task(task_id)?.kind {
        TaskKind::ConstructBuilding { facility } => Some(facility),
        _ => None,
    }
}

/// Fail the serf's current task (clearing both references); a task-less
/// serf just returns to Idle.
fn fail_current_task(world: &mut World, serf_id: SerfId, events: &mut Vec<SimulationEvent>) {
    let idx = serf_id.0 as usize;
    if let Some(task_id) = world.serfs[idx].task {
        task::fail(world, task_id);
        events.push(SimulationEvent::TaskFailed { task: task_id, serf: serf_id });
    } else {
        world.serfs[idx].state = SerfState::Idle;
        world.serfs[idx].clear_path();
    }
}

/// Inconsistent state encountered: log it and reset the serf to Idle,
/// leaving any task for its own upkeep to sort out.
fn recover_to_idle(world: &mut World, serf_id: SerfId, reason: &str) {
    warn!(serf = serf_id.0, reason, "serf state inconsistency, recovering to idle");
    let idx = serf_id.0 as usize;
    world.serfs[idx].state = SerfState::Idle;
    world.serfs[idx].clear_path();
}
