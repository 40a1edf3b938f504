//! Task protocol: assignable work contracts binding one serf to one objective
//!
//! A task moves through a one-way lifecycle (Pending -> Active -> terminal).
//! The external allocator creates tasks, probes `can_be_executed_by` across
//! idle serfs, and calls `assign`; everything after that is driven by the
//! tick loop calling `update` and the serf state machine calling the
//! terminal transitions.
//!
//! Tasks and serfs reference each other by arena handle only, and the two
//! references are kept mutual: an Active task names exactly one serf whose
//! `task` field names it back. The terminal transitions clear both sides.

use serde::{Deserialize, Serialize};

use crate::agent::behavior::{Continuation, SerfState};
use crate::agent::movement;
use crate::core::types::{FacilityId, GridPos, SerfId, TaskId, Tick};
use crate::economy::resources::ResourceKind;
use crate::simulation::world::World;

/// Task priority levels with explicit ordering values
///
/// Higher numeric value = higher priority; the external allocator is
/// expected to offer high-priority tasks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TaskPriority {
    Low = 0,
    Normal = 1,
    High = 2,
    Critical = 3,
}

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Active,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled)
    }
}

/// The kinds of work a task can represent, with their targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TaskKind {
    /// Walk to a construction site and attend it until it finishes
    ConstructBuilding { facility: FacilityId },
    /// Cyclically gather a resource from map nodes and deliver it;
    /// `deposit` names the receiving facility, None means the global
    /// stockpile drop-off
    GatherFromNode {
        resource: ResourceKind,
        deposit: Option<FacilityId>,
    },
    /// Move up to `amount` of a resource from one facility to another
    Transport {
        from: FacilityId,
        to: FacilityId,
        resource: ResourceKind,
        amount: u32,
    },
    /// Walk to a spot and plant a sapling that becomes a wood node
    PlantSapling { position: GridPos },
    /// Staff a facility so its production runs
    WorkAtBuilding { facility: FacilityId },
}

/// An assignable unit of work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assigned_serf: Option<SerfId>,
    pub created_tick: Tick,
}

impl Task {
    pub fn new(id: TaskId, kind: TaskKind, priority: TaskPriority, created_tick: Tick) -> Self {
        Self {
            id,
            kind,
            priority,
            status: TaskStatus::Pending,
            assigned_serf: None,
            created_tick,
        }
    }
}

/// Eligibility predicate: the serf must be idle, task-free, and of the
/// profession the task kind calls for.
pub fn can_be_executed_by(world: &World, task_id: TaskId, serf_id: SerfId) -> bool {
    let (Some(task), Some(serf)) = (world.task(task_id), world.serf(serf_id)) else {
        return false;
    };
    if task.status != TaskStatus::Pending || task.assigned_serf.is_some() {
        return false;
    }
    if !serf.is_idle() || serf.task.is_some() {
        return false;
    }

    use crate::agent::profession::Profession;
    match &task.kind {
        TaskKind::ConstructBuilding { .. } => serf.profession == Profession::Builder,
        TaskKind::GatherFromNode { resource, .. } => serf.profession.gathers() == Some(*resource),
        TaskKind::Transport { .. } => serf.profession == Profession::Carrier,
        TaskKind::PlantSapling { .. } => serf.profession == Profession::Forester,
        TaskKind::WorkAtBuilding { facility } => world
            .facility(*facility)
            .is_some_and(|f| serf.profession.workplace_kind() == Some(f.kind)),
    }
}

/// Bind the task to a serf and issue the first movement order.
///
/// Returns false (leaving the task Failed) when no path to the task's
/// target exists; the allocator may retry with a fresh task later.
pub fn assign(world: &mut World, task_id: TaskId, serf_id: SerfId) -> bool {
    if !can_be_executed_by(world, task_id, serf_id) {
        return false;
    }

    if let Some(task) = world.task_mut(task_id) {
        task.status = TaskStatus::Active;
        task.assigned_serf = Some(serf_id);
    }
    if let Some(serf) = world.serf_mut(serf_id) {
        serf.task = Some(task_id);
    }

    if issue_movement(world, task_id, serf_id) {
        true
    } else {
        fail(world, task_id);
        false
    }
}

/// Per-tick task upkeep while Active.
///
/// Normally a no-op; the one recovery condition is a serf sitting Idle
/// while its task is still Active (deposit finished, search came up empty,
/// route lost). Completion is checked first so a finished objective does
/// not get its movement re-issued.
pub fn update(world: &mut World, task_id: TaskId, _dt: f32) {
    let Some(task) = world.task(task_id) else {
        return;
    };
    if task.status != TaskStatus::Active {
        return;
    }
    let Some(serf_id) = task.assigned_serf else {
        return;
    };
    let idle = world.serf(serf_id).is_some_and(|s| s.is_idle());
    if !idle {
        return;
    }

    if is_complete(world, task_id) {
        complete(world, task_id);
        return;
    }
    if !issue_movement(world, task_id, serf_id) {
        fail(world, task_id);
    }
}

/// Kind-specific completion predicate
pub fn is_complete(world: &World, task_id: TaskId) -> bool {
    let Some(task) = world.task(task_id) else {
        return false;
    };
    match &task.kind {
        TaskKind::ConstructBuilding { facility } => {
            world.facility(*facility).is_some_and(|f| f.is_constructed)
        }
        TaskKind::WorkAtBuilding { facility } => {
            world.facility(*facility).is_some_and(|f| f.output_full())
        }
        // Gathering cycles until cancelled; transport and planting complete
        // through their own terminal states.
        TaskKind::GatherFromNode { .. } | TaskKind::Transport { .. } | TaskKind::PlantSapling { .. } => {
            false
        }
    }
}

/// Terminal transition: objective achieved
pub fn complete(world: &mut World, task_id: TaskId) {
    finish(world, task_id, TaskStatus::Completed);
}

/// Terminal transition: objective unreachable (no path, empty pickup, ...)
pub fn fail(world: &mut World, task_id: TaskId) {
    finish(world, task_id, TaskStatus::Failed);
}

/// Terminal transition: withdrawn by the caller. Idempotent.
pub fn cancel(world: &mut World, task_id: TaskId) {
    finish(world, task_id, TaskStatus::Cancelled);
}

fn finish(world: &mut World, task_id: TaskId, status: TaskStatus) {
    let Some(task) = world.task(task_id) else {
        return;
    };
    if task.status.is_terminal() {
        return;
    }
    let serf_id = task.assigned_serf;
    let kind = task.kind.clone();

    if let Some(task) = world.task_mut(task_id) {
        task.status = status;
        task.assigned_serf = None;
    }

    let Some(serf_id) = serf_id else {
        return;
    };

    // Release any worker slot this task had the serf occupy
    if let TaskKind::WorkAtBuilding { facility } | TaskKind::ConstructBuilding { facility } = kind {
        if let Some(f) = world.facility_mut(facility) {
            f.remove_worker(serf_id);
        }
    }

    if let Some(serf) = world.serf_mut(serf_id) {
        serf.task = None;
        serf.state = SerfState::Idle;
        serf.clear_path();
    }
}

/// Movement helper: route the serf to `dest` and enter MovingToTarget with
/// the given continuation. Returns false when no path exists.
pub(crate) fn order_move_to(
    world: &mut World,
    serf_id: SerfId,
    dest: GridPos,
    continuation: Continuation,
) -> bool {
    let tile_size = world.config.tile_size;
    let idx = serf_id.0 as usize;
    if idx >= world.serfs.len() {
        return false;
    }
    if movement::set_route(&mut world.serfs[idx], &world.map, dest, tile_size) {
        world.serfs[idx].state = SerfState::MovingToTarget { continuation };
        true
    } else {
        false
    }
}

/// Issue the task's opening movement order (also used for recovery)
fn issue_movement(world: &mut World, task_id: TaskId, serf_id: SerfId) -> bool {
    let Some(task) = world.task(task_id) else {
        return false;
    };
    let kind = task.kind.clone();
    let tile_size = world.config.tile_size;

    match kind {
        TaskKind::ConstructBuilding { facility } => {
            let Some(pos) = world.facility(facility).map(|f| f.position) else {
                return false;
            };
            order_move_to(world, serf_id, pos, Continuation::BeginConstruction)
        }
        TaskKind::GatherFromNode { resource, .. } => {
            if let Some(serf) = world.serf_mut(serf_id) {
                serf.state = SerfState::SearchingForResource { resource };
                true
            } else {
                false
            }
        }
        TaskKind::Transport { from, .. } => {
            let Some(pos) = world.facility(from).map(|f| f.position) else {
                return false;
            };
            let idx = serf_id.0 as usize;
            if idx >= world.serfs.len() {
                return false;
            }
            if movement::set_route(&mut world.serfs[idx], &world.map, pos, tile_size) {
                world.serfs[idx].state = SerfState::MovingToPickup;
                true
            } else {
                false
            }
        }
        TaskKind::PlantSapling { position } => {
            order_move_to(world, serf_id, position, Continuation::BeginFieldWork)
        }
        TaskKind::WorkAtBuilding { facility } => {
            let Some(pos) = world.facility(facility).map(|f| f.position) else {
                return false;
            };
            order_move_to(world, serf_id, pos, Continuation::BeginWorking)
        }
    }
}
