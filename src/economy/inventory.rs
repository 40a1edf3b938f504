//! Capacity-bounded inventories
//!
//! `Inventory` is the per-resource-capacity store used by facilities;
//! `CarriedLoad` is the sum-bounded store a serf carries. Both support only
//! clamped add/remove, so the capacity invariants cannot be violated from
//! outside.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::economy::resources::ResourceKind;

/// Default per-resource buffer capacity when none was set explicitly
const DEFAULT_CAPACITY: u32 = 10;

/// Facility-side storage: type -> (current, capacity)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    slots: AHashMap<ResourceKind, (u32, u32)>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the buffer capacity for a resource kind
    pub fn set_capacity(&mut self, resource: ResourceKind, capacity: u32) {
        let entry = self.slots.entry(resource).or_insert((0, 0));
        entry.1 = capacity;
    }

    pub fn count(&self, resource: ResourceKind) -> u32 {
        self.slots.get(&resource).map(|(c, _)| *c).unwrap_or(0)
    }

    pub fn capacity(&self, resource: ResourceKind) -> u32 {
        self.slots
            .get(&resource)
            .map(|(_, cap)| *cap)
            .unwrap_or(DEFAULT_CAPACITY)
    }

    /// Remaining buffer space for a resource kind
    pub fn space(&self, resource: ResourceKind) -> u32 {
        self.capacity(resource).saturating_sub(self.count(resource))
    }

    /// Try to add resources, returns amount actually added (partial adds ok)
    pub fn add(&mut self, resource: ResourceKind, amount: u32) -> u32 {
        let entry = self.slots.entry(resource).or_insert((0, DEFAULT_CAPACITY));
        let space = entry.1.saturating_sub(entry.0);
        let added = amount.min(space);
        entry.0 += added;
        added
    }

    /// Try to remove resources, returns amount actually removed
    pub fn remove(&mut self, resource: ResourceKind, amount: u32) -> u32 {
        if let Some(entry) = self.slots.get_mut(&resource) {
            let removed = amount.min(entry.0);
            entry.0 -= removed;
            removed
        } else {
            0
        }
    }

    /// Check the inventory holds at least the listed amounts
    pub fn has_all(&self, requirements: &[(ResourceKind, u32)]) -> bool {
        requirements.iter().all(|(res, amount)| self.count(*res) >= *amount)
    }

    /// Check there is buffer space for all listed amounts
    pub fn has_space_for_all(&self, amounts: &[(ResourceKind, u32)]) -> bool {
        amounts.iter().all(|(res, amount)| self.space(*res) >= *amount)
    }
}

/// Serf-side load, bounded by total units across all kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarriedLoad {
    carried: AHashMap<ResourceKind, u32>,
    max_capacity: u32,
}

impl CarriedLoad {
    pub fn new(max_capacity: u32) -> Self {
        Self {
            carried: AHashMap::new(),
            max_capacity,
        }
    }

    pub fn total(&self) -> u32 {
        self.carried.values().sum()
    }

    pub fn count(&self, resource: ResourceKind) -> u32 {
        self.carried.get(&resource).copied().unwrap_or(0)
    }

    pub fn is_full(&self) -> bool {
        self.total() >= self.max_capacity
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    /// Add up to the free carrying capacity, returns amount accepted
    pub fn add(&mut self, resource: ResourceKind, amount: u32) -> u32 {
        let free = self.max_capacity.saturating_sub(self.total());
        let accepted = amount.min(free);
        if accepted > 0 {
            *self.carried.entry(resource).or_insert(0) += accepted;
        }
        accepted
    }

    /// Remove up to `amount` of a kind, returns amount removed
    pub fn remove(&mut self, resource: ResourceKind, amount: u32) -> u32 {
        match self.carried.get_mut(&resource) {
            Some(held) => {
                let removed = amount.min(*held);
                *held -= removed;
                if *held == 0 {
                    self.carried.remove(&resource);
                }
                removed
            }
            None => 0,
        }
    }

    /// Empty the load, returning (kind, amount) pairs in kind order
    pub fn take_all(&mut self) -> Vec<(ResourceKind, u32)> {
        let mut all: Vec<_> = self.carried.drain().collect();
        all.sort_by_key(|(kind, _)| *kind);
        all
    }
}
