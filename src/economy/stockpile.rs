//! Global settlement stockpile
//!
//! A key -> quantity store shared by the whole settlement. Unbounded by
//! default; an optional per-resource cap can be set. `add`/`remove` are
//! all-or-nothing (the collaborator contract); `draw_up_to` exists for the
//! food-upkeep engine, which accepts partial draws.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::economy::resources::ResourceKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stockpile {
    resources: AHashMap<ResourceKind, u32>,
    cap: Option<u32>,
}

impl Stockpile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stockpile with a per-resource cap
    pub fn with_cap(cap: u32) -> Self {
        Self {
            resources: AHashMap::new(),
            cap: Some(cap),
        }
    }

    pub fn get_count(&self, resource: ResourceKind) -> u32 {
        self.resources.get(&resource).copied().unwrap_or(0)
    }

    /// Add the full amount, or nothing if it would exceed the cap
    pub fn add(&mut self, resource: ResourceKind, amount: u32) -> bool {
        let current = self.get_count(resource);
        if let Some(cap) = self.cap {
            if current + amount > cap {
                return false;
            }
        }
        *self.resources.entry(resource).or_insert(0) += amount;
        true
    }

    /// Remove the full amount, or nothing if insufficient
    pub fn remove(&mut self, resource: ResourceKind, amount: u32) -> bool {
        match self.resources.get_mut(&resource) {
            Some(held) if *held >= amount => {
                *held -= amount;
                true
            }
            _ => false,
        }
    }

    /// Remove up to `amount`, returning what was actually taken
    pub fn draw_up_to(&mut self, resource: ResourceKind, amount: u32) -> u32 {
        match self.resources.get_mut(&resource) {
            Some(held) => {
                let taken = amount.min(*held);
                *held -= taken;
                taken
            }
            None => 0,
        }
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> AHashMap<ResourceKind, u32> {
        self.resources.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_count() {
        let mut pile = Stockpile::new();
        assert!(pile.add(ResourceKind::Wood, 10));
        assert!(pile.add(ResourceKind::Wood, 5));
        assert_eq!(pile.get_count(ResourceKind::Wood), 15);
        assert_eq!(pile.get_count(ResourceKind::Stone), 0);
    }

    #[test]
    fn test_remove_all_or_nothing() {
        let mut pile = Stockpile::new();
        pile.add(ResourceKind::Bread, 3);

        assert!(!pile.remove(ResourceKind::Bread, 4));
        assert_eq!(pile.get_count(ResourceKind::Bread), 3);

        assert!(pile.remove(ResourceKind::Bread, 3));
        assert_eq!(pile.get_count(ResourceKind::Bread), 0);
    }

    #[test]
    fn test_capped_add() {
        let mut pile = Stockpile::with_cap(10);
        assert!(pile.add(ResourceKind::Stone, 8));
        assert!(!pile.add(ResourceKind::Stone, 3));
        assert_eq!(pile.get_count(ResourceKind::Stone), 8);
        assert!(pile.add(ResourceKind::Stone, 2));
    }

    #[test]
    fn test_draw_up_to_partial() {
        let mut pile = Stockpile::new();
        pile.add(ResourceKind::Fish, 2);
        assert_eq!(pile.draw_up_to(ResourceKind::Fish, 5), 2);
        assert_eq!(pile.draw_up_to(ResourceKind::Fish, 5), 0);
    }

    #[test]
    fn test_snapshot() {
        let mut pile = Stockpile::new();
        pile.add(ResourceKind::Wood, 7);
        let snap = pile.snapshot();
        assert_eq!(snap.get(&ResourceKind::Wood), Some(&7));
    }
}
