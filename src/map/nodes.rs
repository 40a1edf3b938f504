//! Depletable map resource nodes (trees, ore veins, fishing grounds)
//!
//! Nodes are gathered by serfs and never regenerate. A depleted node stays
//! in the arena (ids remain stable for any external representation that
//! needs to tear down) but is invisible to queries.

use serde::{Deserialize, Serialize};

use crate::core::types::{GridPos, NodeId};
use crate::economy::resources::ResourceKind;

/// A gatherable resource embedded in the map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: NodeId,
    pub position: GridPos,
    pub resource: ResourceKind,
    pub remaining: u32,
}

impl ResourceNode {
    pub fn is_depleted(&self) -> bool {
        self.remaining == 0
    }
}

/// Flat arena of resource nodes, iterated in creation order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeRegistry {
    nodes: Vec<ResourceNode>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, position: GridPos, resource: ResourceKind, amount: u32) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(ResourceNode {
            id,
            position,
            resource,
            remaining: amount,
        });
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&ResourceNode> {
        self.nodes.get(id.0 as usize)
    }

    /// Nearest non-depleted node of the given kind, by Manhattan distance.
    /// Ties resolve to the earliest-created node.
    pub fn find_nearest(&self, resource: ResourceKind, near: GridPos) -> Option<&ResourceNode> {
        self.nodes
            .iter()
            .filter(|n| n.resource == resource && !n.is_depleted())
            .min_by_key(|n| n.position.manhattan(&near))
    }

    /// Extract up to `amount` units, returning what was actually taken.
    ///
    /// Re-validates `remaining` at the moment of the call: several serfs may
    /// target the same node across ticks and find it emptied on arrival.
    pub fn gather(&mut self, id: NodeId, amount: u32) -> u32 {
        match self.nodes.get_mut(id.0 as usize) {
            Some(node) if node.remaining > 0 => {
                let taken = amount.min(node.remaining);
                node.remaining -= taken;
                taken
            }
            _ => 0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_get() {
        let mut reg = NodeRegistry::new();
        let id = reg.spawn(GridPos::new(3, 4), ResourceKind::Wood, 10);
        let node = reg.get(id).unwrap();
        assert_eq!(node.resource, ResourceKind::Wood);
        assert_eq!(node.remaining, 10);
        assert!(!node.is_depleted());
    }

    #[test]
    fn test_find_nearest_prefers_closer() {
        let mut reg = NodeRegistry::new();
        reg.spawn(GridPos::new(10, 10), ResourceKind::Wood, 5);
        let near_id = reg.spawn(GridPos::new(2, 2), ResourceKind::Wood, 5);
        reg.spawn(GridPos::new(5, 5), ResourceKind::Stone, 5);

        let found = reg.find_nearest(ResourceKind::Wood, GridPos::new(0, 0)).unwrap();
        assert_eq!(found.id, near_id);
    }

    #[test]
    fn test_find_nearest_skips_depleted() {
        let mut reg = NodeRegistry::new();
        let close = reg.spawn(GridPos::new(1, 1), ResourceKind::Stone, 3);
        let far = reg.spawn(GridPos::new(8, 8), ResourceKind::Stone, 3);

        reg.gather(close, 3);
        let found = reg.find_nearest(ResourceKind::Stone, GridPos::new(0, 0)).unwrap();
        assert_eq!(found.id, far);
    }

    #[test]
    fn test_find_nearest_none_for_missing_kind() {
        let mut reg = NodeRegistry::new();
        reg.spawn(GridPos::new(1, 1), ResourceKind::Stone, 3);
        assert!(reg.find_nearest(ResourceKind::Wood, GridPos::new(0, 0)).is_none());
    }

    #[test]
    fn test_gather_clamps_and_depletes() {
        let mut reg = NodeRegistry::new();
        let id = reg.spawn(GridPos::new(0, 0), ResourceKind::IronOre, 4);

        assert_eq!(reg.gather(id, 3), 3);
        assert_eq!(reg.gather(id, 3), 1);
        assert_eq!(reg.gather(id, 3), 0);
        assert!(reg.get(id).unwrap().is_depleted());
    }
}
