//! Resource kinds moved through the settlement economy

use serde::{Deserialize, Serialize};

/// Closed set of resource kinds
///
/// Raw materials come from map nodes or simple producers; processed goods
/// come out of facility recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Wood,
    Stone,
    IronOre,
    CoalOre,
    Plank,
    Grain,
    Flour,
    Bread,
    Fish,
}

impl ResourceKind {
    /// Whether this resource satisfies facility food upkeep
    pub fn is_food(&self) -> bool {
        matches!(self, ResourceKind::Bread | ResourceKind::Fish | ResourceKind::Grain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_food_kinds() {
        assert!(ResourceKind::Bread.is_food());
        assert!(ResourceKind::Fish.is_food());
        assert!(ResourceKind::Grain.is_food());
        assert!(!ResourceKind::Wood.is_food());
        assert!(!ResourceKind::IronOre.is_food());
    }
}
