//! Serf professions and their task eligibility

use serde::{Deserialize, Serialize};

use crate::economy::facility::FacilityKind;
use crate::economy::resources::ResourceKind;

/// Profession of a serf, deciding which tasks it may take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Profession {
    Builder,
    Woodcutter,
    Stonemason,
    Miner,
    Fisher,
    Baker,
    Miller,
    Forester,
    Carrier,
}

impl Profession {
    /// The map resource this profession gathers, if any
    pub fn gathers(&self) -> Option<ResourceKind> {
        match self {
            Profession::Woodcutter => Some(ResourceKind::Wood),
            Profession::Stonemason => Some(ResourceKind::Stone),
            Profession::Miner => Some(ResourceKind::IronOre),
            Profession::Fisher => Some(ResourceKind::Fish),
            _ => None,
        }
    }

    /// The facility kind this profession staffs for stationary work, if any
    pub fn workplace_kind(&self) -> Option<FacilityKind> {
        match self {
            Profession::Baker => Some(FacilityKind::Bakery),
            Profession::Miller => Some(FacilityKind::Mill),
            Profession::Fisher => Some(FacilityKind::FishersHut),
            Profession::Woodcutter => Some(FacilityKind::WoodcuttersHut),
            Profession::Stonemason => Some(FacilityKind::Quarry),
            Profession::Miner => Some(FacilityKind::IronMine),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gathering_professions() {
        assert_eq!(Profession::Woodcutter.gathers(), Some(ResourceKind::Wood));
        assert_eq!(Profession::Miner.gathers(), Some(ResourceKind::IronOre));
        assert_eq!(Profession::Builder.gathers(), None);
        assert_eq!(Profession::Carrier.gathers(), None);
    }

    #[test]
    fn test_workplace_kinds() {
        assert_eq!(Profession::Baker.workplace_kind(), Some(FacilityKind::Bakery));
        assert_eq!(Profession::Builder.workplace_kind(), None);
    }
}
