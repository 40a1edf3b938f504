//! Terrain grid and map-embedded resource nodes

pub mod nodes;
pub mod terrain;

pub use nodes::{NodeRegistry, ResourceNode};
pub use terrain::{Terrain, TerrainMap};
