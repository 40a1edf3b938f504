//! Terrain grid and walkability queries
//!
//! The terrain map answers the two questions the simulation core needs:
//! what tile is at (x, y), and can a serf stand there. Water and mountain
//! tiles are impassable; everything else is walkable.

use serde::{Deserialize, Serialize};

use crate::core::error::{HearthError, Result};
use crate::core::types::GridPos;

/// Terrain type of a single tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Grass,
    Forest,
    Sand,
    Water,
    Mountain,
}

impl Terrain {
    /// Whether serfs can path across this terrain
    pub fn is_walkable(&self) -> bool {
        !matches!(self, Terrain::Water | Terrain::Mountain)
    }
}

/// Rectangular tile grid, stored row-major
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainMap {
    pub width: u32,
    pub height: u32,
    tiles: Vec<Terrain>,
}

impl TerrainMap {
    /// Create a map filled with a single terrain type
    pub fn filled(width: u32, height: u32, terrain: Terrain) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(HearthError::MalformedGrid(format!(
                "dimensions must be nonzero, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            tiles: vec![terrain; (width * height) as usize],
        })
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    pub fn get_tile(&self, pos: GridPos) -> Option<Terrain> {
        if self.in_bounds(pos) {
            Some(self.tiles[(pos.y as u32 * self.width + pos.x as u32) as usize])
        } else {
            None
        }
    }

    pub fn set_tile(&mut self, pos: GridPos, terrain: Terrain) {
        if self.in_bounds(pos) {
            self.tiles[(pos.y as u32 * self.width + pos.x as u32) as usize] = terrain;
        }
    }

    /// Walkability query: in-bounds and terrain allows standing
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        self.get_tile(pos).is_some_and(|t| t.is_walkable())
    }
}
