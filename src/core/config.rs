//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other.

/// Configuration for the simulation systems
///
/// Time is measured in abstract time units; `dt` passed to the tick loop is
/// in the same units. Distances are in world units (tiles are
/// `tile_size` x `tile_size`).
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    // === SPATIAL SYSTEM ===
    /// World-unit size of one terrain tile
    ///
    /// Serf movement speed scales with this: a serf covers
    /// `serf_speed * tile_size` world units per time unit.
    pub tile_size: f32,

    /// Serf movement speed in tiles per time unit
    pub serf_speed: f32,

    // === CARRYING ===
    /// Maximum total units a serf can carry across all resource kinds
    pub serf_capacity: u32,

    // === GATHERING ===
    /// Time units of on-site work to extract one resource unit from a node
    ///
    /// The reference pacing is 2.0: a full 6-unit load takes 12 time units
    /// of uninterrupted gathering.
    pub gather_time_per_unit: f32,

    // === CONSTRUCTION ===
    /// Interval between a builder's work pulses at a construction site
    ///
    /// Construction itself advances in the facility engine; the pulse only
    /// paces how often the builder checks for completion.
    pub construction_pulse_interval: f32,

    // === PLANTING ===
    /// Time units of on-site work to plant one sapling
    pub planting_duration: f32,

    /// Resource amount of the node spawned by a planted sapling
    pub planted_node_amount: u32,

    // === STOCKPILE ===
    /// Optional per-resource cap on the global stockpile (None = unbounded)
    pub stockpile_cap: Option<u32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tile_size: 1.0,
            serf_speed: 1.0,
            serf_capacity: 6,
            gather_time_per_unit: 2.0,
            construction_pulse_interval: 5.0,
            planting_duration: 8.0,
            planted_node_amount: 8,
            stockpile_cap: None,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.tile_size <= 0.0 {
            return Err(format!("tile_size ({}) must be positive", self.tile_size));
        }
        if self.serf_speed <= 0.0 {
            return Err(format!("serf_speed ({}) must be positive", self.serf_speed));
        }
        if self.serf_capacity == 0 {
            return Err("serf_capacity must be at least 1".into());
        }
        if self.gather_time_per_unit <= 0.0 {
            return Err("gather_time_per_unit must be positive".into());
        }
        if self.construction_pulse_interval <= 0.0 {
            return Err("construction_pulse_interval must be positive".into());
        }
        if self.planting_duration <= 0.0 {
            return Err("planting_duration must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimulationConfig::default();
        config.serf_speed = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.serf_capacity = 0;
        assert!(config.validate().is_err());
    }
}
