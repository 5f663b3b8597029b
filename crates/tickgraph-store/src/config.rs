//! Engine configuration.
//!
//! Loaded from JSON (every field optional) or built in code from
//! [`EngineConfig::default`]. Defaults reproduce the reference layout:
//! a 16384-slot predicate/subject index and an 8192-bucket interner.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::interner::DEFAULT_BUCKETS;

/// Default predicate/subject index capacity.
pub const DEFAULT_PS_CAPACITY: usize = 16384;

/// Number of slots `ask_pattern` inspects before its slow path.
pub const FAST_PROBE_BUDGET: usize = 4;

/// How `ask_pattern` (and the other read probes) handle long probe chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbePolicy {
    /// Give up after [`FAST_PROBE_BUDGET`] slots. Can report a stored triple
    /// as absent under pathological collisions.
    Bounded,
    /// Probe [`FAST_PROBE_BUDGET`] slots, then continue until an empty slot.
    #[default]
    Exhaustive,
}

/// What `add_triple` does with an edge that is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Append again: object lists, property counts and the triple count
    /// are multisets.
    #[default]
    Keep,
    /// Drop exact duplicates (set semantics).
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Predicate/subject slot count. Power of two, at least 16.
    pub ps_capacity: usize,
    /// Interner chain count.
    pub interner_buckets: usize,
    /// Initial length of the per-id arrays (P, O, property counts, types).
    pub initial_id_capacity: usize,
    /// Initial bit capacity of a freshly allocated `P[p]` / `O[o]`.
    pub initial_bit_capacity: usize,
    pub probe_policy: ProbePolicy,
    pub duplicate_policy: DuplicatePolicy,
    /// Load factor at which a one-shot occupancy warning is logged.
    pub occupancy_warn_ratio: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ps_capacity: DEFAULT_PS_CAPACITY,
            interner_buckets: DEFAULT_BUCKETS,
            initial_id_capacity: 1024,
            initial_bit_capacity: 1024,
            probe_policy: ProbePolicy::Exhaustive,
            duplicate_policy: DuplicatePolicy::Keep,
            occupancy_warn_ratio: 0.75,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.ps_capacity.is_power_of_two() || self.ps_capacity < 16 {
            return Err(EngineError::InvalidConfig(format!(
                "ps_capacity must be a power of two >= 16, got {}",
                self.ps_capacity
            )));
        }
        if self.interner_buckets == 0 {
            return Err(EngineError::InvalidConfig(
                "interner_buckets must be positive".to_string(),
            ));
        }
        if !(self.occupancy_warn_ratio > 0.0 && self.occupancy_warn_ratio <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "occupancy_warn_ratio must be in (0, 1], got {}",
                self.occupancy_warn_ratio
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}
