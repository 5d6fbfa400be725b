//! Engine configuration
//!
//! One [`EngineConfig`] drives both engines. It can be built in code or read
//! from JSON; every field has a default, so `{}` is a valid config.

use meshsim_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Decay factor of Wang's semantic-value method
pub const DEFAULT_DECAY: f64 = 0.7;

/// Tolerance for probability mass that overshoots 1 through float summation
pub const DEFAULT_MASS_TOLERANCE: f64 = 1e-9;

/// Where least-common-subsumer candidates come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsumerStrategy {
    /// Longest shared tree-code prefix
    #[default]
    PathCode,
    /// Intersection of the ancestor closures
    Ancestry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub decay: f64,
    pub subsumer_strategy: SubsumerStrategy,
    pub mass_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decay: DEFAULT_DECAY,
            subsumer_strategy: SubsumerStrategy::PathCode,
            mass_tolerance: DEFAULT_MASS_TOLERANCE,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        validate_decay(self.decay)?;
        if !self.mass_tolerance.is_finite() || self.mass_tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "mass_tolerance must be a non-negative number, got {}",
                self.mass_tolerance
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn validate_decay(decay: f64) -> Result<()> {
    if decay > 0.0 && decay < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!("decay must lie in (0, 1), got {}", decay)))
    }
}
