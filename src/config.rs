/// Tunables for a simulation run.
///
/// `SimConfig` carries every knob the engine's default policies read. It
/// can be built in code, taken from `Default`, or (with the `serialize`
/// feature) loaded from JSON.

use crate::activity::DEFAULT_LOG_CAPACITY;
use crate::error::{SimError, SimResult};

/// Configuration for the default failure, migration and logging policies.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct SimConfig {
    /// Minimum load gap between most and least loaded devices that
    /// triggers a migration.
    pub imbalance_threshold: u64,
    /// Per-step probability that an online device fails, in `[0.0, 1.0]`.
    pub fail_probability: f64,
    /// Steps a failed device stays down before it may recover.
    pub recovery_delay: u64,
    /// Lines kept by the activity log.
    pub log_capacity: usize,
    /// Seed for the failure RNG.
    pub seed: u64,
}

impl SimConfig {
    /// No failures; otherwise defaults.
    pub fn stable() -> Self {
        SimConfig {
            fail_probability: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(0.0..=1.0).contains(&self.fail_probability) {
            return Err(SimError::InvalidConfig(format!(
                "fail_probability must be within [0, 1], got {}",
                self.fail_probability
            )));
        }
        if self.log_capacity == 0 {
            return Err(SimError::InvalidConfig(
                "log_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    #[cfg(feature = "serialize")]
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: SimConfig =
            serde_json::from_str(json).map_err(|e| SimError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            imbalance_threshold: 2,
            fail_probability: 0.05,
            recovery_delay: 5,
            log_capacity: DEFAULT_LOG_CAPACITY,
            seed: 0,
        }
    }
}
