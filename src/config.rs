use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::equity::EquityBudget;
use crate::error::{PokerError, Result};
use crate::policy::PolicyConfig;

pub const DEFAULT_MAX_TRIALS: u32 = 200_000;

/// Settings for an [`Advisor`](crate::advisor::Advisor), loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// RNG seed (random if omitted).
    pub seed: Option<u64>,
    pub policy: PolicyConfig,
    /// Spread equity trials across the rayon pool.
    pub parallel: bool,
    /// Wall-clock cap per equity estimate.
    pub deadline_ms: Option<u64>,
    /// Ceiling on trials for any single estimate, including per-request overrides.
    pub max_trials: u32,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            policy: PolicyConfig::default(),
            parallel: false,
            deadline_ms: None,
            max_trials: DEFAULT_MAX_TRIALS,
        }
    }
}

impl AdvisorConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| PokerError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn budget(&self) -> EquityBudget {
        EquityBudget {
            trials: self.policy.trials.min(self.max_trials),
            deadline: self.deadline_ms.map(Duration::from_millis),
        }
    }
}
