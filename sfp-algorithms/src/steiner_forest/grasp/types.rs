use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_ALPHA: f64 = 1.0;
pub const DEFAULT_ITERATIONS: usize = 50;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Hyperparameters {
    /// Fraction of the sorted candidate list eligible for random selection.
    /// `0.0` is purely greedy, `1.0` purely random.
    pub alpha: f64,
    pub iterations: usize,
    /// Fixes the random stream. Fresh entropy is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            iterations: DEFAULT_ITERATIONS,
            seed: None,
        }
    }
}

impl Hyperparameters {
    pub fn from_map(hyperparameters: &Option<Map<String, Value>>) -> Result<Self> {
        let parsed = match hyperparameters {
            Some(map) => serde_json::from_value::<Self>(Value::Object(map.clone()))
                .map_err(|e| anyhow!("Invalid hyperparameters: {}", e))?,
            None => Self::default(),
        };
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(anyhow!("alpha must be within [0, 1], got {}", self.alpha));
        }
        if self.iterations == 0 {
            return Err(anyhow!("iterations must be positive"));
        }
        Ok(())
    }
}

/// Strictly cheaper. Equal costs are rejected.
pub fn is_improvement(candidate: f64, current: f64) -> bool {
    candidate < current
}
