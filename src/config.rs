//! Agent hyperparameters.
//!
//! [`AgentConfig`] is built once, validated, and then only read. Every tunable
//! has a default matching the classic small-grid setup:
//!
//! | field                | default | valid range       |
//! |----------------------|---------|-------------------|
//! | `minibatch_size`     | 32      | `>= 1`            |
//! | `replay_memory_size` | 1000    | `>= 1`            |
//! | `learning_rate`      | 0.001   | `> 0`, finite     |
//! | `discount_factor`    | 0.9     | `[0, 1]`          |
//! | `exploration`        | 0.1     | `[0, 1]`          |
//! | `seed`               | none    | any `u64`         |

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{DqnError, Result};

/// Immutable configuration of a [`DqnAgent`](crate::agent::DqnAgent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    minibatch_size: usize,
    replay_memory_size: usize,
    learning_rate: f32,
    discount_factor: f32,
    exploration: f32,
    seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            minibatch_size: 32,
            replay_memory_size: 1000,
            learning_rate: 0.001,
            discount_factor: 0.9,
            exploration: 0.1,
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::new()
    }

    /// Number of transitions drawn per replay step (before clamping to the buffer size).
    pub fn minibatch_size(&self) -> usize {
        self.minibatch_size
    }

    /// Capacity of the replay buffer.
    pub fn replay_memory_size(&self) -> usize {
        self.replay_memory_size
    }

    /// Step size handed to the approximator's optimizer. The agent itself never reads it.
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f32 {
        self.discount_factor
    }

    /// Default epsilon for [`DqnAgent::act`](crate::agent::DqnAgent::act).
    pub fn exploration(&self) -> f32 {
        self.exploration
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Check every field against its valid range.
    pub fn validate(&self) -> Result<()> {
        if self.minibatch_size == 0 {
            return Err(DqnError::invalid_parameter("minibatch_size", "must be at least 1"));
        }
        if self.replay_memory_size == 0 {
            return Err(DqnError::invalid_parameter("replay_memory_size", "must be at least 1"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(DqnError::invalid_parameter(
                "learning_rate",
                "must be a positive finite number",
            ));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(DqnError::invalid_parameter("discount_factor", "must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.exploration) {
            return Err(DqnError::invalid_parameter("exploration", "must be in [0, 1]"));
        }
        Ok(())
    }

    /// Loads a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let config: AgentConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        info!("Load agent config from {}", path.display());
        Ok(config)
    }

    /// Saves the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path)?;
        file.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
        info!("Save agent config into {}", path.display());
        Ok(())
    }
}

/// Builder for [`AgentConfig`]
pub struct AgentConfigBuilder {
    config: AgentConfig,
}

impl AgentConfigBuilder {
    pub fn new() -> Self {
        AgentConfigBuilder {
            config: AgentConfig::default(),
        }
    }

    pub fn minibatch_size(mut self, size: usize) -> Self {
        self.config.minibatch_size = size;
        self
    }

    pub fn replay_memory_size(mut self, capacity: usize) -> Self {
        self.config.replay_memory_size = capacity;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f32) -> Self {
        self.config.learning_rate = learning_rate;
        self
    }

    pub fn discount_factor(mut self, gamma: f32) -> Self {
        self.config.discount_factor = gamma;
        self
    }

    pub fn exploration(mut self, epsilon: f32) -> Self {
        self.config.exploration = epsilon;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<AgentConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for AgentConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
