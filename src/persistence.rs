//! Model artifacts on disk.
//!
//! A saved model is two files in one directory: the architecture as JSON and
//! the dense-layer weights as a bincode blob. Saving overwrites both in place,
//! architecture first. There is no versioning or checksum, and a crash between
//! the two writes leaves them mutually inconsistent.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use ndarray::{Array1, Array2};

use crate::error::Result;
use crate::network::{Architecture, NeuralNetwork};

pub const DEFAULT_MODEL_DIR: &str = "models";
pub const ARCHITECTURE_FILENAME: &str = "dqn_model.json";
pub const WEIGHTS_FILENAME: &str = "dqn_model_weights.bin";

/// Directory holding the architecture and weights artifacts.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelStore {
    dir: PathBuf,
}

impl Default for ModelStore {
    fn default() -> Self {
        ModelStore::new(DEFAULT_MODEL_DIR)
    }
}

impl ModelStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        ModelStore {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn architecture_path(&self) -> PathBuf {
        self.dir.join(ARCHITECTURE_FILENAME)
    }

    pub fn weights_path(&self) -> PathBuf {
        self.dir.join(WEIGHTS_FILENAME)
    }

    pub fn save(&self, network: &NeuralNetwork) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let architecture = serde_json::to_string_pretty(network.architecture())?;
        fs::write(self.architecture_path(), architecture)?;

        let weights = bincode::serialize(&network.weights())?;
        fs::write(self.weights_path(), weights)?;

        info!("Save model into {}", self.dir.display());
        Ok(())
    }

    /// Rebuilds the network from its architecture, then installs the saved
    /// weights. The optimizer starts from a clean state.
    pub fn load(&self) -> Result<NeuralNetwork> {
        let architecture: Architecture = serde_json::from_slice(&fs::read(self.architecture_path())?)?;
        let mut network = NeuralNetwork::new(architecture)?;

        let weights: Vec<(Array2<f32>, Array1<f32>)> = bincode::deserialize(&fs::read(self.weights_path())?)?;
        network.set_weights(weights)?;

        info!("Load model from {}", self.dir.display());
        Ok(network)
    }
}
