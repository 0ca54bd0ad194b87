use ndarray::{Array1, Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::approximator::Approximator;
use crate::error::{DqnError, Result};
use crate::layers::{DenseLayer, DropoutLayer, Layer};
use crate::loss::{Loss, Mse};
use crate::optimizer::{Optimizer, OptimizerSpec, OptimizerWrapper};

/// One entry of a sequential architecture.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum LayerSpec {
    Dense { units: usize, activation: Activation },
    Dropout { rate: f32 },
}

/// Description of a sequential network, without its weights.
///
/// Observations of `input_shape` are flattened row-major before the first layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Architecture {
    pub input_shape: Vec<usize>,
    pub layers: Vec<LayerSpec>,
    pub optimizer: OptimizerSpec,
}

impl Architecture {
    /// The default Q-network for an 8x8 board:
    /// flatten -> Dense(64, relu) -> Dropout(0.2) -> Dense(n_actions, linear), trained with RMSProp.
    pub fn q_network(n_actions: usize, learning_rate: f32) -> Self {
        Architecture {
            input_shape: vec![8, 8],
            layers: vec![
                LayerSpec::Dense { units: 64, activation: Activation::Relu },
                LayerSpec::Dropout { rate: 0.2 },
                LayerSpec::Dense { units: n_actions, activation: Activation::Linear },
            ],
            optimizer: OptimizerSpec::rmsprop(learning_rate),
        }
    }

    pub fn with_input_shape(mut self, input_shape: &[usize]) -> Self {
        self.input_shape = input_shape.to_vec();
        self
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerSpec) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Width of a flattened observation.
    pub fn input_size(&self) -> usize {
        self.input_shape.iter().product()
    }

    /// Units of the last dense layer.
    pub fn n_actions(&self) -> usize {
        self.layers
            .iter()
            .rev()
            .find_map(|spec| match spec {
                LayerSpec::Dense { units, .. } => Some(*units),
                LayerSpec::Dropout { .. } => None,
            })
            .unwrap_or(0)
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_shape.is_empty() || self.input_size() == 0 {
            return Err(DqnError::invalid_parameter(
                "input_shape".to_string(),
                format!("must be non-empty with no zero extent, got {:?}", self.input_shape),
            ));
        }
        match self.layers.last() {
            Some(LayerSpec::Dense { .. }) => {}
            _ => {
                return Err(DqnError::invalid_parameter("layers", "last layer must be dense"));
            }
        }
        for spec in &self.layers {
            match *spec {
                LayerSpec::Dense { units, .. } if units == 0 => {
                    return Err(DqnError::invalid_parameter("units", "dense layers need at least one unit"));
                }
                LayerSpec::Dropout { rate } if !(0.0..1.0).contains(&rate) => {
                    return Err(DqnError::invalid_parameter(
                        "rate".to_string(),
                        format!("dropout rate must be in [0, 1), got {}", rate),
                    ));
                }
                _ => {}
            }
        }
        let learning_rate = self.optimizer.learning_rate();
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(DqnError::invalid_parameter(
                "learning_rate",
                "must be a positive finite number",
            ));
        }
        Ok(())
    }
}

/// Sequential feed-forward network trained on mean squared error.
///
/// Dropout is only active inside [`fit`](Approximator::fit).
pub struct NeuralNetwork {
    architecture: Architecture,
    pub layers: Vec<Layer>,
    optimizer: OptimizerWrapper,
    loss: Mse,
    rng: StdRng,
}

impl NeuralNetwork {
    /// Builds an untrained network with Glorot-uniform kernels and zero biases.
    pub fn new(architecture: Architecture) -> Result<Self> {
        Self::from_rng(architecture, StdRng::from_entropy())
    }

    /// Same as [`new`](Self::new) but with reproducible initialization and dropout masks.
    pub fn with_seed(architecture: Architecture, seed: u64) -> Result<Self> {
        Self::from_rng(architecture, StdRng::seed_from_u64(seed))
    }

    fn from_rng(architecture: Architecture, mut rng: StdRng) -> Result<Self> {
        architecture.validate()?;

        let mut width = architecture.input_size();
        let mut layers = Vec::with_capacity(architecture.layers.len());
        for spec in &architecture.layers {
            match *spec {
                LayerSpec::Dense { units, activation } => {
                    layers.push(Layer::Dense(DenseLayer::new(width, units, activation, &mut rng)));
                    width = units;
                }
                LayerSpec::Dropout { rate } => layers.push(Layer::Dropout(DropoutLayer::new(rate))),
            }
        }

        Ok(NeuralNetwork {
            optimizer: architecture.optimizer.build(),
            architecture,
            layers,
            loss: Mse,
            rng,
        })
    }

    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    /// `(kernel, bias)` of every dense layer, input side first.
    pub fn weights(&self) -> Vec<(Array2<f32>, Array1<f32>)> {
        self.layers
            .iter()
            .filter_map(Layer::as_dense)
            .map(|layer| (layer.weights.clone(), layer.biases.clone()))
            .collect()
    }

    /// Installs weights produced by [`weights`](Self::weights). Nothing changes on error.
    pub fn set_weights(&mut self, weights: Vec<(Array2<f32>, Array1<f32>)>) -> Result<()> {
        let dense: Vec<&DenseLayer> = self.layers.iter().filter_map(Layer::as_dense).collect();
        if dense.len() != weights.len() {
            return Err(DqnError::dimension_mismatch(
                format!("{} dense layers", dense.len()),
                format!("{} weight pairs", weights.len()),
            ));
        }
        for (layer, (kernel, bias)) in dense.iter().zip(&weights) {
            if layer.weights.dim() != kernel.dim() || layer.biases.len() != bias.len() {
                return Err(DqnError::dimension_mismatch(
                    format!("kernel {:?}, bias ({},)", layer.weights.dim(), layer.biases.len()),
                    format!("kernel {:?}, bias ({},)", kernel.dim(), bias.len()),
                ));
            }
        }

        for (layer, (kernel, bias)) in self.layers.iter_mut().filter_map(Layer::as_dense_mut).zip(weights) {
            layer.set_parameters(kernel, bias)?;
        }
        Ok(())
    }

    fn forward_batch(&mut self, inputs: ArrayView2<f32>, training: bool) -> Array2<f32> {
        let mut current_output = inputs.to_owned();
        for layer in &mut self.layers {
            current_output = layer.forward_batch(current_output.view(), training, &mut self.rng);
        }
        current_output
    }

    fn check_states(&self, states: ArrayView2<f32>) -> Result<()> {
        let input_size = self.architecture.input_size();
        if states.ncols() != input_size {
            return Err(DqnError::dimension_mismatch(
                format!("states of width {} (shape {:?})", input_size, self.architecture.input_shape),
                format!("states of width {}", states.ncols()),
            ));
        }
        Ok(())
    }

    fn check_targets(&self, states: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<()> {
        self.check_states(states)?;
        let expected = (states.nrows(), self.n_actions());
        if targets.dim() != expected {
            return Err(DqnError::dimension_mismatch(
                format!("targets {:?}", expected),
                format!("targets {:?}", targets.dim()),
            ));
        }
        Ok(())
    }
}

impl Approximator for NeuralNetwork {
    fn n_actions(&self) -> usize {
        self.architecture.n_actions()
    }

    fn predict(&mut self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_states(states)?;
        Ok(self.forward_batch(states, false))
    }

    fn fit(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<()> {
        self.check_targets(states, targets)?;

        let outputs = self.forward_batch(states, true);
        let loss = self.loss.compute_batch(outputs.view(), targets);
        if !loss.is_finite() {
            return Err(DqnError::NumericalError(format!("training loss is {}", loss)));
        }

        let mut current_error = self.loss.gradient_batch(outputs.view(), targets);
        let mut gradients = Vec::new();
        for layer in self.layers.iter().rev() {
            let (input_error, layer_gradients) = layer.backward_batch(current_error.view())?;
            if let Some(pair) = layer_gradients {
                gradients.push(pair);
            }
            current_error = input_error;
        }
        gradients.reverse();

        let dense_layers = self.layers.iter_mut().filter_map(Layer::as_dense_mut);
        for (slot, (layer, (weight_gradients, bias_gradients))) in dense_layers.zip(gradients).enumerate() {
            self.optimizer.update_weights(slot, &mut layer.weights, &weight_gradients);
            self.optimizer.update_biases(slot, &mut layer.biases, &bias_gradients);
        }
        Ok(())
    }

    fn evaluate(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<f32> {
        self.check_targets(states, targets)?;
        let outputs = self.forward_batch(states, false);
        Ok(self.loss.compute_batch(outputs.view(), targets))
    }
}
