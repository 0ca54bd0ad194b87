use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;

use crate::activations::Activation;
use crate::error::{DqnError, Result};
use super::initialization::{glorot_uniform, zero_biases};

/// A fully connected (dense) layer: `activation(inputs · weights + biases)`.
#[derive(Clone, Debug)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
    pre_activation_output: Option<Array2<f32>>,
    inputs: Option<Array2<f32>>,
}

impl DenseLayer {
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        DenseLayer {
            weights: glorot_uniform((input_size, output_size), rng),
            biases: zero_biases(output_size),
            activation,
            pre_activation_output: None,
            inputs: None,
        }
    }

    /// Replace kernel and bias, checking shapes against the current ones.
    pub fn set_parameters(&mut self, weights: Array2<f32>, biases: Array1<f32>) -> Result<()> {
        if weights.dim() != self.weights.dim() {
            return Err(DqnError::dimension_mismatch(
                format!("kernel {:?}", self.weights.dim()),
                format!("kernel {:?}", weights.dim()),
            ));
        }
        if biases.len() != self.biases.len() {
            return Err(DqnError::dimension_mismatch(
                format!("bias ({},)", self.biases.len()),
                format!("bias ({},)", biases.len()),
            ));
        }
        self.weights = weights;
        self.biases = biases;
        Ok(())
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    /// Forward pass over a batch. Caches what `backward_batch` needs.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        self.inputs = Some(inputs.to_owned());
        let mut outputs = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        self.pre_activation_output = Some(outputs.clone());
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Returns `(input_error, weight_gradients, bias_gradients)`.
    pub fn backward_batch(&self, output_errors: ArrayView2<f32>) -> Result<(Array2<f32>, Array2<f32>, Array1<f32>)> {
        let (pre_activation_output, inputs) = match (&self.pre_activation_output, &self.inputs) {
            (Some(pre), Some(inputs)) => (pre, inputs),
            _ => {
                return Err(DqnError::NumericalError(
                    "forward_batch() must be called before backward_batch()".to_string(),
                ))
            }
        };

        let activation_deriv = self.activation.derivative_batch(pre_activation_output.view());
        let adjusted_error = &output_errors * &activation_deriv;
        let weight_gradients = inputs.t().dot(&adjusted_error);
        let bias_gradients = adjusted_error.sum_axis(Axis(0));
        let input_error = adjusted_error.dot(&self.weights.t());

        Ok((input_error, weight_gradients, bias_gradients))
    }
}
