pub mod dense;
pub mod dropout;
pub mod initialization;

pub use dense::DenseLayer;
pub use dropout::DropoutLayer;

use ndarray::{Array1, Array2, ArrayView2};
use rand::Rng;

use crate::error::Result;

/// A layer of the sequential Q-network.
#[derive(Clone, Debug)]
pub enum Layer {
    Dense(DenseLayer),
    Dropout(DropoutLayer),
}

/// Parameter gradients of a dense layer, `None` for parameter-free layers.
pub type Gradients = Option<(Array2<f32>, Array1<f32>)>;

impl Layer {
    pub fn forward_batch<R: Rng + ?Sized>(&mut self, inputs: ArrayView2<f32>, training: bool, rng: &mut R) -> Array2<f32> {
        match self {
            Layer::Dense(layer) => layer.forward_batch(inputs),
            Layer::Dropout(layer) => layer.forward_batch(inputs, training, rng),
        }
    }

    /// Returns the error with respect to this layer's input plus its own gradients.
    pub fn backward_batch(&self, output_errors: ArrayView2<f32>) -> Result<(Array2<f32>, Gradients)> {
        match self {
            Layer::Dense(layer) => {
                let (input_error, weight_gradients, bias_gradients) = layer.backward_batch(output_errors)?;
                Ok((input_error, Some((weight_gradients, bias_gradients))))
            }
            Layer::Dropout(layer) => Ok((layer.backward_batch(output_errors), None)),
        }
    }

    pub fn as_dense(&self) -> Option<&DenseLayer> {
        match self {
            Layer::Dense(layer) => Some(layer),
            Layer::Dropout(_) => None,
        }
    }

    pub fn as_dense_mut(&mut self) -> Option<&mut DenseLayer> {
        match self {
            Layer::Dense(layer) => Some(layer),
            Layer::Dropout(_) => None,
        }
    }
}
