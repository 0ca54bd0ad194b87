//! # Function approximator seam
//!
//! The agent only needs three things from its Q-function: batched prediction,
//! one gradient step over a minibatch, and a loss readout. Anything that
//! implements [`Approximator`] can back a [`DqnAgent`](crate::agent::DqnAgent):
//! the bundled [`NeuralNetwork`](crate::network::NeuralNetwork), a linear model,
//! or a scripted table in tests.
//!
//! States are passed row-wise, one flattened observation per row. Each output
//! row holds one value per enabled action, in enabled-action order.

use ndarray::{Array2, ArrayView2};

use crate::error::Result;

pub trait Approximator {
    /// Width of every prediction row.
    fn n_actions(&self) -> usize;

    /// Q-values for a batch of states, shape `(batch, n_actions)`.
    fn predict(&mut self, states: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// One parameter update reducing squared error between predictions and `targets`.
    fn fit(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<()>;

    /// Loss of the current parameters on `(states, targets)`. Does not train.
    fn evaluate(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<f32>;
}
