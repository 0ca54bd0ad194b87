//! Parameter update rules.
//!
//! Stateful optimizers keep one slot per dense layer, addressed by the layer's
//! position among the network's dense layers.

use ndarray::{Array1, Array2};
use serde::{Serialize, Deserialize};

pub trait Optimizer {
    fn update_weights(&mut self, slot: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>);
    fn update_biases(&mut self, slot: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>);
}

/// Serializable description of an optimizer, stored with the architecture.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum OptimizerSpec {
    Sgd { learning_rate: f32 },
    RmsProp { learning_rate: f32, rho: f32, epsilon: f32 },
}

impl OptimizerSpec {
    /// RMSProp with `rho = 0.9`, `epsilon = 1e-7`.
    pub fn rmsprop(learning_rate: f32) -> Self {
        OptimizerSpec::RmsProp { learning_rate, rho: 0.9, epsilon: 1e-7 }
    }

    pub fn learning_rate(&self) -> f32 {
        match self {
            OptimizerSpec::Sgd { learning_rate } => *learning_rate,
            OptimizerSpec::RmsProp { learning_rate, .. } => *learning_rate,
        }
    }

    /// Fresh optimizer with empty state.
    pub fn build(&self) -> OptimizerWrapper {
        match *self {
            OptimizerSpec::Sgd { learning_rate } => OptimizerWrapper::Sgd(Sgd::new(learning_rate)),
            OptimizerSpec::RmsProp { learning_rate, rho, epsilon } => {
                OptimizerWrapper::RmsProp(RmsProp::new(learning_rate, rho, epsilon))
            }
        }
    }
}

#[derive(Clone, Debug)]
pub enum OptimizerWrapper {
    Sgd(Sgd),
    RmsProp(RmsProp),
}

impl Optimizer for OptimizerWrapper {
    fn update_weights(&mut self, slot: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>) {
        match self {
            OptimizerWrapper::Sgd(optimizer) => optimizer.update_weights(slot, weights, gradients),
            OptimizerWrapper::RmsProp(optimizer) => optimizer.update_weights(slot, weights, gradients),
        }
    }

    fn update_biases(&mut self, slot: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>) {
        match self {
            OptimizerWrapper::Sgd(optimizer) => optimizer.update_biases(slot, biases, gradients),
            OptimizerWrapper::RmsProp(optimizer) => optimizer.update_biases(slot, biases, gradients),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Sgd {
    pub learning_rate: f32,
}

impl Sgd {
    pub fn new(learning_rate: f32) -> Sgd {
        Sgd { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn update_weights(&mut self, _slot: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>) {
        let learning_rate = self.learning_rate;
        weights.zip_mut_with(gradients, |w, &g| *w -= learning_rate * g);
    }

    fn update_biases(&mut self, _slot: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>) {
        let learning_rate = self.learning_rate;
        biases.zip_mut_with(gradients, |b, &g| *b -= learning_rate * g);
    }
}

/// RMSProp optimizer
///
/// `v <- rho * v + (1 - rho) * g^2`, `param <- param - lr * g / (sqrt(v) + epsilon)`.
#[derive(Clone, Debug)]
pub struct RmsProp {
    pub learning_rate: f32,
    pub rho: f32,
    pub epsilon: f32,
    v_weights: Vec<Option<Array2<f32>>>,
    v_biases: Vec<Option<Array1<f32>>>,
}

impl RmsProp {
    pub fn new(learning_rate: f32, rho: f32, epsilon: f32) -> Self {
        RmsProp {
            learning_rate,
            rho,
            epsilon,
            v_weights: Vec::new(),
            v_biases: Vec::new(),
        }
    }
}

// Slots are created lazily, zero-filled, the first time a layer is updated.
fn slot_mut<T: Clone>(slots: &mut Vec<Option<T>>, slot: usize, zeros: impl FnOnce() -> T) -> &mut T {
    if slots.len() <= slot {
        slots.resize(slot + 1, None);
    }
    slots[slot].get_or_insert_with(zeros)
}

impl Optimizer for RmsProp {
    fn update_weights(&mut self, slot: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>) {
        let (rho, epsilon, learning_rate) = (self.rho, self.epsilon, self.learning_rate);
        let dim = weights.dim();
        let v = slot_mut(&mut self.v_weights, slot, || Array2::zeros(dim));

        v.zip_mut_with(gradients, |v, &g| *v = rho * *v + (1.0 - rho) * g * g);
        ndarray::Zip::from(weights)
            .and(gradients)
            .and(&*v)
            .for_each(|w, &g, &v| *w -= learning_rate * g / (v.sqrt() + epsilon));
    }

    fn update_biases(&mut self, slot: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>) {
        let (rho, epsilon, learning_rate) = (self.rho, self.epsilon, self.learning_rate);
        let dim = biases.dim();
        let v = slot_mut(&mut self.v_biases, slot, || Array1::zeros(dim));

        v.zip_mut_with(gradients, |v, &g| *v = rho * *v + (1.0 - rho) * g * g);
        ndarray::Zip::from(biases)
            .and(gradients)
            .and(&*v)
            .for_each(|b, &g, &v| *b -= learning_rate * g / (v.sqrt() + epsilon));
    }
}
