use ndarray::{Array2, ArrayView2};
use rand::Rng;

/// Dropout Layer
///
/// During training each unit is zeroed with probability `dropout_rate` and the
/// survivors are scaled by `1 / (1 - dropout_rate)`. At inference it is the identity.
#[derive(Clone, Debug)]
pub struct DropoutLayer {
    /// Dropout probability (probability of dropping a unit)
    pub dropout_rate: f32,

    /// Cached mask for backward pass
    cached_mask: Option<Array2<f32>>,
}

impl DropoutLayer {
    pub fn new(dropout_rate: f32) -> Self {
        DropoutLayer {
            dropout_rate,
            cached_mask: None,
        }
    }

    pub fn forward_batch<R: Rng + ?Sized>(&mut self, inputs: ArrayView2<f32>, training: bool, rng: &mut R) -> Array2<f32> {
        if !training || self.dropout_rate == 0.0 {
            self.cached_mask = None;
            return inputs.to_owned();
        }

        let scale = 1.0 / (1.0 - self.dropout_rate);
        let mask = Array2::from_shape_fn(inputs.dim(), |_| {
            if rng.gen::<f32>() >= self.dropout_rate { scale } else { 0.0 }
        });
        let outputs = &inputs * &mask;
        self.cached_mask = Some(mask);
        outputs
    }

    pub fn backward_batch(&self, output_errors: ArrayView2<f32>) -> Array2<f32> {
        match &self.cached_mask {
            Some(mask) => &output_errors * mask,
            None => output_errors.to_owned(),
        }
    }
}
