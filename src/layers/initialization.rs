use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Uniform;

/// Xavier/Glorot uniform `(fan_in, fan_out)` kernel: `U(-l, l)` with
/// `l = sqrt(6 / (fan_in + fan_out))`.
pub fn glorot_uniform<R: Rng + ?Sized>(shape: (usize, usize), rng: &mut R) -> Array2<f32> {
    let (fan_in, fan_out) = shape;
    let limit = (6.0 / (fan_in + fan_out).max(1) as f32).sqrt();
    Array2::random_using(shape, Uniform::new_inclusive(-limit, limit), rng)
}

pub fn zero_biases(size: usize) -> Array1<f32> {
    Array1::zeros(size)
}
