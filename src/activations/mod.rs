//! # Activation Functions
//!
//! The default Q-network only needs two activations: ReLU on the hidden layer
//! and the identity on the output layer, so that Q-values stay unbounded.
//!
//! ```rust
//! use minidqn::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![[1.0, -0.5, 0.0, 2.0]];
//! Activation::Relu.apply_batch(&mut data);
//! assert_eq!(data, array![[1.0, 0.0, 0.0, 2.0]]);
//! ```

pub mod functions;

pub use functions::Activation;
