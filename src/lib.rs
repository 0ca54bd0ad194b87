//! # minidqn - a small Deep Q-Network agent
//!
//! minidqn learns a state-to-action value function from online interaction.
//! Its core is the experience-replay training loop: a fixed-capacity circular
//! buffer of past transitions, uniform sampling with replacement, and a TD
//! target that blends observed reward with the approximator's own estimate of
//! the best next-state value.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use minidqn::agent::DqnAgent;
//! use minidqn::config::AgentConfig;
//! use minidqn::persistence::ModelStore;
//! use minidqn::session::Session;
//! use ndarray::Array1;
//!
//! let config = AgentConfig::builder()
//!     .minibatch_size(32)
//!     .replay_memory_size(1000)
//!     .discount_factor(0.9)
//!     .build()
//!     .unwrap();
//!
//! let mut agent = DqnAgent::with_default_network(
//!     config,
//!     vec![-1, 0, 1],
//!     "catch",
//!     Session::open("catch"),
//! ).unwrap();
//!
//! let state = Array1::<f32>::zeros(64);
//! let action = agent.select_action(state.view(), 0.1).unwrap();
//! agent.store_experience(state.clone(), action, 1.0, state, true).unwrap();
//! agent.experience_replay().unwrap();
//!
//! agent.save_model(&ModelStore::default()).unwrap();
//! ```
//!
//! ## Module Organization
//!
//! - [`agent`] - epsilon-greedy action selection, experience storage and replay training
//! - [`replay_buffer`] - bounded FIFO transition store
//! - [`approximator`] - the `predict`/`fit`/`evaluate` seam any Q-function implements
//! - [`network`] - the default feed-forward Q-network
//! - [`layers`], [`activations`], [`loss`], [`optimizer`] - building blocks of the network
//! - [`persistence`] - saving and loading model artifacts
//! - [`session`] - scoped compute session owned by the agent
//! - [`config`] - immutable agent hyperparameters
//! - [`error`] - error type and result alias

pub mod activations;
pub mod agent;
pub mod approximator;
pub mod config;
pub mod error;
pub mod layers;
pub mod loss;
pub mod network;
pub mod optimizer;
pub mod persistence;
pub mod replay_buffer;
pub mod session;

#[cfg(test)]
mod tests;
