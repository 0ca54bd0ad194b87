//! # DQN agent
//!
//! [`DqnAgent`] owns a Q-function approximator, a replay buffer and the
//! compute session, and exposes the three operations an outer training loop
//! drives:
//!
//! - [`select_action`](DqnAgent::select_action): epsilon-greedy over the approximator's Q-values
//! - [`store_experience`](DqnAgent::store_experience): append a transition to replay memory
//! - [`experience_replay`](DqnAgent::experience_replay): one minibatch regression step on TD targets
//!
//! Actions are arbitrary labels (`i32`, an enum, ...). Q-value slots are indexed
//! by the action's position in the enabled-action list given at construction.
//!
//! ```rust,no_run
//! use minidqn::agent::DqnAgent;
//! use minidqn::config::AgentConfig;
//! use minidqn::session::Session;
//! use ndarray::Array1;
//!
//! let config = AgentConfig::default();
//! let mut agent = DqnAgent::with_default_network(
//!     config,
//!     vec![-1, 0, 1],
//!     "catch",
//!     Session::open("catch"),
//! ).unwrap();
//!
//! let state = Array1::zeros(64);
//! let action = agent.act(state.view()).unwrap();
//! agent.store_experience(state.clone(), action, 0.0, state, false).unwrap();
//! let loss = agent.experience_replay().unwrap();
//! ```

mod dqn;

pub use dqn::{argmax, DqnAgent, DqnAgentBuilder};
