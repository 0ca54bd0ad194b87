use std::fmt::Debug;

use log::debug;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::approximator::Approximator;
use crate::config::AgentConfig;
use crate::error::{DqnError, Result};
use crate::network::{Architecture, NeuralNetwork};
use crate::persistence::ModelStore;
use crate::replay_buffer::{ReplayBuffer, Transition};
use crate::session::Session;

/// Index of the largest value. Ties resolve to the lowest index and NaN never
/// wins. `None` for an empty or all-NaN input.
pub fn argmax(values: ArrayView1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, best_v)) if v <= best_v => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

fn index_of<A: PartialEq + Debug>(enabled_actions: &[A], action: &A) -> Result<usize> {
    enabled_actions
        .iter()
        .position(|a| a == action)
        .ok_or_else(|| DqnError::UnknownAction(format!("{:?}", action)))
}

fn check_q_shape(q_values: &Array2<f32>, rows: usize, n_actions: usize) -> Result<()> {
    if q_values.dim() != (rows, n_actions) {
        return Err(DqnError::dimension_mismatch(
            format!("Q-values {:?}", (rows, n_actions)),
            format!("Q-values {:?}", q_values.dim()),
        ));
    }
    Ok(())
}

/// Overwrites the taken action's slot of each row of `q_values` with its TD target.
///
/// Terminal rows get the bare reward; the others get
/// `reward + gamma * max(next_q_values[row])`. Every other slot keeps the
/// approximator's own prediction, so it contributes no error.
fn apply_td_targets(
    q_values: &mut Array2<f32>,
    next_q_values: ArrayView2<f32>,
    slots: &[(usize, f32, bool)],
    gamma: f32,
) {
    for (row, &(action_index, reward, terminal)) in slots.iter().enumerate() {
        q_values[[row, action_index]] = if terminal {
            reward
        } else {
            let max_next_q = next_q_values
                .row(row)
                .fold(f32::NEG_INFINITY, |max, &v| max.max(v));
            reward + gamma * max_next_q
        };
    }
}

/// Deep Q-Network agent with uniform experience replay.
///
/// There is no target network: bootstrapped values come from the same
/// approximator that is being trained.
pub struct DqnAgent<A, M> {
    config: AgentConfig,
    enabled_actions: Vec<A>,
    environment_name: String,
    model: M,
    buffer: ReplayBuffer<A>,
    rng: StdRng,
    current_loss: f32,
    session: Session,
}

impl<A, M> DqnAgent<A, M>
where
    A: Clone + PartialEq + Debug,
    M: Approximator,
{
    /// Creates an agent around an existing approximator.
    ///
    /// Fails if the config is invalid, the action set is empty or has
    /// duplicates, or the approximator's output width differs from the number
    /// of enabled actions.
    pub fn new(
        config: AgentConfig,
        enabled_actions: Vec<A>,
        environment_name: impl Into<String>,
        model: M,
        session: Session,
    ) -> Result<Self> {
        config.validate()?;

        if enabled_actions.is_empty() {
            return Err(DqnError::invalid_parameter("enabled_actions", "must not be empty"));
        }
        for (i, action) in enabled_actions.iter().enumerate() {
            if enabled_actions[..i].contains(action) {
                return Err(DqnError::invalid_parameter(
                    "enabled_actions".to_string(),
                    format!("duplicate action {:?}", action),
                ));
            }
        }
        if model.n_actions() != enabled_actions.len() {
            return Err(DqnError::dimension_mismatch(
                format!("{} Q-values (one per enabled action)", enabled_actions.len()),
                format!("{} Q-values", model.n_actions()),
            ));
        }

        let rng = match config.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let environment_name = environment_name.into();
        debug!(
            "Create DQN agent for {} with {} actions, replay capacity {}",
            environment_name,
            enabled_actions.len(),
            config.replay_memory_size()
        );

        Ok(DqnAgent {
            buffer: ReplayBuffer::new(config.replay_memory_size()),
            config,
            enabled_actions,
            environment_name,
            model,
            rng,
            current_loss: 0.0,
            session,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn enabled_actions(&self) -> &[A] {
        &self.enabled_actions
    }

    pub fn environment_name(&self) -> &str {
        &self.environment_name
    }

    /// Name of this agent's checkpoint, derived from the environment name.
    pub fn checkpoint_name(&self) -> String {
        format!("{}.ckpt", self.environment_name)
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn buffer(&self) -> &ReplayBuffer<A> {
        &self.buffer
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Loss recorded by the last [`experience_replay`](Self::experience_replay), 0.0 before any.
    pub fn current_loss(&self) -> f32 {
        self.current_loss
    }

    /// Position of `action` in the enabled-action list.
    pub fn action_index(&self, action: &A) -> Result<usize> {
        index_of(&self.enabled_actions, action)
    }

    /// Q(state, a) for every enabled action, in enabled-action order.
    pub fn q_values(&mut self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        let q_values = self.model.predict(state.insert_axis(Axis(0)))?;
        check_q_shape(&q_values, 1, self.enabled_actions.len())?;
        Ok(q_values.index_axis_move(Axis(0), 0))
    }

    /// Epsilon-greedy action selection.
    ///
    /// With probability `epsilon` a uniformly random enabled action, otherwise
    /// the action with the highest Q-value (lowest index on ties). The random
    /// branch never queries the approximator.
    pub fn select_action(&mut self, state: ArrayView1<f32>, epsilon: f32) -> Result<A> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(DqnError::invalid_parameter(
                "epsilon".to_string(),
                format!("must be in [0, 1], got {}", epsilon),
            ));
        }

        // The draw is in [0, 1): epsilon 0 never explores, epsilon 1 always does.
        if self.rng.gen::<f32>() < epsilon {
            let index = self.rng.gen_range(0..self.enabled_actions.len());
            Ok(self.enabled_actions[index].clone())
        } else {
            let q_values = self.q_values(state)?;
            let index = argmax(q_values.view())
                .ok_or_else(|| DqnError::NumericalError("no finite Q-values".to_string()))?;
            Ok(self.enabled_actions[index].clone())
        }
    }

    /// [`select_action`](Self::select_action) with the configured exploration rate.
    pub fn act(&mut self, state: ArrayView1<f32>) -> Result<A> {
        let epsilon = self.config.exploration();
        self.select_action(state, epsilon)
    }

    /// Appends a transition to replay memory, evicting the oldest when full.
    ///
    /// Rejects actions outside the enabled set so that replay never meets one.
    pub fn store_experience(
        &mut self,
        state: Array1<f32>,
        action: A,
        reward: f32,
        next_state: Array1<f32>,
        terminal: bool,
    ) -> Result<()> {
        self.action_index(&action)?;
        self.buffer.append(Transition {
            state,
            action,
            reward,
            next_state,
            terminal,
        });
        Ok(())
    }

    /// Regression target for one transition: the approximator's prediction for
    /// `state` with the taken action's slot replaced by its TD target.
    pub fn build_target(&mut self, transition: &Transition<A>) -> Result<Array1<f32>> {
        let slot = (
            self.action_index(&transition.action)?,
            transition.reward,
            transition.terminal,
        );
        let n_actions = self.enabled_actions.len();

        let mut q_values = self.model.predict(transition.state.view().insert_axis(Axis(0)))?;
        check_q_shape(&q_values, 1, n_actions)?;
        let next_q_values = if transition.terminal {
            Array2::zeros((1, n_actions))
        } else {
            let next = self.model.predict(transition.next_state.view().insert_axis(Axis(0)))?;
            check_q_shape(&next, 1, n_actions)?;
            next
        };

        apply_td_targets(&mut q_values, next_q_values.view(), &[slot], self.config.discount_factor());
        Ok(q_values.index_axis_move(Axis(0), 0))
    }

    /// One training step on a minibatch drawn uniformly, with replacement, from
    /// replay memory.
    ///
    /// The batch size is `min(minibatch_size, buffer length)`. The whole batch
    /// goes to a single `fit` call, then the loss on the same batch is
    /// evaluated against the updated approximator, recorded and returned.
    pub fn experience_replay(&mut self) -> Result<f32> {
        let batch_size = self.config.minibatch_size().min(self.buffer.len());
        let batch = self.buffer.sample(batch_size, &mut self.rng)?;

        let states: Vec<ArrayView1<f32>> = batch.iter().map(|t| t.state.view()).collect();
        let next_states: Vec<ArrayView1<f32>> = batch.iter().map(|t| t.next_state.view()).collect();
        let states = ndarray::stack(Axis(0), &states)?;
        let next_states = ndarray::stack(Axis(0), &next_states)?;
        let slots = batch
            .iter()
            .map(|t| -> Result<(usize, f32, bool)> {
                Ok((index_of(&self.enabled_actions, &t.action)?, t.reward, t.terminal))
            })
            .collect::<Result<Vec<_>>>()?;

        let n_actions = self.enabled_actions.len();
        let mut targets = self.model.predict(states.view())?;
        check_q_shape(&targets, batch_size, n_actions)?;
        let next_q_values = self.model.predict(next_states.view())?;
        check_q_shape(&next_q_values, batch_size, n_actions)?;

        apply_td_targets(&mut targets, next_q_values.view(), &slots, self.config.discount_factor());

        self.model.fit(states.view(), targets.view())?;
        let loss = self.model.evaluate(states.view(), targets.view())?;
        self.current_loss = loss;

        debug!("Experience replay on {} transitions, loss {}", batch_size, loss);
        Ok(loss)
    }

    /// Releases the session and hands back the approximator.
    pub fn end_session(self) -> M {
        let DqnAgent { model, session, environment_name, .. } = self;
        debug!("End session for {}", environment_name);
        drop(session);
        model
    }
}

impl<A> DqnAgent<A, NeuralNetwork>
where
    A: Clone + PartialEq + Debug,
{
    /// Agent backed by the default Q-network
    /// ([`Architecture::q_network`]) with RMSProp at the configured learning rate.
    pub fn with_default_network(
        config: AgentConfig,
        enabled_actions: Vec<A>,
        environment_name: impl Into<String>,
        session: Session,
    ) -> Result<Self> {
        let architecture = Architecture::q_network(enabled_actions.len(), config.learning_rate());
        let network = match config.seed() {
            Some(seed) => NeuralNetwork::with_seed(architecture, seed.wrapping_add(1))?,
            None => NeuralNetwork::new(architecture)?,
        };
        Self::new(config, enabled_actions, environment_name, network, session)
    }

    pub fn save_model(&self, store: &ModelStore) -> Result<()> {
        store.save(&self.model)
    }

    /// Replaces the approximator with the one saved in `store`. Replay memory is kept.
    pub fn load_model(&mut self, store: &ModelStore) -> Result<()> {
        let network = store.load()?;
        if network.n_actions() != self.enabled_actions.len() {
            return Err(DqnError::dimension_mismatch(
                format!("{} Q-values (one per enabled action)", self.enabled_actions.len()),
                format!("{} Q-values in saved model", network.n_actions()),
            ));
        }
        self.model = network;
        Ok(())
    }
}

/// Builder pattern for DqnAgent
pub struct DqnAgentBuilder<A, M> {
    config: AgentConfig,
    enabled_actions: Option<Vec<A>>,
    environment_name: String,
    model: Option<M>,
    session: Option<Session>,
}

impl<A, M> DqnAgentBuilder<A, M>
where
    A: Clone + PartialEq + Debug,
    M: Approximator,
{
    pub fn new() -> Self {
        DqnAgentBuilder {
            config: AgentConfig::default(),
            enabled_actions: None,
            environment_name: "dqn".to_string(),
            model: None,
            session: None,
        }
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn enabled_actions(mut self, actions: &[A]) -> Self {
        self.enabled_actions = Some(actions.to_vec());
        self
    }

    pub fn environment_name(mut self, name: impl Into<String>) -> Self {
        self.environment_name = name.into();
        self
    }

    pub fn model(mut self, model: M) -> Self {
        self.model = Some(model);
        self
    }

    /// Without one, `build` opens a session named after the environment.
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn build(self) -> Result<DqnAgent<A, M>> {
        let enabled_actions = self.enabled_actions.ok_or_else(|| {
            DqnError::invalid_parameter("enabled_actions", "Enabled actions must be specified")
        })?;
        let model = self
            .model
            .ok_or_else(|| DqnError::invalid_parameter("model", "Approximator must be specified"))?;
        let session = match self.session {
            Some(session) => session,
            None => Session::open(self.environment_name.clone()),
        };

        DqnAgent::new(self.config, enabled_actions, self.environment_name, model, session)
    }
}

impl<A, M> Default for DqnAgentBuilder<A, M>
where
    A: Clone + PartialEq + Debug,
    M: Approximator,
{
    fn default() -> Self {
        Self::new()
    }
}
