use ndarray::Array1;
use rand::Rng;
use std::collections::VecDeque;

use crate::error::{DqnError, Result};

/// One step of experience: `(state, action, reward, next_state, terminal)`.
///
/// `action` is the action's own value (label), not its index in the enabled set.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition<A> {
    pub state: Array1<f32>,
    pub action: A,
    pub reward: f32,
    pub next_state: Array1<f32>,
    pub terminal: bool,
}

/// Fixed-capacity FIFO store of transitions.
///
/// Appending past capacity evicts the oldest transition. Sampling is uniform
/// with replacement.
#[derive(Clone, Debug)]
pub struct ReplayBuffer<A> {
    buffer: VecDeque<Transition<A>>,
    capacity: usize,
}

impl<A> ReplayBuffer<A> {
    pub fn new(capacity: usize) -> Self {
        // Storage grows with appends; nothing is reserved up front.
        ReplayBuffer {
            buffer: VecDeque::new(),
            capacity,
        }
    }

    pub fn append(&mut self, transition: Transition<A>) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Draws `k` transitions, each index chosen independently, so duplicates
    /// are possible. Callers clamp `k` to `len()`; an empty buffer is an error.
    pub fn sample<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Result<Vec<&Transition<A>>> {
        if self.buffer.is_empty() {
            return Err(DqnError::EmptyBuffer("cannot sample from an empty replay buffer".to_string()));
        }
        let len = self.buffer.len();
        Ok((0..k).map(|_| &self.buffer[rng.gen_range(0..len)]).collect())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition<A>> {
        self.buffer.iter()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
