// Test modules for all components
pub mod test_agent;

use ndarray::{Array1, Array2, ArrayView2};

use crate::approximator::Approximator;
use crate::error::Result;

/// Approximator with scripted outputs: a state listed in `table` predicts its
/// row, any other state predicts zeros. `fit` only records what it was given.
pub struct ScriptedModel {
    pub n_actions: usize,
    pub table: Vec<(Array1<f32>, Array1<f32>)>,
    pub predict_calls: usize,
    pub fits: Vec<(Array2<f32>, Array2<f32>)>,
    pub evaluate_result: f32,
}

impl ScriptedModel {
    pub fn new(n_actions: usize) -> Self {
        ScriptedModel {
            n_actions,
            table: Vec::new(),
            predict_calls: 0,
            fits: Vec::new(),
            evaluate_result: 0.5,
        }
    }

    pub fn with_q(mut self, state: Array1<f32>, q_values: Array1<f32>) -> Self {
        self.table.push((state, q_values));
        self
    }

    pub fn lookup(&self, state: ndarray::ArrayView1<f32>) -> Array1<f32> {
        self.table
            .iter()
            .find(|(s, _)| s.view() == state)
            .map(|(_, q)| q.clone())
            .unwrap_or_else(|| Array1::zeros(self.n_actions))
    }
}

impl Approximator for ScriptedModel {
    fn n_actions(&self) -> usize {
        self.n_actions
    }

    fn predict(&mut self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.predict_calls += 1;
        let mut out = Array2::zeros((states.nrows(), self.n_actions));
        for (i, state) in states.rows().into_iter().enumerate() {
            out.row_mut(i).assign(&self.lookup(state));
        }
        Ok(out)
    }

    fn fit(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<()> {
        self.fits.push((states.to_owned(), targets.to_owned()));
        Ok(())
    }

    fn evaluate(&mut self, _states: ArrayView2<f32>, _targets: ArrayView2<f32>) -> Result<f32> {
        Ok(self.evaluate_result)
    }
}
