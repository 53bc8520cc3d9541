//! Exploration strategy of tabular policies.
use crate::table::tied_max;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Epsilon-greedy explorer.
///
/// With probability `epsilon` an action is drawn uniformly from all actions,
/// otherwise uniformly from the actions tied for the maximum value.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Probability of taking a uniformly random action.
    pub epsilon: f32,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self { epsilon: 0.1 }
    }
}

impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    pub fn new(epsilon: f32) -> Self {
        Self { epsilon }
    }

    /// Takes an action given the values of all actions.
    ///
    /// With `explore == false` the action is greedy; ties are still broken at random.
    /// `values` must not be empty.
    pub fn action<R: Rng + ?Sized>(&self, values: &[f32], explore: bool, rng: &mut R) -> usize {
        if explore && rng.gen::<f32>() < self.epsilon {
            rng.gen_range(0..values.len())
        } else {
            let best = tied_max(values);
            best[rng.gen_range(0..best.len())]
        }
    }

    /// Returns the probability that [`EpsilonGreedy::action`] with `explore == true`
    /// takes action `a`.
    pub fn probability(&self, values: &[f32], a: usize) -> f32 {
        if a >= values.len() {
            return 0.;
        }
        let best = tied_max(values);
        let p = self.epsilon / values.len() as f32;
        if best.contains(&a) {
            p + (1. - self.epsilon) / best.len() as f32
        } else {
            p
        }
    }

    /// Returns the expectation of `values` under the action distribution.
    pub fn expectation(&self, values: &[f32]) -> f32 {
        (0..values.len())
            .map(|a| self.probability(values, a) * values[a])
            .sum()
    }
}
