//! Dense table of action-value estimates.
use crate::{error::TabRlError, DiscreteSpace, State};
use log::warn;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Action-value estimates indexed by `(state, action)`.
///
/// The logical shape is `dims + [num_actions]`; values are stored row-major in a
/// flat vector, the action being the fastest-varying index. The table is never
/// resized after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueTable {
    space: DiscreteSpace,
    values: Vec<f32>,
}

impl ValueTable {
    /// Constructs a table with every entry set to `init`.
    pub fn new(space: DiscreteSpace, init: f32) -> Self {
        let len = space.num_states() * space.num_actions();
        Self {
            space,
            values: vec![init; len],
        }
    }

    /// Constructs a table with entries drawn from `Normal(mean, sqrt(variance))`.
    ///
    /// Small random values break ties between actions early in training.
    pub fn random<R: Rng + ?Sized>(
        space: DiscreteSpace,
        mean: f32,
        variance: f32,
        rng: &mut R,
    ) -> Result<Self, TabRlError> {
        if !(variance >= 0.) {
            return Err(TabRlError::InvalidConfig(format!(
                "init_variance must be non-negative, got {}",
                variance
            )));
        }
        let normal = Normal::new(mean, variance.sqrt())
            .map_err(|e| TabRlError::InvalidConfig(e.to_string()))?;
        let len = space.num_states() * space.num_actions();
        let values = (0..len).map(|_| normal.sample(rng)).collect();

        Ok(Self { space, values })
    }

    /// Returns the state and action space of the table.
    pub fn space(&self) -> &DiscreteSpace {
        &self.space
    }

    /// Returns `dims + [num_actions]`.
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = self.space.dims().to_vec();
        shape.push(self.space.num_actions());
        shape
    }

    /// Returns all values in row-major order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    fn index(&self, s: &State, a: usize) -> Option<usize> {
        if a >= self.space.num_actions() {
            return None;
        }
        self.space
            .state_index(s)
            .map(|ix| ix * self.space.num_actions() + a)
    }

    /// Returns the value of `(s, a)`.
    pub fn read_value(&self, s: &State, a: usize) -> Result<f32, TabRlError> {
        self.index(s, a)
            .map(|ix| self.values[ix])
            .ok_or_else(|| TabRlError::InvalidStateAction {
                state: s.to_vec(),
                action: a,
            })
    }

    /// Overwrites the value of `(s, a)`.
    ///
    /// Returns `false`, leaving the table untouched, if `(s, a)` is not a valid pair.
    pub fn update_value(&mut self, s: &State, a: usize, value: f32) -> bool {
        match self.index(s, a) {
            Some(ix) => {
                self.values[ix] = value;
                true
            }
            None => {
                warn!("Invalid (S, A) pair, got S: {} and A: {}", s, a);
                false
            }
        }
    }

    /// Returns the values of all actions at `s`.
    pub fn action_values(&self, s: &State) -> Result<&[f32], TabRlError> {
        let n = self.space.num_actions();
        let ix = self
            .space
            .state_index(s)
            .ok_or_else(|| TabRlError::InvalidState(s.to_vec()))?;
        Ok(&self.values[ix * n..(ix + 1) * n])
    }

    /// Returns the maximum value over actions at `s`.
    pub fn max_value(&self, s: &State) -> Result<f32, TabRlError> {
        Ok(self
            .action_values(s)?
            .iter()
            .cloned()
            .fold(f32::NEG_INFINITY, f32::max))
    }

    /// Returns every action tied for the maximum value at `s`.
    pub fn greedy_actions(&self, s: &State) -> Result<Vec<usize>, TabRlError> {
        Ok(tied_max(self.action_values(s)?))
    }
}

/// Returns the indices of all entries equal to the maximum of `values`.
pub fn tied_max(values: &[f32]) -> Vec<usize> {
    let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v == max)
        .map(|(i, _)| i)
        .collect()
}
