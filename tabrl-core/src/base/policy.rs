//! Policy.
use crate::{error::TabRlError, DiscreteSpace, State, ValueTable, Window};
use anyhow::Result;
use serde::de::DeserializeOwned;
use std::path::Path;

/// A learnable policy on a [`DiscreteSpace`].
///
/// A policy maps a state to an action through its action-value estimates and
/// improves the estimates from windows of a
/// [`TransitionBuffer`](crate::TransitionBuffer). Every update goes through
/// [`Policy::improve`], which blends the current value of the first
/// `(state, action)` pair of the window with [`Policy::estimate_target`].
pub trait Policy {
    /// Returns the space the policy is defined on.
    fn space(&self) -> &DiscreteSpace;

    /// Samples an action at `s`.
    ///
    /// With `explore == false` the action is greedy with respect to the current
    /// estimates, ties being broken uniformly at random.
    fn select_action(&mut self, s: &State, explore: bool) -> Result<usize, TabRlError>;

    /// Returns the probability that [`Policy::select_action`] with exploration
    /// enabled takes `a` at `s`.
    fn action_probability(&self, s: &State, a: usize) -> Result<f32, TabRlError>;

    /// Returns the estimates of all actions at `s` used for action selection.
    fn action_values(&self, s: &State) -> Result<Vec<f32>, TabRlError>;

    /// Computes the bootstrapped return of the first `(state, action)` pair of `window`.
    ///
    /// Fails if the window holds fewer than two states or actions, or one reward.
    fn estimate_target(&self, window: &Window<'_>) -> Result<f32, TabRlError>;

    /// Moves the value of the first `(state, action)` pair of `window` towards its target.
    ///
    /// Returns `Ok(false)` without touching the estimates if the policy is static.
    fn improve(&mut self, window: &Window<'_>) -> Result<bool, TabRlError>;

    /// Updates the pairs of a finished episode that [`Policy::improve`] never reached.
    ///
    /// `window` is the whole history of the episode, ending at a terminal state.
    /// The trailing pairs get the truncated return of the episode as their target.
    /// Returns the number of updated pairs.
    fn finish_episode(&mut self, window: &Window<'_>) -> Result<usize, TabRlError>;

    /// Returns the `(states, actions, rewards)` depth [`Policy::improve`] reads.
    fn required_depth(&self) -> (usize, usize, usize);

    /// Returns `true` if learning is disabled.
    fn is_static(&self) -> bool;

    /// Enables or disables learning.
    fn set_static(&mut self, is_static: bool);

    /// Returns the value tables of the policy.
    fn value_tables(&self) -> Vec<&ValueTable>;

    /// Returns the greedy action of every state, in the order of [`DiscreteSpace::states`].
    ///
    /// Ties resolve to the lowest action index, so the result is deterministic.
    fn greedy_policy(&self) -> Vec<usize> {
        self.space()
            .states()
            .map(|s| {
                let values = self.action_values(&s).unwrap_or_default();
                values
                    .iter()
                    .enumerate()
                    .fold((0, f32::NEG_INFINITY), |(best, max), (a, &v)| {
                        if v > max {
                            (a, v)
                        } else {
                            (best, max)
                        }
                    })
                    .0
            })
            .collect()
    }
}

/// A policy built from a configuration.
pub trait Configurable {
    /// Configuration.
    type Config: Clone + DeserializeOwned;

    /// Builds the object.
    fn build(space: DiscreteSpace, config: Self::Config) -> Result<Self, TabRlError>
    where
        Self: Sized;

    /// Build the object with the configuration in the yaml file of the given path.
    fn build_from_path(space: DiscreteSpace, path: impl AsRef<Path>) -> Result<Self>
    where
        Self: Sized,
    {
        let file = std::fs::File::open(path)?;
        let rdr = std::io::BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(Self::build(space, config)?)
    }
}
