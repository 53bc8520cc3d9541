//! Environment.
use super::{Step, Transition};
use crate::{error::TabRlError, DiscreteSpace, State};

/// Represents a discrete environment, typically an MDP.
///
/// The capability set is `transition`, `reward` and `is_terminal`.
/// [`Env::step`] combines them and is what [`Trainer`](crate::Trainer) calls.
pub trait Env {
    /// Returns the state and action space of the environment.
    fn space(&self) -> &DiscreteSpace;

    /// Returns the start state.
    fn start_state(&self) -> &State;

    /// Computes the next state for action `a` taken in state `s`.
    ///
    /// The returned state is always in the lattice. An invalid `s` or `a` is a
    /// caller error and must be returned as `Err` before any internal state
    /// of the environment changes.
    fn transition(&mut self, s: &State, a: usize) -> Result<Transition, TabRlError>;

    /// Returns the reward of a transition returned by [`Env::transition`].
    fn reward(&self, tr: &Transition) -> f32;

    /// Returns `true` if `s` is terminal.
    fn is_terminal(&self, s: &State) -> bool;

    /// Performs an environment step.
    fn step(&mut self, s: &State, a: usize) -> Result<Step, TabRlError> {
        let tr = self.transition(s, a)?;
        let reward = self.reward(&tr);
        let is_terminal = self.is_terminal(&tr.state);
        Ok(Step::new(a, tr.state, reward, tr.outcome, is_terminal))
    }
}
