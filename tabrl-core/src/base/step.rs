//! Environment step.
use crate::State;

/// How a transition ended.
///
/// A move that leaves the lattice or ends in a hazard sends the mover back to
/// the start state of the environment; the outcome records which of the two
/// happened. The two are mutually exclusive within one transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The move ended at a valid, non-hazardous state.
    Moved,

    /// The move left the lattice and was redirected to the start state.
    OutOfBounds,

    /// The move ended in a hazard and was redirected to the start state.
    Hazard,
}

/// Result of [`Env::transition`](crate::Env::transition).
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// The state after the transition, always inside the lattice.
    pub state: State,

    /// How the transition ended.
    pub outcome: Outcome,
}

impl Transition {
    /// Constructs a [`Transition`].
    pub fn new(state: State, outcome: Outcome) -> Self {
        Self { state, outcome }
    }
}

/// Represents an action, next state and reward tuple `(a_t, s_t+1, r_t+1)`.
///
/// An environment emits a [`Step`] at every interaction with an agent.
/// The reward is computed from the transition it belongs to, so it can never
/// reflect the outcome of a different call.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    /// Action.
    pub act: usize,

    /// Next state.
    pub state: State,

    /// Reward.
    pub reward: f32,

    /// How the transition ended.
    pub outcome: Outcome,

    /// Flag denoting if the next state is terminal.
    pub is_terminal: bool,
}

impl Step {
    /// Constructs a [`Step`] object.
    pub fn new(act: usize, state: State, reward: f32, outcome: Outcome, is_terminal: bool) -> Self {
        Step {
            act,
            state,
            reward,
            outcome,
            is_terminal,
        }
    }

    #[inline]
    /// Returns `true` if the move was redirected to the start state.
    pub fn is_redirected(&self) -> bool {
        self.outcome != Outcome::Moved
    }
}
