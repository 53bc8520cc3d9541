//! Bounded trailing log of `(state, action, reward)` triplets.
//!
//! Each agent in a [`Trainer`](crate::Trainer) owns one [`TransitionBuffer`].
//! An entry `(s_t, a_t, r_t+1)` is pushed after every step of the agent, and
//! the trailing [`Window`] of the buffer is handed to the policy for an n-step
//! update once the buffer is deep enough.
use crate::{error::TabRlError, State};
use log::warn;

/// Default maximum number of entries retained by a [`TransitionBuffer`].
pub const MAX_BUFFER_SIZE: usize = (1 << 15) - 1;

/// A bounded, append-only log of transitions.
///
/// States, actions and rewards are stored in three parallel sequences. A push
/// appends to all three, so they keep the same length unless the buffer was
/// built from explicit parts with [`TransitionBuffer::from_parts`].
/// Once the buffer holds `capacity` entries, further pushes are rejected; old
/// entries are never evicted.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionBuffer {
    states: Vec<State>,
    actions: Vec<usize>,
    rewards: Vec<f32>,
    capacity: usize,
}

impl Default for TransitionBuffer {
    fn default() -> Self {
        Self::with_capacity(MAX_BUFFER_SIZE)
    }
}

impl TransitionBuffer {
    /// Constructs an empty buffer retaining at most [`MAX_BUFFER_SIZE`] entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs an empty buffer retaining at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            states: Vec::new(),
            actions: Vec::new(),
            rewards: Vec::new(),
            capacity,
        }
    }

    /// Constructs a buffer from existing sequences, which may differ in length.
    pub fn from_parts(states: Vec<State>, actions: Vec<usize>, rewards: Vec<f32>) -> Self {
        let capacity = MAX_BUFFER_SIZE
            .max(states.len())
            .max(actions.len())
            .max(rewards.len());
        Self {
            states,
            actions,
            rewards,
            capacity,
        }
    }

    /// Appends a triplet.
    ///
    /// Returns `false`, leaving the buffer untouched, if it is already full.
    pub fn push(&mut self, s: State, a: usize, r: f32) -> bool {
        if self.is_full() {
            warn!(
                "Transition buffer is full ({} entries), rejected push of ({}, {}, {})",
                self.capacity, s, a, r
            );
            return false;
        }

        self.states.push(s);
        self.actions.push(a);
        self.rewards.push(r);
        true
    }

    /// Returns `true` if the buffer holds at least the given number of entries
    /// in each sequence.
    pub fn has_depth(&self, n_states: usize, n_actions: usize, n_rewards: usize) -> bool {
        self.states.len() >= n_states
            && self.actions.len() >= n_actions
            && self.rewards.len() >= n_rewards
    }

    /// Returns the trailing `n_states` states, `n_actions` actions and `n_rewards` rewards.
    ///
    /// Fails if any of the sequences is shorter than requested; call
    /// [`TransitionBuffer::has_depth`] first.
    pub fn latest(
        &self,
        n_states: usize,
        n_actions: usize,
        n_rewards: usize,
    ) -> Result<Window<'_>, TabRlError> {
        if !self.has_depth(n_states, n_actions, n_rewards) {
            return Err(TabRlError::InsufficientDepth {
                required: (n_states, n_actions, n_rewards),
                available: self.depth(),
            });
        }

        Ok(Window {
            states: &self.states[self.states.len() - n_states..],
            actions: &self.actions[self.actions.len() - n_actions..],
            rewards: &self.rewards[self.rewards.len() - n_rewards..],
        })
    }

    /// Returns a window over the whole buffer.
    pub fn window(&self) -> Window<'_> {
        Window {
            states: &self.states,
            actions: &self.actions,
            rewards: &self.rewards,
        }
    }

    /// Returns the lengths of the `(states, actions, rewards)` sequences.
    pub fn depth(&self) -> (usize, usize, usize) {
        (self.states.len(), self.actions.len(), self.rewards.len())
    }

    /// Returns the number of pushed entries.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.actions.is_empty() && self.rewards.is_empty()
    }

    /// Returns `true` if the next push would be rejected.
    pub fn is_full(&self) -> bool {
        self.states.len() >= self.capacity
            || self.actions.len() >= self.capacity
            || self.rewards.len() >= self.capacity
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.states.clear();
        self.actions.clear();
        self.rewards.clear();
    }

    /// Returns the states.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Returns the actions.
    pub fn actions(&self) -> &[usize] {
        &self.actions
    }

    /// Returns the rewards.
    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// Returns the undiscounted sum of rewards.
    pub fn total_return(&self) -> f32 {
        self.rewards.iter().sum()
    }
}

/// A borrowed view of consecutive entries of a [`TransitionBuffer`].
///
/// The first `(state, action)` pair of the window is the one a policy update
/// is applied to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window<'a> {
    /// States.
    pub states: &'a [State],

    /// Actions.
    pub actions: &'a [usize],

    /// Rewards.
    pub rewards: &'a [f32],
}

impl<'a> Window<'a> {
    /// Returns the lengths of the `(states, actions, rewards)` slices.
    pub fn depth(&self) -> (usize, usize, usize) {
        (self.states.len(), self.actions.len(), self.rewards.len())
    }

    /// Returns the window without its first `k` entries.
    pub fn skip(&self, k: usize) -> Window<'a> {
        Window {
            states: self.states.get(k..).unwrap_or(&[]),
            actions: self.actions.get(k..).unwrap_or(&[]),
            rewards: self.rewards.get(k..).unwrap_or(&[]),
        }
    }

    /// Returns the first `(state, action)` pair, if any.
    pub fn first(&self) -> Option<(&'a State, usize)> {
        Some((self.states.first()?, *self.actions.first()?))
    }
}
