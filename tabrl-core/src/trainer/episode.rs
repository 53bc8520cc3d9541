//! Archived episodes.
use crate::{AgentId, State, TransitionBuffer};
use std::collections::BTreeMap;

/// A finished episode of a [`Trainer`](super::Trainer).
#[derive(Clone, Debug, PartialEq)]
pub struct Episode {
    /// Position of the episode in the archive.
    pub index: usize,

    /// Number of steps taken.
    pub steps: usize,

    /// `true` if every agent reached a terminal state within the step budget.
    pub terminated: bool,

    /// Transition history of each agent.
    pub histories: BTreeMap<AgentId, TransitionBuffer>,
}

impl Episode {
    /// Returns the history of agent `id`.
    pub fn history(&self, id: AgentId) -> Option<&TransitionBuffer> {
        self.histories.get(&id)
    }

    /// Returns the undiscounted return of agent `id`.
    pub fn total_return(&self, id: AgentId) -> Option<f32> {
        self.history(id).map(|h| h.total_return())
    }

    /// Returns the states agent `id` acted in, in order.
    pub fn path(&self, id: AgentId) -> Option<&[State]> {
        self.history(id).map(|h| h.states())
    }
}
