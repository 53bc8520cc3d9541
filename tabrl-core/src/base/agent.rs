//! Agent.
use super::Policy;
use crate::{error::TabRlError, State, Window};
use log::debug;

/// Identifier of an [`Agent`] within a [`Trainer`](crate::Trainer).
pub type AgentId = u32;

/// A policy paired with the state it is currently in.
///
/// An agent has two independent learning switches: its own training mode
/// ([`Agent::train`] / [`Agent::eval`]) and the static flag of its policy.
/// Estimates are updated only when the agent is in training mode and the
/// policy is not static.
pub struct Agent {
    id: AgentId,
    policy: Box<dyn Policy>,
    start_state: State,
    state: State,
    is_train: bool,
}

impl Agent {
    /// Constructs an agent in training mode, placed at `start_state`.
    pub fn new(id: AgentId, policy: Box<dyn Policy>, start_state: State) -> Result<Self, TabRlError> {
        if !policy.space().contains(&start_state) {
            return Err(TabRlError::InvalidState(start_state.into_inner()));
        }

        Ok(Self {
            id,
            policy,
            state: start_state.clone(),
            start_state,
            is_train: true,
        })
    }

    /// Returns the id.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Returns the current state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Returns the state the agent starts every episode from.
    pub fn start_state(&self) -> &State {
        &self.start_state
    }

    /// Moves the agent to `s`.
    ///
    /// Returns `false`, leaving the agent where it is, if `s` is not a valid state.
    pub fn set_state(&mut self, s: State) -> bool {
        if !self.policy.space().contains(&s) {
            return false;
        }
        self.state = s;
        true
    }

    /// Moves the agent back to its start state.
    pub fn reset(&mut self) {
        self.state = self.start_state.clone();
    }

    /// Samples an action at `s` with the policy.
    pub fn act(&mut self, s: &State, explore: bool) -> Result<usize, TabRlError> {
        self.policy.select_action(s, explore)
    }

    /// Set the agent to training mode.
    pub fn train(&mut self) {
        self.is_train = true;
    }

    /// Set the agent to evaluation mode.
    pub fn eval(&mut self) {
        self.is_train = false;
    }

    /// Return if it is in training mode.
    pub fn is_train(&self) -> bool {
        self.is_train
    }

    /// Improves the policy with `window` if the agent is in training mode.
    pub fn improve(&mut self, window: &Window<'_>) -> Result<bool, TabRlError> {
        if !self.is_train {
            debug!("Agent {} is frozen, skipped update", self.id);
            return Ok(false);
        }
        self.policy.improve(window)
    }

    /// Applies the terminal updates of a finished episode if the agent is in training mode.
    pub fn finish_episode(&mut self, window: &Window<'_>) -> Result<usize, TabRlError> {
        if !self.is_train {
            return Ok(0);
        }
        self.policy.finish_episode(window)
    }

    /// Returns the policy.
    pub fn policy(&self) -> &dyn Policy {
        self.policy.as_ref()
    }

    /// Returns the policy for direct mutation.
    pub fn policy_mut(&mut self) -> &mut dyn Policy {
        self.policy.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Configurable, DiscreteSpace, TabularPolicy, TabularPolicyConfig, TransitionBuffer};

    fn agent() -> Agent {
        let space = DiscreteSpace::new(vec![3, 3], vec![vec![0, 1], vec![1, 0]]).unwrap();
        let policy = TabularPolicy::build(space, TabularPolicyConfig::default()).unwrap();
        Agent::new(7, Box::new(policy), State::from([0, 0])).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_start() {
        let space = DiscreteSpace::new(vec![3], vec![vec![1]]).unwrap();
        let policy = TabularPolicy::build(space, TabularPolicyConfig::default()).unwrap();
        assert!(Agent::new(0, Box::new(policy), State::from([3])).is_err());
    }

    #[test]
    fn test_set_state() {
        let mut agent = agent();
        assert!(agent.set_state(State::from([2, 1])));
        assert_eq!(agent.state(), &State::from([2, 1]));
        assert!(!agent.set_state(State::from([3, 1])));
        assert!(!agent.set_state(State::from([1])));
        assert_eq!(agent.state(), &State::from([2, 1]));

        agent.reset();
        assert_eq!(agent.state(), agent.start_state());
    }

    #[test]
    fn test_frozen_agent_does_not_improve() {
        let mut agent = agent();
        let buf = TransitionBuffer::from_parts(
            vec![State::from([0, 0]), State::from([0, 1])],
            vec![0, 1],
            vec![-1.],
        );
        let before = agent.policy().value_tables()[0].clone();

        agent.eval();
        assert_eq!(agent.improve(&buf.window()), Ok(false));
        assert_eq!(agent.finish_episode(&buf.window()), Ok(0));
        assert_eq!(agent.policy().value_tables()[0], &before);

        agent.train();
        assert_eq!(agent.improve(&buf.window()), Ok(true));
        assert_ne!(agent.policy().value_tables()[0], &before);
    }

    #[test]
    fn test_static_policy_gates_training_agent() {
        let mut agent = agent();
        agent.policy_mut().set_static(true);
        let buf = TransitionBuffer::from_parts(
            vec![State::from([0, 0]), State::from([0, 1])],
            vec![0, 1],
            vec![-1.],
        );
        assert!(agent.is_train());
        assert_eq!(agent.improve(&buf.window()), Ok(false));
    }
}
