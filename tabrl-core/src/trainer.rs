//! Run episodes of [`Agent`]s in a shared [`Env`].
mod config;
mod episode;
use crate::{
    error::TabRlError,
    record::{Record, RecordValue, Recorder},
    Agent, AgentId, Env, Evaluator, State, Step, TransitionBuffer,
};
use anyhow::Result;
pub use config::TrainerConfig;
pub use episode::Episode;
use log::{debug, error, info, warn};
use std::collections::{BTreeMap, HashMap};

struct Slot {
    agent: Agent,
    buffer: TransitionBuffer,
    is_terminal: bool,
    // Set once a push is rejected; the buffer no longer ends at the current step.
    overflowed: bool,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages episodes of a set of agents sharing one environment.
///
/// # Episode
///
/// [`Trainer::run_episode`] proceeds as follows:
///
/// 1. Every agent is moved to its start state and its transition buffer is cleared.
/// 2. At each step, every agent that is not yet terminal, in registration order:
///     1. samples an action `a_t` at its state `s_t` with exploration,
///     2. calls [`Env::step`], getting the next state and the reward `r_t+1`,
///     3. moves to the next state,
///     4. pushes `(s_t, a_t, r_t+1)` to its buffer,
///     5. improves its policy with the trailing window of the buffer if the buffer
///        is deep enough (see [`Policy::required_depth`]),
///     6. if the next state is terminal, applies the terminal updates of the
///        episode (see [`Policy::finish_episode`]).
/// 3. The episode ends as soon as all agents are terminal or after `max_steps` steps.
/// 4. The buffers are archived as an [`Episode`] and a [`Record`] is written to
///    the recorder.
///
/// Improvement only happens for agents in training mode whose policy is not static.
/// Once the buffer of an agent is full, the agent keeps moving but its policy is
/// left untouched until the end of the episode.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|action|B[Env]
///     B -->|Step|A
///     A -->|"(s, a, r)"|C[TransitionBuffer]
///     C -->|Window|D[Policy]
///     D -->|estimates|A
/// ```
///
/// [`Policy::required_depth`]: crate::Policy::required_depth
/// [`Policy::finish_episode`]: crate::Policy::finish_episode
pub struct Trainer<E: Env> {
    env: E,
    slots: Vec<Slot>,
    index: HashMap<AgentId, usize>,
    episodes: Vec<Episode>,
    config: TrainerConfig,
    recorder: Option<Box<dyn Recorder>>,
}

impl<E: Env> Trainer<E> {
    /// Constructs a trainer.
    ///
    /// Fails if two agents share an id or an agent is defined on a space
    /// different from that of `env`.
    pub fn build(config: TrainerConfig, env: E, agents: Vec<Agent>) -> Result<Self, TabRlError> {
        let mut index = HashMap::new();
        let mut slots = Vec::with_capacity(agents.len());

        for agent in agents.into_iter() {
            if index.contains_key(&agent.id()) {
                return Err(TabRlError::DuplicateAgent(agent.id()));
            }
            if agent.policy().space() != env.space() {
                return Err(TabRlError::InvalidConfig(format!(
                    "Agent {} is defined on a different space than the environment",
                    agent.id()
                )));
            }
            index.insert(agent.id(), slots.len());
            slots.push(Slot {
                agent,
                buffer: TransitionBuffer::with_capacity(config.buffer_capacity),
                is_terminal: false,
                overflowed: false,
            });
        }

        Ok(Self {
            env,
            slots,
            index,
            episodes: Vec::new(),
            config,
            recorder: None,
        })
    }

    /// Sets the recorder receiving one [`Record`] per episode.
    pub fn with_recorder(mut self, recorder: Box<dyn Recorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Returns the environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Returns the environment for direct mutation.
    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Returns the ids of the agents in registration order.
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.slots.iter().map(|slot| slot.agent.id()).collect()
    }

    fn slot_ix(&self, id: AgentId) -> Result<usize, TabRlError> {
        match self.index.get(&id) {
            Some(&ix) => Ok(ix),
            None => {
                error!("Agent {} is not registered", id);
                Err(TabRlError::UnknownAgent(id))
            }
        }
    }

    /// Returns agent `id`.
    pub fn agent(&self, id: AgentId) -> Result<&Agent, TabRlError> {
        let ix = self.slot_ix(id)?;
        Ok(&self.slots[ix].agent)
    }

    /// Returns agent `id` for direct mutation.
    pub fn agent_mut(&mut self, id: AgentId) -> Result<&mut Agent, TabRlError> {
        let ix = self.slot_ix(id)?;
        Ok(&mut self.slots[ix].agent)
    }

    /// Returns the current state of agent `id`.
    pub fn current_state(&self, id: AgentId) -> Result<&State, TabRlError> {
        Ok(self.agent(id)?.state())
    }

    /// Returns the transition buffer of agent `id` for the current episode.
    pub fn current_history(&self, id: AgentId) -> Result<&TransitionBuffer, TabRlError> {
        let ix = self.slot_ix(id)?;
        Ok(&self.slots[ix].buffer)
    }

    /// Returns the archived episodes.
    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// Returns the latest archived episode.
    pub fn latest_episode(&self) -> Option<&Episode> {
        self.episodes.last()
    }

    /// Returns the undiscounted return of agent `id` in every archived episode.
    pub fn returns(&self, id: AgentId) -> Result<Vec<f32>, TabRlError> {
        self.slot_ix(id)?;
        Ok(self
            .episodes
            .iter()
            .filter_map(|e| e.total_return(id))
            .collect())
    }

    /// Returns the greedy action of agent `id` at every state.
    pub fn greedy_policy(&self, id: AgentId) -> Result<Vec<usize>, TabRlError> {
        Ok(self.agent(id)?.policy().greedy_policy())
    }

    fn step_slot(env: &mut E, slot: &mut Slot) -> Result<Step, TabRlError> {
        let s = slot.agent.state().clone();
        let a = slot.agent.act(&s, true)?;
        let step = env.step(&s, a)?;

        if !slot.agent.set_state(step.state.clone()) {
            return Err(TabRlError::InvalidState(step.state.into_inner()));
        }
        if !slot.buffer.push(s, a, step.reward) && !slot.overflowed {
            slot.overflowed = true;
            warn!(
                "Transition buffer of agent {} is full, no more updates in this episode",
                slot.agent.id()
            );
        }

        if !slot.overflowed {
            let (n_s, n_a, n_r) = slot.agent.policy().required_depth();
            if slot.buffer.has_depth(n_s, n_a, n_r) {
                let window = slot.buffer.latest(n_s, n_a, n_r)?;
                slot.agent.improve(&window)?;
            }
        }

        if step.is_terminal {
            slot.is_terminal = true;
            if !slot.overflowed {
                let n = slot.agent.finish_episode(&slot.buffer.window())?;
                debug!(
                    "Agent {} reached terminal state {}, {} terminal updates",
                    slot.agent.id(),
                    step.state,
                    n
                );
            }
        }

        Ok(step)
    }

    /// Performs a single step of agent `id`.
    ///
    /// This is the per-agent body of [`Trainer::run_episode`]; an agent that is
    /// already terminal is stepped as well.
    pub fn step_agent(&mut self, id: AgentId) -> Result<Step, TabRlError> {
        let ix = self.slot_ix(id)?;
        Self::step_slot(&mut self.env, &mut self.slots[ix])
    }

    /// Runs an episode of at most `max_steps` steps and archives it.
    pub fn run_episode(&mut self, max_steps: usize) -> Result<&Episode> {
        for slot in self.slots.iter_mut() {
            slot.agent.reset();
            slot.buffer.clear();
            slot.is_terminal = false;
            slot.overflowed = false;
        }

        let mut steps = 0;
        let mut terminated = self.slots.is_empty();
        while steps < max_steps && !terminated {
            for slot in self.slots.iter_mut().filter(|slot| !slot.is_terminal) {
                Self::step_slot(&mut self.env, slot)?;
            }
            steps += 1;
            terminated = self.slots.iter().all(|slot| slot.is_terminal);
        }

        let index = self.episodes.len();
        let histories: BTreeMap<_, _> = self
            .slots
            .iter()
            .map(|slot| (slot.agent.id(), slot.buffer.clone()))
            .collect();
        let episode = Episode {
            index,
            steps,
            terminated,
            histories,
        };
        info!(
            "Episode {}: {} steps, terminated: {}",
            index, steps, terminated
        );

        if let Some(recorder) = self.recorder.as_mut() {
            recorder.write(Self::episode_record(&episode));
        }
        self.episodes.push(episode);

        Ok(&self.episodes[index])
    }

    fn episode_record(episode: &Episode) -> Record {
        let mut record = Record::empty();
        record.insert("episode", RecordValue::Scalar(episode.index as f32));
        record.insert("steps", RecordValue::Scalar(episode.steps as f32));
        record.insert(
            "terminated",
            RecordValue::Scalar(if episode.terminated { 1. } else { 0. }),
        );
        for (id, history) in episode.histories.iter() {
            record.insert(
                format!("return/{}", id),
                RecordValue::Scalar(history.total_return()),
            );
        }
        record
    }

    /// Trains agent `id` for `episodes` episodes of at most `steps_per_episode` steps.
    ///
    /// Agent `id` is set to training mode and every other agent to evaluation
    /// mode, so only the estimates of agent `id` change.
    pub fn train(&mut self, id: AgentId, episodes: usize, steps_per_episode: usize) -> Result<()> {
        let ix = self.slot_ix(id)?;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if i == ix {
                slot.agent.train();
            } else {
                slot.agent.eval();
            }
        }

        info!(
            "Start training agent {} for {} episodes of at most {} steps",
            id, episodes, steps_per_episode
        );
        let mut n_terminated = 0;
        for _ in 0..episodes {
            if self.run_episode(steps_per_episode)?.terminated {
                n_terminated += 1;
            }
        }
        if n_terminated < episodes {
            warn!(
                "{} of {} episodes hit the step budget",
                episodes - n_terminated,
                episodes
            );
        }
        info!("Finished training agent {}", id);

        Ok(())
    }

    /// Trains agent `id` with the episode count and step budget of the configuration.
    pub fn train_with_config(&mut self, id: AgentId) -> Result<()> {
        let (episodes, steps) = (self.config.episodes, self.config.max_steps_per_episode);
        self.train(id, episodes, steps)
    }

    /// Evaluates agent `id` with `evaluator`, leaving its estimates untouched.
    pub fn evaluate<D: Evaluator<E>>(&mut self, id: AgentId, evaluator: &mut D) -> Result<Record> {
        let ix = self.slot_ix(id)?;
        let slot = &mut self.slots[ix];
        evaluator.evaluate(&mut self.env, &mut slot.agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        record::BufferedRecorder, Configurable, DefaultEvaluator, DiscreteSpace, Outcome,
        TabularPolicy, TabularPolicyConfig, TargetRule, Transition,
    };
    use std::{cell::RefCell, rc::Rc};

    /// Line of `len` cells with moves left and right, the goal at the right end.
    struct Line {
        space: DiscreteSpace,
        start: State,
        goal: State,
    }

    impl Line {
        fn new(len: usize) -> Self {
            Self {
                space: DiscreteSpace::new(vec![len], vec![vec![1], vec![-1]]).unwrap(),
                start: State::from([0]),
                goal: State::from([len as i64 - 1]),
            }
        }

        /// Only the move to the right.
        fn corridor(len: usize) -> Self {
            Self {
                space: DiscreteSpace::new(vec![len], vec![vec![1]]).unwrap(),
                ..Self::new(len)
            }
        }
    }

    impl Env for Line {
        fn space(&self) -> &DiscreteSpace {
            &self.space
        }

        fn start_state(&self) -> &State {
            &self.start
        }

        fn transition(&mut self, s: &State, a: usize) -> Result<Transition, TabRlError> {
            if !self.space.contains(s) {
                return Err(TabRlError::InvalidState(s.to_vec()));
            }
            let next = s.displaced(self.space.action_displacement(a)?)?;
            if self.space.contains(&next) {
                Ok(Transition::new(next, Outcome::Moved))
            } else {
                Ok(Transition::new(self.start.clone(), Outcome::OutOfBounds))
            }
        }

        fn reward(&self, tr: &Transition) -> f32 {
            match tr.outcome {
                Outcome::Moved => -1.,
                _ => -10.,
            }
        }

        fn is_terminal(&self, s: &State) -> bool {
            s == &self.goal
        }
    }

    fn agent(id: AgentId, seed: u64) -> Agent {
        let config = TabularPolicyConfig::default()
            .rule(TargetRule::QLearning)
            .learning_rate(0.5)
            .seed(seed);
        let policy = TabularPolicy::build(Line::new(4).space.clone(), config).unwrap();
        Agent::new(id, Box::new(policy), State::from([0])).unwrap()
    }

    #[test]
    fn test_duplicate_agent() {
        let res = Trainer::build(
            TrainerConfig::default(),
            Line::new(4),
            vec![agent(1, 0), agent(1, 1)],
        );
        assert!(matches!(res, Err(TabRlError::DuplicateAgent(1))));
    }

    #[test]
    fn test_space_mismatch() {
        let res = Trainer::build(TrainerConfig::default(), Line::new(5), vec![agent(1, 0)]);
        assert!(matches!(res, Err(TabRlError::InvalidConfig(_))));
    }

    #[test_log::test]
    fn test_unknown_agent() {
        let mut trainer =
            Trainer::build(TrainerConfig::default(), Line::new(4), vec![agent(1, 0)]).unwrap();
        assert!(matches!(
            trainer.current_state(2),
            Err(TabRlError::UnknownAgent(2))
        ));
        assert!(trainer.step_agent(2).is_err());
        let err = trainer.train(2, 1, 10).unwrap_err();
        assert_eq!(
            err.downcast_ref::<TabRlError>(),
            Some(&TabRlError::UnknownAgent(2))
        );
        assert!(trainer.episodes().is_empty());
    }

    #[test_log::test]
    fn test_run_episode() {
        let mut trainer =
            Trainer::build(TrainerConfig::default(), Line::new(4), vec![agent(3, 0)]).unwrap();
        let episode = trainer.run_episode(1000).unwrap().clone();
        assert!(episode.terminated);
        assert_eq!(episode.index, 0);
        let history = episode.history(3).unwrap();
        assert_eq!(history.len(), episode.steps);
        assert_eq!(history.states()[0], State::from([0]));
        assert_eq!(trainer.current_state(3).unwrap(), &State::from([3]));

        // Next episode starts over
        trainer.run_episode(1000).unwrap();
        assert_eq!(trainer.episodes().len(), 2);
        assert_eq!(
            trainer.current_history(3).unwrap().states()[0],
            State::from([0])
        );
    }

    #[test]
    fn test_step_budget() {
        let mut trainer =
            Trainer::build(TrainerConfig::default(), Line::new(4), vec![agent(3, 0)]).unwrap();
        let episode = trainer.run_episode(2).unwrap();
        assert!(!episode.terminated);
        assert_eq!(episode.steps, 2);
        assert_eq!(episode.history(3).unwrap().len(), 2);
    }

    #[test]
    fn test_step_agent() {
        let mut trainer =
            Trainer::build(TrainerConfig::default(), Line::new(4), vec![agent(3, 0)]).unwrap();
        let step = trainer.step_agent(3).unwrap();
        assert_eq!(trainer.current_state(3).unwrap(), &step.state);
        assert_eq!(trainer.current_history(3).unwrap().len(), 1);
    }

    #[test_log::test]
    fn test_train_learns_to_go_right() {
        let mut trainer =
            Trainer::build(TrainerConfig::default(), Line::new(4), vec![agent(0, 5)]).unwrap();
        trainer.train(0, 200, 100).unwrap();
        let policy = trainer.greedy_policy(0).unwrap();
        assert_eq!(&policy[..3], &[0, 0, 0]);
        assert_eq!(trainer.returns(0).unwrap().len(), 200);
    }

    #[test]
    fn test_train_freezes_other_agents() {
        let mut trainer = Trainer::build(
            TrainerConfig::default(),
            Line::new(4),
            vec![agent(0, 1), agent(1, 2)],
        )
        .unwrap();
        let frozen = trainer.agent(1).unwrap().policy().value_tables()[0].clone();
        let trained = trainer.agent(0).unwrap().policy().value_tables()[0].clone();
        trainer.train(0, 20, 50).unwrap();

        assert!(!trainer.agent(1).unwrap().is_train());
        assert_eq!(trainer.agent(1).unwrap().policy().value_tables()[0], &frozen);
        assert_ne!(trainer.agent(0).unwrap().policy().value_tables()[0], &trained);
    }

    struct Shared(Rc<RefCell<BufferedRecorder>>);

    impl Recorder for Shared {
        fn write(&mut self, record: Record) {
            self.0.borrow_mut().write(record);
        }
    }

    #[test]
    fn test_records() {
        let recorder = Rc::new(RefCell::new(BufferedRecorder::new()));
        let mut trainer = Trainer::build(
            TrainerConfig::default().episodes(3).max_steps_per_episode(50),
            Line::new(4),
            vec![agent(4, 0)],
        )
        .unwrap()
        .with_recorder(Box::new(Shared(recorder.clone())));
        trainer.train_with_config(4).unwrap();

        let recorder = recorder.borrow();
        assert_eq!(recorder.len(), 3);
        assert_eq!(recorder.scalars("episode"), vec![0., 1., 2.]);
        assert_eq!(recorder.scalars("return/4"), trainer.returns(4).unwrap());
    }

    #[test]
    fn test_evaluate() {
        let mut trainer =
            Trainer::build(TrainerConfig::default(), Line::new(4), vec![agent(0, 5)]).unwrap();
        trainer.train(0, 200, 100).unwrap();
        let tables = trainer.agent(0).unwrap().policy().value_tables()[0].clone();

        let mut evaluator = DefaultEvaluator::new(3, 20);
        let record = trainer.evaluate(0, &mut evaluator).unwrap();
        // Three moves to the right
        assert_eq!(record.get_scalar("Episode return").unwrap(), -3.);
        assert_eq!(trainer.agent(0).unwrap().policy().value_tables()[0], &tables);
    }

    #[test_log::test]
    fn test_full_buffer_stops_updates() {
        let env = Line::corridor(6);
        let config = TabularPolicyConfig::default()
            .rule(TargetRule::QLearning)
            .discount_factor(1.)
            .learning_rate(0.5)
            .init_variance(0.);
        let policy = TabularPolicy::build(env.space.clone(), config).unwrap();
        let agent = Agent::new(0, Box::new(policy), State::from([0])).unwrap();
        let mut trainer =
            Trainer::build(TrainerConfig::default().buffer_capacity(2), env, vec![agent]).unwrap();
        trainer.train(0, 200, 20).unwrap();

        // The agent still walks to the goal
        for episode in trainer.episodes() {
            assert!(episode.terminated);
            assert_eq!(episode.steps, 5);
            assert_eq!(episode.history(0).unwrap().len(), 2);
        }

        // Only the pair whose window fit in the buffer is learnt; the second
        // retained pair never gets a terminal return.
        let policy = trainer.agent(0).unwrap().policy();
        let q = |s: i64| policy.action_values(&State::from([s])).unwrap()[0];
        assert!((q(0) + 1.).abs() < 1e-3, "{}", q(0));
        for s in 1..6 {
            assert_eq!(q(s), 0.);
        }
    }
}
