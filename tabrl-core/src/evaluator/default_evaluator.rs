//! Default implementation of the [`Evaluator`] trait.
use super::Evaluator;
use crate::{record::Record, Agent, Env};
use anyhow::Result;
use log::info;

/// Runs greedy episodes and reports the average return.
///
/// Every episode starts at the start state of the agent and follows the greedy
/// action (ties broken at random) until a terminal state or `max_steps` steps.
/// The agent is neither moved nor trained.
///
/// # Examples
///
/// ```ignore
/// let mut evaluator = DefaultEvaluator::new(10, 100);
/// let record = trainer.evaluate(agent_id, &mut evaluator)?;
/// println!("Average return: {}", record.get_scalar("Episode return")?);
/// ```
#[derive(Clone, Debug)]
pub struct DefaultEvaluator {
    /// The number of episodes to run during evaluation.
    n_episodes: usize,

    /// The step budget of an episode.
    max_steps: usize,
}

impl<E: Env> Evaluator<E> for DefaultEvaluator {
    fn evaluate(&mut self, env: &mut E, agent: &mut Agent) -> Result<Record> {
        let mut r_total = 0f32;

        for _ in 0..self.n_episodes {
            let mut s = agent.start_state().clone();
            for _ in 0..self.max_steps {
                let act = agent.act(&s, false)?;
                let step = env.step(&s, act)?;
                r_total += step.reward;
                if step.is_terminal {
                    break;
                }
                s = step.state;
            }
        }

        let r_mean = r_total / self.n_episodes.max(1) as f32;
        info!(
            "Agent {}: average return {} over {} episodes",
            agent.id(),
            r_mean,
            self.n_episodes
        );
        Ok(Record::from_scalar("Episode return", r_mean))
    }
}

impl DefaultEvaluator {
    /// Constructs a new [`DefaultEvaluator`].
    pub fn new(n_episodes: usize, max_steps: usize) -> Self {
        Self {
            n_episodes,
            max_steps,
        }
    }
}
