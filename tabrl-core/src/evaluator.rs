//! Evaluate [`Agent`].
use crate::{record::Record, Agent, Env};
use anyhow::Result;
mod default_evaluator;
pub use default_evaluator::DefaultEvaluator;

/// Evaluate [`Agent`].
pub trait Evaluator<E: Env> {
    /// Evaluate [`Agent`] in `env`.
    ///
    /// Implementations must not update the estimates of the agent.
    fn evaluate(&mut self, env: &mut E, agent: &mut Agent) -> Result<Record>;
}
