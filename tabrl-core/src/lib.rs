#![warn(missing_docs)]
//! Tabular reinforcement learning on discrete lattices.
//!
//! A [`DiscreteSpace`] defines the states and actions of a world, an [`Env`]
//! its dynamics and rewards. [`Agent`]s carry a [`Policy`] learning action values
//! in a [`ValueTable`] from the trailing [`Window`]s of their
//! [`TransitionBuffer`]s, and a [`Trainer`] runs episodes of several agents in
//! one shared environment.
pub mod error;
pub mod record;

mod base;
pub use base::{Agent, AgentId, Configurable, Env, Outcome, Policy, Step, Transition};

mod buffer;
pub use buffer::{TransitionBuffer, Window, MAX_BUFFER_SIZE};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod explorer;
pub use explorer::EpsilonGreedy;

mod policy;
pub use policy::{DoubleQPolicy, Estimator, TabularPolicy, TabularPolicyConfig, TargetRule};

mod space;
pub use space::{Coordinate, DiscreteSpace, State};

mod table;
pub use table::ValueTable;

mod trainer;
pub use trainer::{Episode, Trainer, TrainerConfig};
