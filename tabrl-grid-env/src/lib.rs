#![warn(missing_docs)]
//! Gridworld environments for [`tabrl_core`].
//!
//! [`GridEnv`] is a discrete world of any dimension whose transitions can be
//! augmented with hazards, deterministic dynamics and noise. [`GridEnvConfig`]
//! describes one in plain data, with ready-made layouts:
//!
//! * [`GridEnvConfig::corridor`], a 1-dimensional walk to the right,
//! * [`GridEnvConfig::windy_gridworld`], optionally with [`king_moves`] and
//!   stochastic wind,
//! * [`GridEnvConfig::cliff_walk`].
//!
//! ```rust
//! use tabrl_core::{
//!     Agent, Configurable, Env, TabularPolicy, TabularPolicyConfig, TargetRule, Trainer,
//!     TrainerConfig,
//! };
//! use tabrl_grid_env::{GridEnv, GridEnvConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let env = GridEnv::build(&GridEnvConfig::corridor(5), 0)?;
//! let config = TabularPolicyConfig::default().rule(TargetRule::QLearning);
//! let policy = TabularPolicy::build(env.space().clone(), config)?;
//! let agent = Agent::new(0, Box::new(policy), env.start_state().clone())?;
//!
//! let mut trainer = Trainer::build(TrainerConfig::default(), env, vec![agent])?;
//! trainer.train(0, 10, 20)?;
//! assert_eq!(trainer.episodes().len(), 10);
//! # Ok(())
//! # }
//! ```
mod config;
mod env;
pub use config::{four_moves, king_moves, Boundary, GridEnvConfig, NamedAction, RewardConfig};
pub use env::GridEnv;
