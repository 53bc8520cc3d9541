//! Core functionalities.
mod agent;
mod env;
mod policy;
mod step;
pub use agent::{Agent, AgentId};
pub use env::Env;
pub use policy::{Configurable, Policy};
pub use step::{Outcome, Step, Transition};
