//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
///
/// Most variants are precondition violations: a caller handed a state, an action
/// or an agent id that does not exist. They are returned as `Err` and are not
/// meant to be recovered from inside the library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TabRlError {
    /// A state outside of the lattice of a [`DiscreteSpace`](crate::DiscreteSpace).
    #[error("Invalid state: {0:?}")]
    InvalidState(Vec<i64>),

    /// An action index outside of `[0, num_actions)`.
    #[error("Invalid action: {0}")]
    InvalidAction(i64),

    /// An action given as a non-integer value.
    #[error("Action must be an integer, got {0}")]
    ActionType(String),

    /// A state-action pair that cannot be stored in a value table.
    #[error("Invalid state-action pair: state {state:?}, action {action}")]
    InvalidStateAction {
        /// State of the pair.
        state: Vec<i64>,
        /// Action of the pair.
        action: usize,
    },

    /// Dimensionality of a vector does not agree with the state space.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Number of dimensions of the state space.
        expected: usize,
        /// Number of components given.
        got: usize,
    },

    /// Not enough transitions in a buffer for the requested operation.
    #[error("Insufficient depth: required {required:?}, available {available:?}")]
    InsufficientDepth {
        /// Required `(states, actions, rewards)`.
        required: (usize, usize, usize),
        /// Available `(states, actions, rewards)`.
        available: (usize, usize, usize),
    },

    /// No agent is registered with the id.
    #[error("Unknown agent id: {0}")]
    UnknownAgent(u32),

    /// Two agents were registered with the same id.
    #[error("Duplicate agent id: {0}")]
    DuplicateAgent(u32),

    /// Configuration values are inconsistent.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Key not found in a [`Record`](crate::record::Record).
    #[error("Record key error: {0}")]
    RecordKey(String),

    /// Value of a [`Record`](crate::record::Record) has an unexpected type.
    #[error("Record value type error: expected {0}")]
    RecordValueType(String),
}
