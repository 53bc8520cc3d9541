//! Discrete state lattice and enumerated action set.
use crate::error::TabRlError;
use serde::{Deserialize, Serialize};
use std::{
    convert::TryFrom,
    fmt::{self, Debug, Display},
    ops::Deref,
};

/// A point in the lattice of a [`DiscreteSpace`].
///
/// The same container is used for every state in the library; value tables
/// convert it to a flat index with [`DiscreteSpace::state_index`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct State(Vec<i64>);

impl State {
    /// Constructs a state from its coordinates.
    pub fn new(coords: Vec<i64>) -> Self {
        Self(coords)
    }

    /// Returns the coordinates.
    pub fn coords(&self) -> &[i64] {
        &self.0
    }

    /// Returns the state displaced by `offset`, component-wise.
    pub fn displaced(&self, offset: &[i64]) -> Result<Self, TabRlError> {
        if offset.len() != self.0.len() {
            return Err(TabRlError::DimensionMismatch {
                expected: self.0.len(),
                got: offset.len(),
            });
        }
        Ok(Self(
            self.0.iter().zip(offset.iter()).map(|(s, d)| s + d).collect(),
        ))
    }

    /// Consumes the state and returns its coordinates.
    pub fn into_inner(self) -> Vec<i64> {
        self.0
    }
}

impl Deref for State {
    type Target = [i64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[i64]> for State {
    fn as_ref(&self) -> &[i64] {
        &self.0
    }
}

impl From<Vec<i64>> for State {
    fn from(coords: Vec<i64>) -> Self {
        Self(coords)
    }
}

impl<const N: usize> From<[i64; N]> for State {
    fn from(coords: [i64; N]) -> Self {
        Self(coords.to_vec())
    }
}

impl Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

/// A scalar that may be handed to [`DiscreteSpace`] as a coordinate or an action.
///
/// Integer types convert to `Some`, floating point types always convert to `None`,
/// even when they hold an integral value.
pub trait Coordinate: Copy + Debug {
    /// Returns the value as an integer if the type is an integer type.
    fn as_integer(self) -> Option<i64>;
}

macro_rules! signed_coordinate {
    ($($t:ty),*) => {
        $(impl Coordinate for $t {
            fn as_integer(self) -> Option<i64> {
                Some(self as i64)
            }
        })*
    };
}

macro_rules! unsigned_coordinate {
    ($($t:ty),*) => {
        $(impl Coordinate for $t {
            fn as_integer(self) -> Option<i64> {
                // Values beyond i64::MAX are out of range for any lattice anyway.
                Some(i64::try_from(self).unwrap_or(i64::MAX))
            }
        })*
    };
}

macro_rules! float_coordinate {
    ($($t:ty),*) => {
        $(impl Coordinate for $t {
            fn as_integer(self) -> Option<i64> {
                None
            }
        })*
    };
}

signed_coordinate!(i8, i16, i32, i64, isize);
unsigned_coordinate!(u8, u16, u32, u64, usize);
float_coordinate!(f32, f64);

/// Holds the state lattice and the action set of a world.
///
/// `dims[i]` is the number of values of the `i`-th state dimension, so a state `s`
/// is valid iff `0 <= s[i] < dims[i]` for all `i`. Each action is a displacement
/// vector added to a state; the action index is its position in `action_offsets`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscreteSpace {
    dims: Vec<usize>,
    action_offsets: Vec<Vec<i64>>,
}

impl DiscreteSpace {
    /// Constructs a space.
    ///
    /// Fails if `dims` is empty or has a zero entry, if there is no action,
    /// or if an action offset does not have `dims.len()` components.
    pub fn new(dims: Vec<usize>, action_offsets: Vec<Vec<i64>>) -> Result<Self, TabRlError> {
        if dims.is_empty() || dims.iter().any(|&d| d == 0) {
            return Err(TabRlError::InvalidConfig(format!(
                "Each state dimension must be positive, got {:?}",
                dims
            )));
        }
        if action_offsets.is_empty() {
            return Err(TabRlError::InvalidConfig(
                "At least one action is required".to_string(),
            ));
        }
        if let Some(offset) = action_offsets.iter().find(|o| o.len() != dims.len()) {
            return Err(TabRlError::DimensionMismatch {
                expected: dims.len(),
                got: offset.len(),
            });
        }

        Ok(Self {
            dims,
            action_offsets,
        })
    }

    /// Returns the size of each state dimension.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the number of state dimensions.
    pub fn num_dims(&self) -> usize {
        self.dims.len()
    }

    /// Returns the number of actions.
    pub fn num_actions(&self) -> usize {
        self.action_offsets.len()
    }

    /// Returns the number of states in the lattice.
    pub fn num_states(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns `true` iff every coordinate of `s` is an integer within `[0, dims[i])`.
    ///
    /// Non-integer coordinates and a wrong number of coordinates give `false`,
    /// never an error, so this can be used as a cheap type and range guard.
    pub fn is_valid_state<C, S>(&self, s: S) -> bool
    where
        C: Coordinate,
        S: AsRef<[C]>,
    {
        let s = s.as_ref();
        s.len() == self.dims.len()
            && s.iter().zip(self.dims.iter()).all(|(c, &d)| match c.as_integer() {
                Some(c) => c >= 0 && c < d as i64,
                None => false,
            })
    }

    /// Returns `true` iff `s` lies in the lattice.
    pub fn contains(&self, s: &State) -> bool {
        self.is_valid_state(s)
    }

    /// Returns `Ok(true)` iff `a` is in `[0, num_actions)`.
    ///
    /// Unlike [`DiscreteSpace::is_valid_state`], a non-integer value is an error
    /// ([`TabRlError::ActionType`]) rather than `false`.
    pub fn is_valid_action<C: Coordinate>(&self, a: C) -> Result<bool, TabRlError> {
        match a.as_integer() {
            Some(a) => Ok(a >= 0 && a < self.num_actions() as i64),
            None => Err(TabRlError::ActionType(format!("{:?}", a))),
        }
    }

    /// Returns `true` iff `s` is a valid state and `a` a valid action.
    pub fn is_valid_state_action(&self, s: &State, a: usize) -> bool {
        a < self.num_actions() && self.contains(s)
    }

    /// Returns the displacement vector of action `a`.
    pub fn action_displacement(&self, a: usize) -> Result<&[i64], TabRlError> {
        self.action_offsets
            .get(a)
            .map(|v| v.as_slice())
            .ok_or(TabRlError::InvalidAction(a as i64))
    }

    /// Returns all displacement vectors in action order.
    pub fn action_offsets(&self) -> &[Vec<i64>] {
        &self.action_offsets
    }

    /// Returns `(0, .., 0)`.
    pub fn zero_state(&self) -> State {
        State(vec![0; self.dims.len()])
    }

    /// Returns `(dims[0] - 1, .., dims[n - 1] - 1)`.
    pub fn last_state(&self) -> State {
        State(self.dims.iter().map(|&d| d as i64 - 1).collect())
    }

    /// Returns the row-major flat index of `s`, `None` if `s` is not in the lattice.
    pub fn state_index(&self, s: &State) -> Option<usize> {
        if !self.contains(s) {
            return None;
        }
        Some(
            s.iter()
                .zip(self.dims.iter())
                .fold(0, |ix, (&c, &d)| ix * d + c as usize),
        )
    }

    /// Inverse of [`DiscreteSpace::state_index`].
    pub fn state_from_index(&self, mut ix: usize) -> Option<State> {
        if ix >= self.num_states() {
            return None;
        }
        let mut coords = vec![0i64; self.dims.len()];
        for (c, &d) in coords.iter_mut().zip(self.dims.iter()).rev() {
            *c = (ix % d) as i64;
            ix /= d;
        }
        Some(State(coords))
    }

    /// Iterates over all states in row-major order.
    pub fn states(&self) -> impl Iterator<Item = State> + '_ {
        (0..self.num_states()).filter_map(move |ix| self.state_from_index(ix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> DiscreteSpace {
        DiscreteSpace::new(
            vec![9, 7],
            vec![vec![1, 1], vec![-1, -1], vec![1, 0], vec![1, -2]],
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_mismatched_offsets() {
        let res = DiscreteSpace::new(vec![3, 4, 5], vec![vec![1, 1]]);
        assert_eq!(
            res,
            Err(TabRlError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        );
        assert!(DiscreteSpace::new(vec![3, 0], vec![vec![1, 1]]).is_err());
        assert!(DiscreteSpace::new(vec![3], vec![]).is_err());
    }

    #[test]
    fn test_is_valid_state() {
        let ws = space();
        assert!(ws.is_valid_state([3, 4]));
        assert!(ws.is_valid_state([0, 0]));
        assert!(ws.is_valid_state(vec![7i64, 1]));
        assert!(ws.is_valid_state(&State::from([8, 6])));

        assert!(!ws.is_valid_state([0, -1]));
        assert!(!ws.is_valid_state([-1, 0]));
        assert!(!ws.is_valid_state([9, 1]));
        assert!(!ws.is_valid_state([4, 7, 5]));
        assert!(!ws.is_valid_state([2.5, 1.0]));
        assert!(!ws.is_valid_state([2.0f32, 1.0]));
    }

    #[test]
    fn test_is_valid_action() {
        let ws = space();
        assert_eq!(ws.is_valid_action(3), Ok(true));
        assert_eq!(ws.is_valid_action(6), Ok(false));
        assert_eq!(ws.is_valid_action(-1), Ok(false));
        assert_eq!(ws.is_valid_action(0usize), Ok(true));
        assert!(matches!(
            ws.is_valid_action(2.5),
            Err(TabRlError::ActionType(_))
        ));
    }

    #[test]
    fn test_action_displacement() {
        let ws = space();
        assert_eq!(ws.action_displacement(1).unwrap(), &[-1, -1]);
        assert_eq!(ws.action_displacement(3).unwrap(), &[1, -2]);
        assert_eq!(ws.action_displacement(4), Err(TabRlError::InvalidAction(4)));
    }

    #[test]
    fn test_zero_and_last_state() {
        let ws = space();
        assert_eq!(ws.zero_state(), State::from([0, 0]));
        assert_eq!(ws.last_state(), State::from([8, 6]));
        assert_eq!(ws.num_dims(), 2);
        assert_eq!(ws.num_states(), 63);
    }

    #[test]
    fn test_state_index() {
        let ws = space();
        assert_eq!(ws.state_index(&State::from([0, 0])), Some(0));
        assert_eq!(ws.state_index(&State::from([1, 2])), Some(9));
        assert_eq!(ws.state_index(&State::from([8, 6])), Some(62));
        assert_eq!(ws.state_index(&State::from([9, 0])), None);
        for (ix, s) in ws.states().enumerate() {
            assert_eq!(ws.state_index(&s), Some(ix));
        }
        assert_eq!(ws.states().count(), 63);
    }
}
