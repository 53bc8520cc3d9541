//! Configuration of [`GridEnv`](crate::GridEnv).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Rewards of [`GridEnv`](crate::GridEnv), keyed by how a transition ended.
///
/// Out-of-bounds and hazard penalties are expected to be the most negative.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RewardConfig {
    /// Reward of an ordinary step.
    pub normal: f32,

    /// Reward of the step entering the goal.
    pub goal: f32,

    /// Reward of a move that left the grid.
    pub out_of_bounds: f32,

    /// Reward of a move that ended in a hazard.
    pub hazard: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            normal: -1.,
            goal: -1.,
            out_of_bounds: -50.,
            hazard: -50.,
        }
    }
}

impl RewardConfig {
    /// Sets the reward of an ordinary step.
    pub fn normal(mut self, v: f32) -> Self {
        self.normal = v;
        self
    }

    /// Sets the reward of entering the goal.
    pub fn goal(mut self, v: f32) -> Self {
        self.goal = v;
        self
    }

    /// Sets the penalty of leaving the grid.
    pub fn out_of_bounds(mut self, v: f32) -> Self {
        self.out_of_bounds = v;
        self
    }

    /// Sets the penalty of entering a hazard.
    pub fn hazard(mut self, v: f32) -> Self {
        self.hazard = v;
        self
    }
}

/// What happens to a move that leaves the grid.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Boundary {
    /// The mover is sent back to the start state and gets the out-of-bounds penalty.
    Redirect,

    /// The mover stays at the nearest cell inside the grid; the step is ordinary.
    Clip,
}

impl Default for Boundary {
    fn default() -> Self {
        Self::Redirect
    }
}

/// An action with a display name.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct NamedAction {
    /// Name shown when rendering a policy.
    pub name: String,

    /// Displacement added to the state.
    pub offset: Vec<i64>,
}

impl NamedAction {
    /// Constructs an action.
    pub fn new(name: impl Into<String>, offset: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            offset,
        }
    }
}

/// Up, down, left and right on a `(row, column)` grid, row 0 at the top.
pub fn four_moves() -> Vec<NamedAction> {
    vec![
        NamedAction::new("^", vec![-1, 0]),
        NamedAction::new("v", vec![1, 0]),
        NamedAction::new("<", vec![0, -1]),
        NamedAction::new(">", vec![0, 1]),
    ]
}

/// [`four_moves`] followed by the four diagonal moves.
pub fn king_moves() -> Vec<NamedAction> {
    let mut actions = four_moves();
    actions.extend(vec![
        NamedAction::new("^<", vec![-1, -1]),
        NamedAction::new("^>", vec![-1, 1]),
        NamedAction::new("v<", vec![1, -1]),
        NamedAction::new("v>", vec![1, 1]),
    ]);
    actions
}

/// Configuration of [`GridEnv`](crate::GridEnv).
///
/// `wind`, if not empty, applies to 2-dimensional grids only: `wind[c]` is
/// added to the row of any state reached in column `c`. With `stochastic_wind`
/// a uniformly random push of −1, 0 or +1 rows is added in every column with
/// non-zero wind.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GridEnvConfig {
    /// Size of each dimension of the grid.
    pub dims: Vec<usize>,

    /// Actions in index order.
    pub actions: Vec<NamedAction>,

    /// State every episode starts from.
    pub start_state: Vec<i64>,

    /// The terminal state.
    pub goal_state: Vec<i64>,

    /// Hazardous states.
    pub hazards: Vec<Vec<i64>>,

    /// Row displacement per column.
    pub wind: Vec<i64>,

    /// Adds random gusts to windy columns.
    pub stochastic_wind: bool,

    /// Handling of moves leaving the grid.
    pub boundary: Boundary,

    /// Rewards.
    pub rewards: RewardConfig,
}

impl Default for GridEnvConfig {
    fn default() -> Self {
        Self::windy_gridworld()
    }
}

impl GridEnvConfig {
    /// A corridor of `len` cells with a single move to the right.
    ///
    /// Starts at 0, ends at `len - 1`; every step costs 1 and entering the
    /// goal is free.
    pub fn corridor(len: usize) -> Self {
        Self {
            dims: vec![len],
            actions: vec![NamedAction::new(">", vec![1])],
            start_state: vec![0],
            goal_state: vec![len as i64 - 1],
            hazards: vec![],
            wind: vec![],
            stochastic_wind: false,
            boundary: Boundary::Redirect,
            rewards: RewardConfig::default().goal(0.),
        }
    }

    /// The 7 × 10 windy gridworld with four moves.
    pub fn windy_gridworld() -> Self {
        Self {
            dims: vec![7, 10],
            actions: four_moves(),
            start_state: vec![3, 0],
            goal_state: vec![3, 7],
            hazards: vec![],
            wind: vec![0, 0, 0, -1, -1, -1, -2, -2, -1, 0],
            stochastic_wind: false,
            boundary: Boundary::Clip,
            rewards: RewardConfig::default().goal(0.),
        }
    }

    /// The 4 × 12 cliff walk; the cliff spans the bottom row between start and goal.
    pub fn cliff_walk() -> Self {
        Self {
            dims: vec![4, 12],
            actions: four_moves(),
            start_state: vec![3, 0],
            goal_state: vec![3, 11],
            hazards: (1..11).map(|c| vec![3, c]).collect(),
            wind: vec![],
            stochastic_wind: false,
            boundary: Boundary::Clip,
            rewards: RewardConfig::default().goal(0.).hazard(-100.),
        }
    }

    /// Replaces the actions with [`king_moves`].
    pub fn king_moves(mut self) -> Self {
        self.actions = king_moves();
        self
    }

    /// Sets the actions.
    pub fn actions(mut self, v: Vec<NamedAction>) -> Self {
        self.actions = v;
        self
    }

    /// Sets the start state.
    pub fn start_state(mut self, v: Vec<i64>) -> Self {
        self.start_state = v;
        self
    }

    /// Sets the goal state.
    pub fn goal_state(mut self, v: Vec<i64>) -> Self {
        self.goal_state = v;
        self
    }

    /// Sets the hazards.
    pub fn hazards(mut self, v: Vec<Vec<i64>>) -> Self {
        self.hazards = v;
        self
    }

    /// Sets the wind.
    pub fn wind(mut self, v: Vec<i64>) -> Self {
        self.wind = v;
        self
    }

    /// Enables or disables random gusts.
    pub fn stochastic_wind(mut self, v: bool) -> Self {
        self.stochastic_wind = v;
        self
    }

    /// Sets the handling of moves leaving the grid.
    pub fn boundary(mut self, v: Boundary) -> Self {
        self.boundary = v;
        self
    }

    /// Sets the rewards.
    pub fn rewards(mut self, v: RewardConfig) -> Self {
        self.rewards = v;
        self
    }

    /// Returns the index of the action named `name`.
    pub fn action_index(&self, name: &str) -> Option<usize> {
        self.actions.iter().position(|a| a.name == name)
    }

    /// Constructs [`GridEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`GridEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
