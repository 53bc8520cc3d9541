//! Discrete gridworld with pluggable dynamics.
use crate::{Boundary, GridEnvConfig, RewardConfig};
use log::{debug, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tabrl_core::{error::TabRlError, DiscreteSpace, Env, Outcome, State, Transition};

type HazardFn = Box<dyn Fn(&State) -> bool>;
type DynamicsFn = Box<dyn Fn(&State) -> Vec<i64>>;
type NoiseFn = Box<dyn Fn(&State, &mut StdRng) -> Vec<i64>>;

/// A grid of any dimension with hazards, deterministic dynamics and noise.
///
/// A transition from `s` with action `a`:
///
/// 1. fails if `s` is not in the grid or `a` is not an action,
/// 2. moves to `s' = s + offset(a)`,
/// 3. moves to `s'' = s' + dynamics(s') + noise(s')`,
/// 4. returns to the start state if `s''` is a hazard.
///
/// A move leaving the grid in step 2 or 3 is handled according to [`Boundary`].
/// The reward depends only on the [`Transition`] returned, never on earlier calls.
pub struct GridEnv {
    space: DiscreteSpace,
    action_names: Vec<String>,
    start_state: State,
    goal_state: State,
    hazard: HazardFn,
    dynamics: DynamicsFn,
    noise: NoiseFn,
    boundary: Boundary,
    rewards: RewardConfig,
    rng: StdRng,
}

impl GridEnv {
    /// Constructs an environment without hazards, dynamics or noise.
    ///
    /// Fails if the start or goal state is not in the grid.
    pub fn new(space: DiscreteSpace, start_state: State, goal_state: State) -> Result<Self, TabRlError> {
        for s in [&start_state, &goal_state].iter() {
            if !space.contains(s) {
                return Err(TabRlError::InvalidState(s.to_vec()));
            }
        }
        let action_names = (0..space.num_actions()).map(|a| a.to_string()).collect();

        Ok(Self {
            space,
            action_names,
            start_state,
            goal_state,
            hazard: Box::new(|_| false),
            dynamics: Box::new(|s| vec![0; s.len()]),
            noise: Box::new(|s, _| vec![0; s.len()]),
            boundary: Boundary::default(),
            rewards: RewardConfig::default(),
            rng: StdRng::seed_from_u64(0),
        })
    }

    /// Constructs an environment from a configuration.
    pub fn build(config: &GridEnvConfig, seed: u64) -> Result<Self, TabRlError> {
        let offsets = config.actions.iter().map(|a| a.offset.clone()).collect();
        let space = DiscreteSpace::new(config.dims.clone(), offsets)?;
        let start_state = State::from(config.start_state.clone());
        let goal_state = State::from(config.goal_state.clone());

        let hazards: Vec<State> = config.hazards.iter().cloned().map(State::from).collect();
        if let Some(h) = hazards.iter().find(|h| !space.contains(h)) {
            return Err(TabRlError::InvalidState(h.to_vec()));
        }
        if hazards.contains(&start_state) || hazards.contains(&goal_state) {
            return Err(TabRlError::InvalidConfig(
                "Start and goal states must not be hazards".to_string(),
            ));
        }

        let mut env = Self::new(space, start_state, goal_state)?
            .with_boundary(config.boundary)
            .with_rewards(config.rewards.clone())
            .with_seed(seed);
        env.action_names = config.actions.iter().map(|a| a.name.clone()).collect();

        if !hazards.is_empty() {
            env = env.with_hazard(move |s| hazards.contains(s));
        }

        if !config.wind.is_empty() {
            if config.dims.len() != 2 || config.wind.len() != config.dims[1] {
                return Err(TabRlError::InvalidConfig(format!(
                    "Wind needs one value per column of a 2-dimensional grid, got {} for {:?}",
                    config.wind.len(),
                    config.dims
                )));
            }
            let wind = config.wind.clone();
            env = env.with_dynamics(move |s| vec![column_value(&wind, s), 0]);

            if config.stochastic_wind {
                let wind = config.wind.clone();
                env = env.with_noise(move |s, rng| {
                    let gust = if column_value(&wind, s) != 0 {
                        rng.gen_range(-1..=1)
                    } else {
                        0
                    };
                    vec![gust, 0]
                });
            }
        }

        Ok(env)
    }

    /// Sets the hazard predicate.
    pub fn with_hazard(mut self, f: impl Fn(&State) -> bool + 'static) -> Self {
        self.hazard = Box::new(f);
        self
    }

    /// Sets the deterministic displacement applied after every move.
    pub fn with_dynamics(mut self, f: impl Fn(&State) -> Vec<i64> + 'static) -> Self {
        self.dynamics = Box::new(f);
        self
    }

    /// Sets the random displacement applied after every move.
    pub fn with_noise(mut self, f: impl Fn(&State, &mut StdRng) -> Vec<i64> + 'static) -> Self {
        self.noise = Box::new(f);
        self
    }

    /// Sets the handling of moves leaving the grid.
    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Sets the rewards.
    pub fn with_rewards(mut self, rewards: RewardConfig) -> Self {
        self.rewards = rewards;
        self
    }

    /// Reseeds the random number generator of the noise.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Returns the goal state.
    pub fn goal_state(&self) -> &State {
        &self.goal_state
    }

    /// Returns `true` if `s` is a hazard.
    pub fn is_hazard(&self, s: &State) -> bool {
        (self.hazard)(s)
    }

    /// Returns the rewards.
    pub fn rewards(&self) -> &RewardConfig {
        &self.rewards
    }

    /// Returns the names of the actions in index order.
    pub fn action_names(&self) -> &[String] {
        &self.action_names
    }

    fn bounded(&self, s: State) -> Option<State> {
        if self.space.contains(&s) {
            return Some(s);
        }
        match self.boundary {
            Boundary::Redirect => None,
            Boundary::Clip => Some(State::from(
                s.iter()
                    .zip(self.space.dims().iter())
                    .map(|(&c, &d)| c.max(0).min(d as i64 - 1))
                    .collect::<Vec<_>>(),
            )),
        }
    }

    fn redirect(&self, outcome: Outcome) -> Transition {
        Transition::new(self.start_state.clone(), outcome)
    }

    /// Renders a greedy policy of a 2-dimensional grid, one row per line.
    ///
    /// `policy` holds an action per state in row-major order, as returned by
    /// [`Policy::greedy_policy`](tabrl_core::Policy::greedy_policy).
    /// The goal is shown as `G` and hazards as `X`.
    pub fn render_policy(&self, policy: &[usize]) -> Result<String, TabRlError> {
        let dims = self.space.dims();
        if dims.len() != 2 || policy.len() != self.space.num_states() {
            return Err(TabRlError::DimensionMismatch {
                expected: self.space.num_states(),
                got: policy.len(),
            });
        }

        let width = self.action_names.iter().map(|n| n.len()).max().unwrap_or(1);
        let mut out = String::new();
        for (ix, s) in self.space.states().enumerate() {
            let cell = if s == self.goal_state {
                "G"
            } else if self.is_hazard(&s) {
                "X"
            } else {
                self.action_names
                    .get(policy[ix])
                    .map(|n| n.as_str())
                    .unwrap_or("?")
            };
            let sep = if (ix + 1) % dims[1] == 0 { "\n" } else { " " };
            out.push_str(&format!("{:>width$}{}", cell, sep, width = width));
        }
        Ok(out)
    }
}

fn column_value(values: &[i64], s: &State) -> i64 {
    s.get(1)
        .and_then(|&c| values.get(c as usize))
        .copied()
        .unwrap_or(0)
}

impl Env for GridEnv {
    fn space(&self) -> &DiscreteSpace {
        &self.space
    }

    fn start_state(&self) -> &State {
        &self.start_state
    }

    fn transition(&mut self, s: &State, a: usize) -> Result<Transition, TabRlError> {
        if !self.space.contains(s) {
            return Err(TabRlError::InvalidState(s.to_vec()));
        }
        let offset = self.space.action_displacement(a)?;

        let moved = match self.bounded(s.displaced(offset)?) {
            Some(s) => s,
            None => {
                debug!("Move {} from {} left the grid", a, s);
                return Ok(self.redirect(Outcome::OutOfBounds));
            }
        };

        let drift = (self.dynamics)(&moved);
        let noise = (self.noise)(&moved, &mut self.rng);
        let next = match self.bounded(moved.displaced(&drift)?.displaced(&noise)?) {
            Some(s) => s,
            None => {
                debug!("Dynamics from {} left the grid", moved);
                return Ok(self.redirect(Outcome::OutOfBounds));
            }
        };

        if self.is_hazard(&next) {
            debug!("Move {} from {} ended in hazard {}", a, s, next);
            return Ok(self.redirect(Outcome::Hazard));
        }

        trace!("{} --{}--> {}", s, a, next);
        Ok(Transition::new(next, Outcome::Moved))
    }

    fn reward(&self, tr: &Transition) -> f32 {
        match tr.outcome {
            Outcome::OutOfBounds => self.rewards.out_of_bounds,
            Outcome::Hazard => self.rewards.hazard,
            Outcome::Moved if tr.state == self.goal_state => self.rewards.goal,
            Outcome::Moved => self.rewards.normal,
        }
    }

    fn is_terminal(&self, s: &State) -> bool {
        s == &self.goal_state
    }
}
