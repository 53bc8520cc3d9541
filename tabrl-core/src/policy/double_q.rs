//! Double Q-learning.
use super::{blend, discounted_return, horizon, terminal_targets, TabularPolicyConfig};
use crate::{
    error::TabRlError, explorer::EpsilonGreedy, Configurable, DiscreteSpace, Policy, State,
    ValueTable, Window,
};
use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// One of the two tables of a [`DoubleQPolicy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Estimator {
    /// The first table.
    First,

    /// The second table.
    Second,
}

impl Estimator {
    /// Returns the other table.
    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// Q-learning with two value tables.
///
/// Each update flips a fair coin to pick the table to update. The greedy
/// actions at the bootstrap state are taken from the updated table and their
/// value is read from the other one, which removes the positive bias of
/// maximizing over noisy estimates. Actions are selected on the sum of both
/// tables.
///
/// [`TabularPolicyConfig::rule`] is ignored.
pub struct DoubleQPolicy {
    tables: [ValueTable; 2],
    explorer: EpsilonGreedy,
    config: TabularPolicyConfig,
    rng: StdRng,
    last_updated: Option<Estimator>,
}

impl Configurable for DoubleQPolicy {
    type Config = TabularPolicyConfig;

    fn build(space: DiscreteSpace, config: Self::Config) -> Result<Self, TabRlError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let q1 = ValueTable::random(
            space.clone(),
            config.init_mean,
            config.init_variance,
            &mut rng,
        )?;
        let q2 = ValueTable::random(space, config.init_mean, config.init_variance, &mut rng)?;

        Ok(Self {
            tables: [q1, q2],
            explorer: EpsilonGreedy::new(config.epsilon),
            config,
            rng,
            last_updated: None,
        })
    }
}

impl DoubleQPolicy {
    fn ix(which: Estimator) -> usize {
        match which {
            Estimator::First => 0,
            Estimator::Second => 1,
        }
    }

    /// Returns one of the tables.
    pub fn table(&self, which: Estimator) -> &ValueTable {
        &self.tables[Self::ix(which)]
    }

    /// Returns one of the tables for direct writes.
    pub fn table_mut(&mut self, which: Estimator) -> &mut ValueTable {
        &mut self.tables[Self::ix(which)]
    }

    /// Returns the table updated by the latest call of [`Policy::improve`].
    pub fn last_updated(&self) -> Option<Estimator> {
        self.last_updated
    }

    /// Returns the target of `window` for an update of table `which`.
    ///
    /// When several actions tie for the maximum of `which` at the bootstrap
    /// state, the bootstrap value is the mean of the other table over them,
    /// i.e. the expectation under uniform tie-breaking.
    pub fn estimate_target_for(
        &self,
        which: Estimator,
        window: &Window<'_>,
    ) -> Result<f32, TabRlError> {
        let n = horizon(self.config.n_step, window)?;
        let (g, discount) = discounted_return(&window.rewards[..n], self.config.discount_factor);

        let s = &window.states[n];
        let greedy = self.table(which).greedy_actions(s)?;
        let evaluator = self.table(which.other());
        let mut bootstrap = 0.;
        for &a in greedy.iter() {
            bootstrap += evaluator.read_value(s, a)?;
        }
        bootstrap /= greedy.len() as f32;

        Ok(g + discount * bootstrap)
    }

    /// Updates table `which` with the target of `window`.
    ///
    /// Returns `Ok(false)` without touching the tables if the policy is static.
    pub fn improve_estimator(
        &mut self,
        which: Estimator,
        window: &Window<'_>,
    ) -> Result<bool, TabRlError> {
        if self.config.is_static {
            return Ok(false);
        }

        let target = self.estimate_target_for(which, window)?;
        let (s, a) = window.first().ok_or(TabRlError::InsufficientDepth {
            required: (2, 2, 1),
            available: window.depth(),
        })?;
        let table = &mut self.tables[Self::ix(which)];
        let current = table.read_value(s, a)?;
        let value = blend(current, target, self.config.learning_rate);
        debug!("Update {:?} Q({}, {}): {} -> {}", which, s, a, current, value);
        self.last_updated = Some(which);

        Ok(table.update_value(s, a, value))
    }

    fn summed_values(&self, s: &State) -> Result<Vec<f32>, TabRlError> {
        let q1 = self.tables[0].action_values(s)?;
        let q2 = self.tables[1].action_values(s)?;
        Ok(q1.iter().zip(q2.iter()).map(|(v1, v2)| v1 + v2).collect())
    }
}

impl Policy for DoubleQPolicy {
    fn space(&self) -> &DiscreteSpace {
        self.tables[0].space()
    }

    fn select_action(&mut self, s: &State, explore: bool) -> Result<usize, TabRlError> {
        let values = self.summed_values(s)?;
        Ok(self.explorer.action(&values, explore, &mut self.rng))
    }

    fn action_probability(&self, s: &State, a: usize) -> Result<f32, TabRlError> {
        if a >= self.space().num_actions() {
            return Err(TabRlError::InvalidAction(a as i64));
        }
        Ok(self.explorer.probability(&self.summed_values(s)?, a))
    }

    fn action_values(&self, s: &State) -> Result<Vec<f32>, TabRlError> {
        Ok(self
            .summed_values(s)?
            .into_iter()
            .map(|v| v / 2.)
            .collect())
    }

    /// Target for an update of the first table; see [`DoubleQPolicy::estimate_target_for`].
    fn estimate_target(&self, window: &Window<'_>) -> Result<f32, TabRlError> {
        self.estimate_target_for(Estimator::First, window)
    }

    fn improve(&mut self, window: &Window<'_>) -> Result<bool, TabRlError> {
        if self.config.is_static {
            return Ok(false);
        }
        let which = if self.rng.gen_bool(0.5) {
            Estimator::First
        } else {
            Estimator::Second
        };
        self.improve_estimator(which, window)
    }

    fn finish_episode(&mut self, window: &Window<'_>) -> Result<usize, TabRlError> {
        if self.config.is_static {
            return Ok(0);
        }

        let mut n_updates = 0;
        for (i, target) in terminal_targets(self.config.n_step, self.config.discount_factor, window)
        {
            let (s, a) = (&window.states[i], window.actions[i]);
            let ix = self.rng.gen_range(0..2);
            let table = &mut self.tables[ix];
            let current = table.read_value(s, a)?;
            if table.update_value(s, a, blend(current, target, self.config.learning_rate)) {
                n_updates += 1;
            }
        }
        Ok(n_updates)
    }

    fn required_depth(&self) -> (usize, usize, usize) {
        let n = self.config.n_step + 1;
        (n, n, n)
    }

    fn is_static(&self) -> bool {
        self.config.is_static
    }

    fn set_static(&mut self, is_static: bool) {
        self.config.is_static = is_static;
    }

    fn value_tables(&self) -> Vec<&ValueTable> {
        self.tables.iter().collect()
    }
}
