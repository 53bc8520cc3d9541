//! Tabular policy with a single value table.
use super::{blend, discounted_return, horizon, terminal_targets, TabularPolicyConfig, TargetRule};
use crate::{
    error::TabRlError, explorer::EpsilonGreedy, Configurable, DiscreteSpace, Policy, State,
    ValueTable, Window,
};
use log::debug;
use rand::{rngs::StdRng, SeedableRng};

/// Epsilon-greedy policy over one [`ValueTable`], learning with an n-step
/// SARSA, Q-learning or expected SARSA target.
pub struct TabularPolicy {
    table: ValueTable,
    explorer: EpsilonGreedy,
    config: TabularPolicyConfig,
    rng: StdRng,
}

impl Configurable for TabularPolicy {
    type Config = TabularPolicyConfig;

    fn build(space: DiscreteSpace, config: Self::Config) -> Result<Self, TabRlError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let table = ValueTable::random(space, config.init_mean, config.init_variance, &mut rng)?;

        Ok(Self {
            table,
            explorer: EpsilonGreedy::new(config.epsilon),
            config,
            rng,
        })
    }
}

impl TabularPolicy {
    /// Returns the value table.
    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    /// Returns the value table for direct writes.
    pub fn table_mut(&mut self) -> &mut ValueTable {
        &mut self.table
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TabularPolicyConfig {
        &self.config
    }

    fn bootstrap(&self, s: &State, a: usize) -> Result<f32, TabRlError> {
        match self.config.rule {
            TargetRule::Sarsa => self.table.read_value(s, a),
            TargetRule::QLearning => self.table.max_value(s),
            TargetRule::ExpectedSarsa => {
                Ok(self.explorer.expectation(self.table.action_values(s)?))
            }
        }
    }
}

impl Policy for TabularPolicy {
    fn space(&self) -> &DiscreteSpace {
        self.table.space()
    }

    fn select_action(&mut self, s: &State, explore: bool) -> Result<usize, TabRlError> {
        let values = self.table.action_values(s)?;
        Ok(self.explorer.action(values, explore, &mut self.rng))
    }

    fn action_probability(&self, s: &State, a: usize) -> Result<f32, TabRlError> {
        if a >= self.space().num_actions() {
            return Err(TabRlError::InvalidAction(a as i64));
        }
        Ok(self.explorer.probability(self.table.action_values(s)?, a))
    }

    fn action_values(&self, s: &State) -> Result<Vec<f32>, TabRlError> {
        Ok(self.table.action_values(s)?.to_vec())
    }

    fn estimate_target(&self, window: &Window<'_>) -> Result<f32, TabRlError> {
        let n = horizon(self.config.n_step, window)?;
        let (g, discount) = discounted_return(&window.rewards[..n], self.config.discount_factor);
        let bootstrap = self.bootstrap(&window.states[n], window.actions[n])?;
        Ok(g + discount * bootstrap)
    }

    fn improve(&mut self, window: &Window<'_>) -> Result<bool, TabRlError> {
        if self.config.is_static {
            return Ok(false);
        }

        let target = self.estimate_target(window)?;
        let (s, a) = window.first().ok_or(TabRlError::InsufficientDepth {
            required: (2, 2, 1),
            available: window.depth(),
        })?;
        let current = self.table.read_value(s, a)?;
        let value = blend(current, target, self.config.learning_rate);
        debug!("Update Q({}, {}): {} -> {}", s, a, current, value);

        Ok(self.table.update_value(s, a, value))
    }

    fn finish_episode(&mut self, window: &Window<'_>) -> Result<usize, TabRlError> {
        if self.config.is_static {
            return Ok(0);
        }

        let mut n_updates = 0;
        for (i, target) in terminal_targets(self.config.n_step, self.config.discount_factor, window)
        {
            let (s, a) = (&window.states[i], window.actions[i]);
            let current = self.table.read_value(s, a)?;
            let value = blend(current, target, self.config.learning_rate);
            debug!("Terminal update Q({}, {}): {} -> {}", s, a, current, value);
            if self.table.update_value(s, a, value) {
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
        vec![&self.table]
    }
}
