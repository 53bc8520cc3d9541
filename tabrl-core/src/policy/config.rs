//! Configuration of tabular policies.
use crate::error::TabRlError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Selects the bootstrap value of the target of [`TabularPolicy`](super::TabularPolicy).
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum TargetRule {
    /// Value of the next `(state, action)` pair recorded in the buffer.
    Sarsa,

    /// Maximum value over actions at the next state.
    QLearning,

    /// Expected value at the next state under the action distribution of the policy.
    ExpectedSarsa,
}

impl Default for TargetRule {
    fn default() -> Self {
        Self::Sarsa
    }
}

/// Configuration of [`TabularPolicy`](super::TabularPolicy) and
/// [`DoubleQPolicy`](super::DoubleQPolicy).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TabularPolicyConfig {
    /// Discount factor.
    pub discount_factor: f32,

    /// Probability of taking a uniformly random action.
    pub epsilon: f32,

    /// Step size of the update.
    pub learning_rate: f32,

    /// If `true`, the estimates are never updated.
    pub is_static: bool,

    /// Mean of the initial values.
    pub init_mean: f32,

    /// Variance of the initial values.
    pub init_variance: f32,

    /// Number of rewards of a target before bootstrapping.
    pub n_step: usize,

    /// Bootstrap rule, ignored by [`DoubleQPolicy`](super::DoubleQPolicy).
    pub rule: TargetRule,

    /// Seed of the random number generator.
    pub seed: u64,
}

impl Default for TabularPolicyConfig {
    fn default() -> Self {
        Self {
            discount_factor: 0.9,
            epsilon: 0.1,
            learning_rate: 0.1,
            is_static: false,
            init_mean: 0.,
            init_variance: 0.01,
            n_step: 1,
            rule: TargetRule::default(),
            seed: 42,
        }
    }
}

impl TabularPolicyConfig {
    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f32) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the exploration probability.
    pub fn epsilon(mut self, v: f32) -> Self {
        self.epsilon = v;
        self
    }

    /// Sets the learning rate.
    pub fn learning_rate(mut self, v: f32) -> Self {
        self.learning_rate = v;
        self
    }

    /// Freezes or unfreezes the policy.
    pub fn is_static(mut self, v: bool) -> Self {
        self.is_static = v;
        self
    }

    /// Sets the mean of the initial values.
    pub fn init_mean(mut self, v: f32) -> Self {
        self.init_mean = v;
        self
    }

    /// Sets the variance of the initial values.
    pub fn init_variance(mut self, v: f32) -> Self {
        self.init_variance = v;
        self
    }

    /// Sets the number of steps of the target.
    pub fn n_step(mut self, v: usize) -> Self {
        self.n_step = v;
        self
    }

    /// Sets the bootstrap rule.
    pub fn rule(mut self, v: TargetRule) -> Self {
        self.rule = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Checks the ranges of the values.
    pub fn validate(&self) -> Result<(), TabRlError> {
        let check = |name: &str, v: f32| {
            if (0. ..=1.).contains(&v) {
                Ok(())
            } else {
                Err(TabRlError::InvalidConfig(format!(
                    "{} must be in [0, 1], got {}",
                    name, v
                )))
            }
        };
        check("discount_factor", self.discount_factor)?;
        check("epsilon", self.epsilon)?;
        check("learning_rate", self.learning_rate)?;
        if self.n_step == 0 {
            return Err(TabRlError::InvalidConfig(
                "n_step must be positive".to_string(),
            ));
        }
        if !(self.init_variance >= 0.) {
            return Err(TabRlError::InvalidConfig(format!(
                "init_variance must be non-negative, got {}",
                self.init_variance
            )));
        }
        Ok(())
    }

    /// Constructs [`TabularPolicyConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TabularPolicyConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
