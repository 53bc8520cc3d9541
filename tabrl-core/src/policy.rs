//! Tabular policies.
//!
//! [`TabularPolicy`] covers SARSA, Q-learning and expected SARSA, which differ
//! only in the bootstrap value of the target (see [`TargetRule`]).
//! [`DoubleQPolicy`] keeps two tables to remove the maximization bias of
//! Q-learning.
mod config;
mod double_q;
mod tabular;
use crate::{error::TabRlError, Window};
pub use config::{TabularPolicyConfig, TargetRule};
pub use double_q::{DoubleQPolicy, Estimator};
pub use tabular::TabularPolicy;

/// Returns the number of rewards an n-step target of `window` uses.
fn horizon(n_step: usize, window: &Window<'_>) -> Result<usize, TabRlError> {
    let (n_s, n_a, n_r) = window.depth();
    let n = n_step
        .min(n_s.saturating_sub(1))
        .min(n_a.saturating_sub(1))
        .min(n_r);
    if n == 0 {
        return Err(TabRlError::InsufficientDepth {
            required: (2, 2, 1),
            available: (n_s, n_a, n_r),
        });
    }
    Ok(n)
}

/// Returns `Σ_k γ^k r_k` and the discount `γ^n` of the bootstrap value.
fn discounted_return(rewards: &[f32], gamma: f32) -> (f32, f32) {
    rewards
        .iter()
        .fold((0., 1.), |(g, discount), &r| (g + discount * r, discount * gamma))
}

fn blend(current: f32, target: f32, learning_rate: f32) -> f32 {
    (1. - learning_rate) * current + learning_rate * target
}

/// Targets of the trailing pairs of a finished episode, as `(offset, target)`.
///
/// The last `min(n_step, len)` pairs are those a window of depth `n_step + 1`
/// never started at.
fn terminal_targets(
    n_step: usize,
    gamma: f32,
    window: &Window<'_>,
) -> impl Iterator<Item = (usize, f32)> {
    let len = window.states.len().min(window.actions.len());
    let rewards = window.rewards.to_vec();
    (len.saturating_sub(n_step)..len).map(move |i| {
        let tail = rewards.get(i..).unwrap_or(&[]);
        (i, discounted_return(tail, gamma).0)
    })
}
