use anyhow::Result;
use log::info;
use tabrl_core::{
    Agent, Configurable, DefaultEvaluator, DoubleQPolicy, Env, Policy, State, TabularPolicy,
    TabularPolicyConfig, TargetRule, Trainer, TrainerConfig,
};
use tabrl_grid_env::{GridEnv, GridEnvConfig};

fn policy_config(rule: TargetRule) -> TabularPolicyConfig {
    TabularPolicyConfig::default()
        .rule(rule)
        .discount_factor(1.)
        .epsilon(0.1)
        .learning_rate(0.5)
        .init_variance(0.)
}

/// Trains a tabular agent and returns the mean return of its greedy policy.
fn greedy_return_after_training(
    env_config: &GridEnvConfig,
    policy: Box<dyn Policy>,
    episodes: usize,
) -> Result<f32> {
    let env = GridEnv::build(env_config, 0)?;
    let agent = Agent::new(0, policy, env.start_state().clone())?;
    let config = TrainerConfig::default()
        .episodes(episodes)
        .max_steps_per_episode(10_000);
    let mut trainer = Trainer::build(config, env, vec![agent])?;
    trainer.train_with_config(0)?;

    let greedy = trainer.greedy_policy(0)?;
    info!("Greedy policy:\n{}", trainer.env().render_policy(&greedy)?);

    let mut evaluator = DefaultEvaluator::new(5, 100);
    let record = trainer.evaluate(0, &mut evaluator)?;
    Ok(record.get_scalar("Episode return")?)
}

fn tabular(env_config: &GridEnvConfig, rule: TargetRule) -> Result<Box<dyn Policy>> {
    let space = GridEnv::build(env_config, 0)?.space().clone();
    Ok(Box::new(TabularPolicy::build(space, policy_config(rule))?))
}

#[test_log::test]
fn sarsa_crosses_windy_gridworld() -> Result<()> {
    let config = GridEnvConfig::windy_gridworld();
    let ret = greedy_return_after_training(&config, tabular(&config, TargetRule::Sarsa)?, 500)?;
    assert!(ret > -30., "{}", ret);
    Ok(())
}

#[test_log::test]
fn q_learning_crosses_windy_gridworld_with_king_moves() -> Result<()> {
    let config = GridEnvConfig::windy_gridworld().king_moves();
    let ret =
        greedy_return_after_training(&config, tabular(&config, TargetRule::QLearning)?, 500)?;
    assert!(ret > -30., "{}", ret);
    Ok(())
}

#[test_log::test]
fn cliff_walk_avoids_the_cliff() -> Result<()> {
    let config = GridEnvConfig::cliff_walk();
    for &rule in &[TargetRule::QLearning, TargetRule::ExpectedSarsa] {
        let ret = greedy_return_after_training(&config, tabular(&config, rule)?, 500)?;
        // The path along the top row costs 16
        assert!(ret >= -16., "{:?}: {}", rule, ret);
    }
    Ok(())
}

#[test_log::test]
fn double_q_learns_corridor() -> Result<()> {
    let env = GridEnv::build(&GridEnvConfig::corridor(5), 0)?;
    let policy = DoubleQPolicy::build(env.space().clone(), policy_config(TargetRule::QLearning))?;
    let agent = Agent::new(0, Box::new(policy), env.start_state().clone())?;
    let mut trainer = Trainer::build(TrainerConfig::default(), env, vec![agent])?;
    trainer.train(0, 300, 20)?;

    let policy = trainer.agent(0)?.policy();
    for s in 0..4 {
        let value = policy.action_values(&State::from([s]))?[0];
        let expected = -(3 - s) as f32;
        assert!((value - expected).abs() < 1e-2, "{} != {}", value, expected);
    }
    Ok(())
}
