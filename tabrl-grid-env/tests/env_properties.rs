use anyhow::Result;
use tabrl_core::{Env, Outcome, State, Transition};
use tabrl_grid_env::{Boundary, GridEnv, GridEnvConfig};

fn presets() -> Vec<GridEnvConfig> {
    vec![
        GridEnvConfig::corridor(5),
        GridEnvConfig::windy_gridworld(),
        GridEnvConfig::windy_gridworld().king_moves(),
        GridEnvConfig::windy_gridworld()
            .king_moves()
            .stochastic_wind(true),
        GridEnvConfig::windy_gridworld().boundary(Boundary::Redirect),
        GridEnvConfig::cliff_walk(),
        GridEnvConfig::cliff_walk().boundary(Boundary::Redirect),
    ]
}

#[test]
fn transitions_stay_in_the_grid() -> Result<()> {
    for config in presets() {
        let mut env = GridEnv::build(&config, 7)?;
        let states: Vec<State> = env.space().states().collect();
        for s in states.iter() {
            for a in 0..env.space().num_actions() {
                let tr = env.transition(s, a)?;
                assert!(env.space().contains(&tr.state), "{:?}: {} -> {}", config, s, tr.state);
                assert!(!env.is_hazard(&tr.state));
                if tr.outcome != Outcome::Moved {
                    assert_eq!(&tr.state, env.start_state());
                }
            }
        }
    }
    Ok(())
}

#[test]
fn clipped_grids_never_redirect() -> Result<()> {
    let mut env = GridEnv::build(&GridEnvConfig::windy_gridworld().king_moves(), 0)?;
    let states: Vec<State> = env.space().states().collect();
    for s in states.iter() {
        for a in 0..env.space().num_actions() {
            assert_eq!(env.transition(s, a)?.outcome, Outcome::Moved);
        }
    }
    Ok(())
}

#[test]
fn out_of_bounds_penalty_is_not_sticky() -> Result<()> {
    let config = GridEnvConfig::windy_gridworld().boundary(Boundary::Redirect);
    let mut env = GridEnv::build(&config, 0)?;
    let up = config.action_index("^").unwrap_or(0);
    let right = config.action_index(">").unwrap_or(3);

    let step = env.step(&State::from([0, 0]), up)?;
    assert_eq!(step.outcome, Outcome::OutOfBounds);
    assert_eq!(&step.state, env.start_state());
    assert_eq!(step.reward, config.rewards.out_of_bounds);

    let step = env.step(&step.state, right)?;
    assert_eq!(step.outcome, Outcome::Moved);
    assert_eq!(step.reward, config.rewards.normal);
    Ok(())
}

#[test]
fn reward_depends_only_on_the_transition() -> Result<()> {
    let config = GridEnvConfig::cliff_walk();
    let mut env = GridEnv::build(&config, 0)?;
    let right = config.action_index(">").unwrap_or(3);

    let into_cliff = env.transition(&State::from([3, 0]), right)?;
    assert_eq!(into_cliff.outcome, Outcome::Hazard);
    let ordinary = Transition::new(State::from([2, 4]), Outcome::Moved);
    let goal = Transition::new(State::from([3, 11]), Outcome::Moved);

    for _ in 0..3 {
        assert_eq!(env.reward(&into_cliff), config.rewards.hazard);
        assert_eq!(env.reward(&ordinary), config.rewards.normal);
        assert_eq!(env.reward(&goal), config.rewards.goal);
    }
    assert!(env.is_terminal(&goal.state));
    assert!(!env.is_terminal(&ordinary.state));
    Ok(())
}

#[test]
fn seeded_stochastic_wind_is_reproducible() -> Result<()> {
    let config = GridEnvConfig::windy_gridworld().stochastic_wind(true);
    let mut env1 = GridEnv::build(&config, 3)?;
    let mut env2 = GridEnv::build(&config, 3)?;
    let s = State::from([3, 4]);
    for a in (0..4).cycle().take(100) {
        assert_eq!(env1.transition(&s, a)?, env2.transition(&s, a)?);
    }
    Ok(())
}
