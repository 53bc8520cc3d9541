use super::{Record, Recorder};

/// A recorder that ignores any record.
#[derive(Default, Debug, Clone, Copy)]
pub struct NullRecorder {}

impl NullRecorder {
    /// Constructs the recorder.
    pub fn new() -> Self {
        Self {}
    }
}

impl Recorder for NullRecorder {
    /// Discard the given record.
    fn write(&mut self, _record: Record) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::TabRlError, Agent, Configurable, DiscreteSpace, Env, Outcome, State,
        TabularPolicy, TabularPolicyConfig, Trainer, TrainerConfig, Transition,
    };

    struct Stay(DiscreteSpace, State);

    impl Env for Stay {
        fn space(&self) -> &DiscreteSpace {
            &self.0
        }

        fn start_state(&self) -> &State {
            &self.1
        }

        fn transition(&mut self, s: &State, _a: usize) -> Result<Transition, TabRlError> {
            Ok(Transition::new(s.clone(), Outcome::Moved))
        }

        fn reward(&self, _tr: &Transition) -> f32 {
            -1.
        }

        fn is_terminal(&self, _s: &State) -> bool {
            false
        }
    }

    #[test]
    fn test_trainer_with_null_recorder() {
        let space = DiscreteSpace::new(vec![2], vec![vec![0]]).unwrap();
        let policy = TabularPolicy::build(space.clone(), TabularPolicyConfig::default()).unwrap();
        let agent = Agent::new(0, Box::new(policy), State::from([1])).unwrap();
        let env = Stay(space, State::from([1]));
        let mut trainer = Trainer::build(TrainerConfig::default(), env, vec![agent])
            .unwrap()
            .with_recorder(Box::new(NullRecorder::new()));

        let episode = trainer.run_episode(5).unwrap();
        assert!(!episode.terminated);
        assert_eq!(episode.total_return(0), Some(-5.));
    }
}
