//! Configuration of [`Trainer`](super::Trainer).
use crate::buffer::MAX_BUFFER_SIZE;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The maximum number of entries of the transition buffer of each agent.
    pub buffer_capacity: usize,

    /// Step budget of an episode in [`Trainer::train_with_config`](super::Trainer::train_with_config).
    pub max_steps_per_episode: usize,

    /// Number of episodes in [`Trainer::train_with_config`](super::Trainer::train_with_config).
    pub episodes: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: MAX_BUFFER_SIZE,
            max_steps_per_episode: 100,
            episodes: 1,
        }
    }
}

impl TrainerConfig {
    /// Sets the capacity of transition buffers.
    pub fn buffer_capacity(mut self, v: usize) -> Self {
        self.buffer_capacity = v;
        self
    }

    /// Sets the step budget of an episode.
    pub fn max_steps_per_episode(mut self, v: usize) -> Self {
        self.max_steps_per_episode = v;
        self
    }

    /// Sets the number of training episodes.
    pub fn episodes(mut self, v: usize) -> Self {
        self.episodes = v;
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_trainer_config() -> Result<()> {
        let config = TrainerConfig::default()
            .buffer_capacity(1000)
            .max_steps_per_episode(20)
            .episodes(200);

        let dir = TempDir::new("trainer_config")?;
        let path = dir.path().join("trainer_config.yaml");
        config.save(&path)?;
        let config_ = TrainerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_default() {
        let config = TrainerConfig::default();
        assert_eq!(config.buffer_capacity, 32767);
        assert_eq!(config.max_steps_per_episode, 100);
        assert_eq!(config.episodes, 1);
    }
}
