// Simulation parameters. Everything here may be changed between runs;
// a run takes a snapshot of the values when it starts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SimError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Distance travelled per tick. Sighted spores slow down from here.
    pub speed : f64,
    // Scale of the random heading change applied every tick.
    pub angle_change_modifier : f64,
    // Number of ticks in a run.
    pub iterations : usize,
    // Chance per tick that one spore branches.
    pub split_probability : f64,
    // Ink deposited per tick at full weight.
    pub pen_intensity : f32,
    // Spores placed on the canvas when a run starts.
    pub initial_spores : usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            speed : 0.2,
            angle_change_modifier : 0.5,
            iterations : 10_000,
            split_probability : 0.0025,
            pen_intensity : 8.0,
            initial_spores : 1,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path : P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path : path.to_path_buf(),
            source,
        })?;
        let config : Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(self : &Self, path : P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml).map_err(|source| ConfigError::Io {
            path : path.to_path_buf(),
            source,
        })
    }

    pub fn validate(self : &Self) -> Result<(), SimError> {
        if self.initial_spores == 0 {
            return Err(SimError::InvalidConfig("initial_spores must be at least 1".to_string()));
        }
        if !self.speed.is_finite() {
            return Err(SimError::InvalidConfig("speed must be finite".to_string()));
        }
        if !self.angle_change_modifier.is_finite() {
            return Err(SimError::InvalidConfig("angle_change_modifier must be finite".to_string()));
        }
        if !self.pen_intensity.is_finite() {
            return Err(SimError::InvalidConfig("pen_intensity must be finite".to_string()));
        }
        if !(0.0..=1.0).contains(&self.split_probability) {
            return Err(SimError::InvalidConfig(
                "split_probability must be between 0.0 and 1.0".to_string(),
            ));
        }
        Ok(())
    }
}
