// Errors raised while setting up a run. Nothing fails once the tick
// loop has started.

use std::path::PathBuf;

use thiserror::Error;

use crate::spore::Sense;

#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("fixed-size run requested while a guidance raster is bound")]
    GuidanceBound,
    #[error("guided run requested but no guidance raster is bound")]
    GuidanceMissing,
    #[error("canvas size {width}x{height} is outside 1..{}", crate::MAX_IMAGE_SIZE)]
    InvalidDimensions { width : u32, height : u32 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("run needs at least one spore")]
    EmptyPopulation,
    #[error("seed spore at ({x}, {y}) lies outside the canvas")]
    SeedOutOfBounds { x : f64, y : f64 },
    #[error("this run mode only takes {expected:?} spores")]
    SenseMismatch { expected : Sense },
}

// Loading or saving a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path : PathBuf,
        #[source]
        source : std::io::Error,
    },
    #[error("malformed configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Invalid(#[from] SimError),
}
