// Hyphae style image generator.
//
// Spores wander over a floating point canvas, leave ink where they pass
// and occasionally branch, slowly building up organic looking growth.
// An optional guidance image can steer them towards its bright areas.

pub mod canvas;
pub mod config;
pub mod error;
pub mod guidance;
pub mod simulator;
pub mod spore;

pub use canvas::{Canvas, ChannelMask, Pixel};
pub use config::Config;
pub use error::{ConfigError, SimError};
pub use guidance::GuidanceRaster;
pub use simulator::{Run, Simulator};
pub use spore::{Sense, Spore};

// Canvas sides must stay below this.
pub const MAX_IMAGE_SIZE: u32 = u16::MAX as u32;
