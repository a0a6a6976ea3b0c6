// Drives a whole image generation: seeds the spores, runs the ticks and
// hands back the finished canvas.
//
// A run either has a fixed size (blind spores) or takes its size from
// the bound guidance raster (sighted spores). Asking for the wrong one
// is an error rather than a fallback.

use std::f64::consts::TAU;

use log::{debug, info};
use rand::{Rng, SeedableRng};

use crate::canvas::{Canvas, ChannelMask};
use crate::config::Config;
use crate::error::SimError;
use crate::guidance::GuidanceRaster;
use crate::spore::{RunContext, Sense, SimRng, Spore};
use crate::MAX_IMAGE_SIZE;

pub struct Simulator {
    rng : SimRng,
    config : Config,
    guidance : Option<GuidanceRaster>,
}

// A run in progress. Each `step` is one complete tick; the canvas can be
// taken out between any two ticks.
pub struct Run<'a> {
    ctx : RunContext<'a>,
    spores : Vec<Spore>,
}

impl Simulator {
    pub fn new(config : Config) -> Simulator {
        Simulator {
            rng : SimRng::from_entropy(),
            config,
            guidance : None,
        }
    }

    pub fn with_seed(config : Config, seed : u64) -> Simulator {
        Simulator {
            rng : SimRng::seed_from_u64(seed),
            config,
            guidance : None,
        }
    }

    pub fn config(self : &Self) -> &Config {
        &self.config
    }

    pub fn config_mut(self : &mut Self) -> &mut Config {
        &mut self.config
    }

    pub fn guidance(self : &Self) -> Option<&GuidanceRaster> {
        self.guidance.as_ref()
    }

    pub fn bind_guidance(self : &mut Self, raster : GuidanceRaster) {
        self.guidance = Some(raster);
    }

    pub fn unbind_guidance(self : &mut Self) -> Option<GuidanceRaster> {
        self.guidance.take()
    }

    // Fixed-size mode, run to completion.
    pub fn generate(self : &mut Self, width : u32, height : u32) -> Result<Canvas, SimError> {
        Ok(self.start(width, height)?.run_to_end())
    }

    // Guidance-bound mode, run to completion.
    pub fn generate_guided(self : &mut Self) -> Result<Canvas, SimError> {
        Ok(self.start_guided()?.run_to_end())
    }

    pub fn start(self : &mut Self, width : u32, height : u32) -> Result<Run<'_>, SimError> {
        if self.guidance.is_some() {
            return Err(SimError::GuidanceBound);
        }
        self.seed_run(width, height, Sense::Blind)
    }

    pub fn start_guided(self : &mut Self) -> Result<Run<'_>, SimError> {
        let (width, height) = match &self.guidance {
            Some(raster) => (raster.width(), raster.height()),
            None => return Err(SimError::GuidanceMissing),
        };
        self.seed_run(width, height, Sense::Sighted)
    }

    // Fixed-size mode with caller placed spores instead of random ones.
    pub fn start_with_spores(self : &mut Self, width : u32, height : u32, spores : Vec<Spore>) -> Result<Run<'_>, SimError> {
        if self.guidance.is_some() {
            return Err(SimError::GuidanceBound);
        }
        self.check_setup(width, height)?;
        self.begin(width, height, spores)
    }

    // Guided mode with caller placed spores.
    pub fn start_guided_with_spores(self : &mut Self, spores : Vec<Spore>) -> Result<Run<'_>, SimError> {
        let (width, height) = match &self.guidance {
            Some(raster) => (raster.width(), raster.height()),
            None => return Err(SimError::GuidanceMissing),
        };
        self.check_setup(width, height)?;
        self.begin(width, height, spores)
    }

    fn check_setup(self : &Self, width : u32, height : u32) -> Result<(), SimError> {
        check_dimensions(width, height)?;
        self.config.validate()
    }

    fn seed_run(self : &mut Self, width : u32, height : u32, sense : Sense) -> Result<Run<'_>, SimError> {
        self.check_setup(width, height)?;
        let spores = (0..self.config.initial_spores)
            .map(|_| {
                let x = self.rng.gen_range(0..width) as f64;
                let y = self.rng.gen_range(0..height) as f64;
                let angle = self.rng.gen::<f64>() * TAU;
                Spore::new(sense, x, y, angle, self.config.speed, ChannelMask::ALL)
            })
            .collect();
        self.begin(width, height, spores)
    }

    // Setup has been checked; only the population is left to vet.
    fn begin(self : &mut Self, width : u32, height : u32, spores : Vec<Spore>) -> Result<Run<'_>, SimError> {
        if spores.is_empty() {
            return Err(SimError::EmptyPopulation);
        }
        // The run mode decides which kind of spore may take part.
        let expected = if self.guidance.is_some() { Sense::Sighted } else { Sense::Blind };
        if spores.iter().any(|s| s.sense() != expected) {
            return Err(SimError::SenseMismatch { expected });
        }
        if let Some(stray) = spores.iter().find(|s| !s.contained_in(width, height)) {
            let p = stray.position();
            return Err(SimError::SeedOutOfBounds { x : p.x, y : p.y });
        }

        info!(
            "starting {}x{} run ({}): {} spores, {} iterations, speed {}, split probability {}",
            width,
            height,
            if self.guidance.is_some() { "guided" } else { "fixed size" },
            spores.len(),
            self.config.iterations,
            self.config.speed,
            self.config.split_probability
        );

        Ok(Run {
            ctx : RunContext {
                canvas : Canvas::new(width, height),
                config : &self.config,
                rng : &mut self.rng,
                guidance : self.guidance.as_ref(),
                tick : 0,
            },
            spores,
        })
    }
}

fn check_dimensions(width : u32, height : u32) -> Result<(), SimError> {
    if width == 0 || height == 0 || width >= MAX_IMAGE_SIZE || height >= MAX_IMAGE_SIZE {
        return Err(SimError::InvalidDimensions { width, height });
    }
    Ok(())
}

impl<'a> Run<'a> {
    // Ticks completed so far.
    pub fn tick(self : &Self) -> usize {
        self.ctx.tick
    }

    pub fn is_finished(self : &Self) -> bool {
        self.ctx.tick >= self.ctx.config.iterations
    }

    pub fn population(self : &Self) -> &[Spore] {
        &self.spores
    }

    pub fn canvas(self : &Self) -> &Canvas {
        &self.ctx.canvas
    }

    // Every spore acts in population order, then maybe one branches. A
    // branch added here first moves on the next tick.
    pub fn step(self : &mut Self) {
        for spore in self.spores.iter_mut() {
            spore.tick(&mut self.ctx);
        }

        if self.ctx.rng.gen::<f64>() < self.ctx.config.split_probability {
            let parent = self.ctx.rng.gen_range(0..self.spores.len());
            let child = self.spores[parent].split(self.ctx.config);
            self.spores.push(child);
            debug!(
                "tick {}: spore {} split, population {}",
                self.ctx.tick,
                parent,
                self.spores.len()
            );
        }

        self.ctx.tick += 1;
    }

    pub fn run_to_end(mut self : Self) -> Canvas {
        while !self.is_finished() {
            self.step();
        }
        info!(
            "run finished after {} ticks with {} spores",
            self.ctx.tick,
            self.spores.len()
        );
        self.ctx.canvas
    }

    // Stop early. The canvas holds every completed tick.
    pub fn finish(self : Self) -> Canvas {
        self.ctx.canvas
    }
}
