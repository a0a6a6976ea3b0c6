use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hyphae::{Config, GuidanceRaster, Simulator};

#[derive(Parser)]
#[command(name = "hyphae")]
#[command(version)]
#[command(about = "Grow hyphae-like images from wandering spores")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an image
    Generate {
        /// Where to write the PNG
        #[arg(short, long, default_value = "hyphae.png")]
        output: PathBuf,

        /// Configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Guidance image; sets the canvas size and makes spores sighted
        #[arg(long)]
        overlay: Option<PathBuf>,

        #[arg(long, default_value = "800")]
        width: u32,

        #[arg(long, default_value = "600")]
        height: u32,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        iterations: Option<usize>,

        #[arg(long)]
        speed: Option<f64>,

        #[arg(long)]
        angle_change_modifier: Option<f64>,

        #[arg(long)]
        split_probability: Option<f64>,

        #[arg(long)]
        pen_intensity: Option<f32>,

        #[arg(long)]
        initial_spores: Option<usize>,
    },

    /// Write the default configuration file
    Init {
        #[arg(short, long, default_value = "hyphae.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            output,
            config,
            overlay,
            width,
            height,
            seed,
            iterations,
            speed,
            angle_change_modifier,
            split_probability,
            pen_intensity,
            initial_spores,
        } => {
            let mut config = match config {
                Some(path) => Config::from_file(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => Config::default(),
            };
            if let Some(v) = iterations {
                config.iterations = v;
            }
            if let Some(v) = speed {
                config.speed = v;
            }
            if let Some(v) = angle_change_modifier {
                config.angle_change_modifier = v;
            }
            if let Some(v) = split_probability {
                config.split_probability = v;
            }
            if let Some(v) = pen_intensity {
                config.pen_intensity = v;
            }
            if let Some(v) = initial_spores {
                config.initial_spores = v;
            }

            let mut sim = match seed {
                Some(seed) => Simulator::with_seed(config, seed),
                None => Simulator::new(config),
            };

            let canvas = match overlay {
                Some(path) => {
                    let img = image::open(&path)
                        .with_context(|| format!("opening overlay {}", path.display()))?
                        .to_rgb8();
                    sim.bind_guidance(GuidanceRaster::new(img));
                    sim.generate_guided()?
                }
                None => sim.generate(width, height)?,
            };

            canvas
                .to_display_raster()
                .save(&output)
                .with_context(|| format!("saving {}", output.display()))?;
            log::info!("wrote {}", output.display());
        }
        Commands::Init { output } => {
            Config::default()
                .save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Default configuration written to {}", output.display());
        }
    }

    Ok(())
}
