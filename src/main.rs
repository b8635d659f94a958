//! Command-line smoother for recorded landmark streams.

use anyhow::{Context, Result};
use clap::Parser;
use face_landmark_tracker::{
    config::{Config, InitPolicy, OutputPolicy},
    filters::create_filter,
    frames::{read_frames, write_frame},
};
use log::{debug, info};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Landmark frame file (one frame of 136 values per line, `-` for no detection)
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write smoothed frames (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Filter type (kalman, none); overrides the configuration file
    #[arg(short, long)]
    filter: Option<String>,

    /// State seeding (zero, first_detection); overrides the configuration file
    #[arg(long)]
    init: Option<InitPolicy>,

    /// Estimate to emit per frame (corrected, predicted); overrides the configuration file
    #[arg(long)]
    emit: Option<OutputPolicy>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let config = build_config(&args)?;
    run(&args, &config)
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(filter) = &args.filter {
        config.filter.kind.clone_from(filter);
    }
    if let Some(init) = args.init {
        config.tracker.initialization = init;
    }
    if let Some(emit) = args.emit {
        config.tracker.output = emit;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args, config: &Config) -> Result<()> {
    let reader = BufReader::new(
        File::open(&args.input).with_context(|| format!("opening {}", args.input.display()))?,
    );
    let frames = read_frames(reader).with_context(|| format!("reading {}", args.input.display()))?;
    info!("Read {} frames from {}", frames.len(), args.input.display());

    let mut filter = create_filter(&config.filter.kind, &config.tracker)?;
    info!("Smoothing with {}", filter.name());

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    for (index, frame) in frames.iter().enumerate() {
        if frame.is_none() {
            debug!("Frame {index}: no detection");
        }
        let smoothed = filter
            .apply(frame.as_ref())
            .with_context(|| format!("smoothing frame {index}"))?;
        write_frame(&mut writer, &smoothed)?;
    }
    writer.flush()?;

    info!("Wrote {} smoothed frames", frames.len());
    Ok(())
}
