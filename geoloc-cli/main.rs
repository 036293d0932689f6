use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use geoloc_cli::manifest::Manifest;
use geoloc_cli::{report, visualize, PipelineConfig, Session};
use log::info;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "geoloc", version, about = "Estimate where a photo was taken from geotagged training images")]
struct Args {
    /// TOML manifest listing the test image and the training images
    #[arg(short, long)]
    manifest: PathBuf,

    /// Pipeline config (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minimum good matches for a training image to count as matching
    #[arg(short, long)]
    threshold: Option<usize>,

    #[arg(long)]
    max_keypoints: Option<usize>,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(long)]
    threads: Option<usize>,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// Save the test image with its keypoints drawn to this PNG
    #[arg(long)]
    draw_keypoints: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq)]
enum Command {
    /// Good-match count for every training image
    Scores,
    /// Training images whose score reaches the threshold
    Threshold,
    /// Mean location of the matching training images
    Estimate,
    /// Distance from the test image's own location to the estimate
    Distance,
    /// Every step in order
    Run,
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text(value));
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<PipelineConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(t) = args.threshold {
        config.matching.match_threshold = t;
    }
    if let Some(n) = args.max_keypoints {
        config.detector.max_keypoints = n;
    }
    if let Some(n) = args.threads {
        config.matching.n_threads = n;
    }
    config.validate()?;
    Ok(config)
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let config = build_config(&args)?;
    geoloc_core::init_thread_pool(config.matching.n_threads)?;
    info!("config: {}", config.summary());

    let manifest = Manifest::load(&args.manifest)?;
    let mut session = Session::new(config)?;
    session.select_test_image(manifest.load_test_image()?);
    session.select_training_images(manifest.load_training_images());

    if let (Some(path), Some(test)) = (&args.draw_keypoints, session.test_image()) {
        let kps = session.extractor().detect_keypoints(&test.image)?;
        visualize::save_keypoints(&test.image, &kps, path)?;
        info!("saved {} keypoints to {}", kps.len(), path.display());
    }

    match args.command {
        Command::Scores => {
            let scores = session.score_pairs()?;
            emit(args.json, &scores, report::format_scores)?;
        }
        Command::Threshold => {
            let scores = session.score_pairs()?;
            emit(args.json, &scores, report::format_threshold)?;
        }
        Command::Estimate => {
            let estimate = session.estimate_location()?;
            emit(args.json, estimate, report::format_estimate)?;
        }
        Command::Distance => {
            session.estimate_location()?;
            let distance = session.calculate_distance()?;
            emit(args.json, &distance, report::format_distance)?;
        }
        Command::Run => {
            let run = session.run()?;
            emit(args.json, &run, report::format_run)?;
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = try_main() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
