use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use veriface::{config, Engine, FaceStore, JsonExtractor};

#[derive(Parser)]
#[command(name = "veriface")]
#[command(
    version,
    about = "Face verification and identification over precomputed embeddings"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register an identity from extraction output
    Register {
        /// Identity key to register under
        key: String,
        /// Path to the extraction collaborator's JSON output
        faces: PathBuf,
    },
    /// Decide whether two images show the same person
    Verify {
        /// Extraction output for the first image
        image_1: PathBuf,
        /// Extraction output for the second image
        image_2: PathBuf,
        /// Decision threshold (defaults to the configured one)
        #[arg(short, long)]
        threshold: Option<f32>,
    },
    /// Find the best-matching registered identity
    Identify {
        /// Extraction output for the query image
        faces: PathBuf,
        /// Decision threshold (defaults to the configured one)
        #[arg(short, long)]
        threshold: Option<f32>,
    },
    /// Remove all registered identities
    Purge,
    /// Open config file in editor
    Config,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(None)?;

    match cli.command {
        Commands::Register { key, faces } => {
            let engine = open_engine(&cfg);
            let payload = read_faces(&faces)?;
            let report = engine.register(&key, &payload)?;
            info!("✓ Identity registered: {}", key);
            print_report(&report)
        }
        Commands::Verify {
            image_1,
            image_2,
            threshold,
        } => {
            let engine = open_engine(&cfg);
            let payload_1 = read_faces(&image_1)?;
            let payload_2 = read_faces(&image_2)?;
            let report =
                engine.verify(&payload_1, &payload_2, threshold.unwrap_or(cfg.threshold))?;
            print_report(&report)
        }
        Commands::Identify { faces, threshold } => {
            let engine = open_engine(&cfg);
            let payload = read_faces(&faces)?;
            let report = engine.identify(&payload, threshold.unwrap_or(cfg.threshold))?;
            print_report(&report)
        }
        Commands::Purge => {
            let store = FaceStore::open(&cfg.store_dir);
            store.purge().context("Failed to purge identity store")?;
            info!("✓ All registered identities removed");
            Ok(())
        }
        Commands::Config => open_config(),
    }
}

fn open_engine(cfg: &config::Config) -> Engine<JsonExtractor> {
    Engine::new(JsonExtractor, FaceStore::open(&cfg.store_dir))
}

fn read_faces(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn print_report<T: serde::Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn open_config() -> Result<()> {
    let config_path = config::CONFIG_PATH.as_os_str();
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    info!("Opening config file: {:?}", config_path);

    let status = std::process::Command::new(editor)
        .arg(config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with non-zero status");
    }

    Ok(())
}
