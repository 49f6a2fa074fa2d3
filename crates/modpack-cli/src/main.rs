//! modpack-cli - Command-line interface for the modpack archiving tool
//!
//! This crate provides the headless CLI over modpack-core:
//! - Packing a mod folder into a distributable artifact
//! - Inspecting which top-level folders are essential vs optional
//! - Selectively installing an artifact into a target directory

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use modpack_core::{pack, Artifact, CompressionMode, NoProgress, ProgressCallback};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Progress callback that drives an indicatif bar
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/100 {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_with_message("Packing complete");
    }
}

impl ProgressCallback for BarProgress {
    fn on_progress(&mut self, percent: u32) {
        self.bar.set_position(percent as u64);
    }
}

/// modpack - selective mod pack archiver
///
/// Packages a directory of mod folders into a single archive whose
/// top-level folders are marked essential or optional, and installs such
/// archives with a per-run folder selection.
#[derive(Parser)]
#[command(name = "modpack")]
#[command(author, version, about = "Selective mod pack archiver", long_about = None)]
struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show progress bar during operations
    #[arg(long, global = true)]
    progress: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a mod folder into an artifact
    Pack {
        /// Source directory containing the top-level mod folders
        source: PathBuf,

        /// Output archive file
        #[arg(short, long)]
        output: PathBuf,

        /// Top-level folder to mark as essential (repeatable)
        #[arg(short, long = "essential", value_name = "NAME")]
        essential: Vec<String>,

        /// Compression mode (store, deflate, zstd)
        #[arg(short, long, default_value = "deflate")]
        mode: String,
    },

    /// Show the essential/optional folder partition of an artifact
    Inspect {
        /// Artifact file to inspect
        artifact: PathBuf,

        /// Output format as JSON
        #[arg(long)]
        json: bool,
    },

    /// Install an artifact into a destination directory
    Unpack {
        /// Artifact file to install
        artifact: PathBuf,

        /// Destination directory
        destination: PathBuf,

        /// Optional folder to include (repeatable)
        #[arg(short, long = "include", value_name = "NAME", conflicts_with = "all")]
        include: Vec<String>,

        /// Include every optional folder
        #[arg(long)]
        all: bool,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let result = run();

    match result {
        Ok(_) => process::exit(0),
        Err(e) => {
            error!("Error: {}", e);

            let exit_code = map_error_to_exit_code(&e);
            process::exit(exit_code);
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Pack {
            source,
            output,
            essential,
            mode,
        } => {
            info!("Packing {:?} into {:?}", source, output);

            let mode: CompressionMode = mode.parse()?;
            let essential_names: BTreeSet<String> = essential.into_iter().collect();

            let artifact = if cli.progress {
                let mut progress = BarProgress::new();
                let artifact = pack(&source, &output, &essential_names, mode, &mut progress)?;
                progress.finish();
                artifact
            } else {
                pack(&source, &output, &essential_names, mode, &mut NoProgress)?
            };

            let folders = artifact.folders()?;
            info!(
                "Packing complete: {} essential, {} optional folder(s)",
                folders.essential.len(),
                folders.optional.len()
            );
        }

        Commands::Inspect { artifact, json } => {
            info!("Inspecting artifact: {:?}", artifact);

            let artifact = Artifact::open(&artifact)?;
            let folders = artifact.folders()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&folders)?);
            } else {
                println!("Essential folders (always installed):");
                for name in &folders.essential {
                    println!("  {}", name);
                }
                println!("Optional folders:");
                for name in &folders.optional {
                    println!("  {}", name);
                }
            }

            info!("Inspection complete");
        }

        Commands::Unpack {
            artifact,
            destination,
            include,
            all,
        } => {
            info!("Installing {:?} to {:?}", artifact, destination);

            let artifact = Artifact::open(&artifact)?;
            let folders = artifact.folders()?;

            let selected: BTreeSet<String> = if all {
                folders.optional.clone()
            } else {
                let selected: BTreeSet<String> = include.into_iter().collect();
                for name in selected.difference(&folders.optional) {
                    warn!("--include {} matches no optional folder, ignoring", name);
                }
                selected
            };

            artifact.unpack(&selected, &destination)?;
            info!("Installation complete");
        }
    }

    Ok(())
}

/// Map errors to exit codes:
/// - 0: Success
/// - 1: General error
/// - 2: IO error (source or destination)
/// - 3: Invalid arguments
/// - 4: Malformed artifact
fn map_error_to_exit_code(err: &anyhow::Error) -> i32 {
    if let Some(core_err) = err.downcast_ref::<modpack_core::Error>() {
        match core_err {
            modpack_core::Error::Io(_) => 2,
            modpack_core::Error::Source { .. } => 2,
            modpack_core::Error::Destination { .. } => 2,
            modpack_core::Error::InvalidPath(_) => 3,
            modpack_core::Error::UnsupportedMode(_) => 3,
            modpack_core::Error::Structural(_) => 4,
            modpack_core::Error::Manifest(_) => 4,
            modpack_core::Error::Zip(_) => 4,
        }
    } else if err.is::<std::io::Error>() {
        2
    } else {
        1
    }
}
