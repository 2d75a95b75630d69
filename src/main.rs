// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use retrocam::config::Config;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "retrocam")]
#[command(about = "Retro point-and-shoot camera for the terminal")]
#[command(version = retrocam::constants::app_info::version())]
#[command(subcommand_required = false)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run in terminal mode (renders the camera to the terminal)
    Terminal,

    /// List available cameras
    List,

    /// List the filter presets
    Filters,

    /// Take a photo through the shot pipeline
    Shoot {
        /// Filter preset name or label (from 'retrocam filters')
        #[arg(short, long)]
        filter: Option<String>,

        /// Output file or directory (default: ~/Pictures/RetroCam)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Shoot from a still image instead of the camera
        #[arg(long)]
        still: Option<PathBuf>,
    },

    /// Apply a filter to an existing image
    Develop {
        /// Image to develop
        input: PathBuf,

        /// Preset name or filter chain, e.g. "sepia(0.6) contrast(90%)"
        #[arg(short, long, default_value = "standard")]
        filter: String,

        /// Output file or directory (default: ~/Pictures/RetroCam)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let terminal_mode = matches!(cli.command, None | Some(Commands::Terminal));

    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=retrocam=debug, RUST_LOG=info
    init_logging(terminal_mode);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    match cli.command {
        None | Some(Commands::Terminal) => {
            let config_path = cli.config.clone().or_else(Config::path);
            retrocam::terminal::run(config, config_path)
        }
        Some(Commands::List) => cli::list_cameras(&config),
        Some(Commands::Filters) => {
            cli::list_filters();
            Ok(())
        }
        Some(Commands::Shoot {
            filter,
            output,
            still,
        }) => cli::shoot(config, filter, output, still),
        Some(Commands::Develop {
            input,
            filter,
            output,
        }) => cli::develop(&config, &input, &filter, output),
    }
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
}

/// Log to stderr, or to a file while the terminal UI owns the screen
fn init_logging(terminal_mode: bool) {
    let log_file = terminal_mode
        .then(|| {
            let dir = dirs::cache_dir()?.join("retrocam");
            std::fs::create_dir_all(&dir).ok()?;
            std::fs::File::create(dir.join("retrocam.log")).ok()
        })
        .flatten();

    match log_file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .init(),
        // No log file: drop output rather than corrupt the screen
        None if terminal_mode => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::sink)
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_target(true)
            .with_level(true)
            .init(),
    }
}
