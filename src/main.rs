use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use masterpiece_runtime::runtime::{self, Options};

/// Competition robot runtime on a simulated hub
#[derive(Parser)]
#[command(name = "masterpiece")]
#[command(about = "Run selector and competition runs for the MasterPiece robot", long_about = None)]
#[command(version)]
struct Cli {
    /// File backing the hub's persistent storage (field config)
    #[arg(long)]
    storage: Option<PathBuf>,

    /// JSON file overriding the compiled-in tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulation speed relative to the wall clock (0 = as fast as possible)
    #[arg(long, default_value_t = 1.0)]
    realtime: f32,

    /// Launch this run once without the menu, then exit
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    run: Option<u8>,

    /// Default log level; RUST_LOG directives still apply
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl From<Cli> for Options {
    fn from(cli: Cli) -> Self {
        Self {
            storage: cli.storage,
            config: cli.config,
            realtime: cli.realtime,
            run: cli.run,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = match cli.log_level.parse() {
        Ok(directive) => directive,
        Err(e) => {
            eprintln!("Invalid log level {:?}: {}", cli.log_level, e);
            std::process::exit(2);
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level))
        .init();

    if let Err(e) = runtime::run(cli.into()).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
