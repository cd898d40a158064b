use clap::{Parser, Subcommand};

mod rocks;

#[allow(unused_imports)]
use tracing::{debug, error, info, trace, warn};

#[derive(Parser)]
#[clap(author, version, long_version = sedb_core::build_info::LONG_VERSION, about = "sedb CLI utility")]
#[clap(propagate_version = true)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embedded RocksDB store commands
    Rocks(rocks::Command),
}

fn main() {
    // Logs go to stderr; stdout carries command output only.
    sedb_core::telemetry::init_dev_subscriber_with_env_filter();

    let cli = Cli::parse();

    debug!("starting");

    match cli.command {
        Commands::Rocks(args) => {
            rocks::run(&args);
        }
    }
}
