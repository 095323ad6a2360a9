//! Hashledger CLI application
//!
//! A command-line interface for the single-node proof-of-work ledger.

use clap::{Parser, Subcommand};
use hashledger::cli::{self, AppState};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hashledger")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A single-node proof-of-work transaction ledger", long_about = None)]
struct Cli {
    /// Data directory for chain storage
    #[arg(short, long, default_value = ".hashledger_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new chain
    Init {
        /// Mining difficulty (number of leading zero hex digits)
        #[arg(short, long)]
        difficulty: Option<u32>,
    },

    /// Run the seeded end-to-end scenario and save the resulting chain
    Demo,

    /// Display the chain block by block
    Show,

    /// Show the balance of an identity
    Balance {
        /// Participant identity
        #[arg(short, long)]
        identity: String,
    },

    /// Validate the chain
    Validate,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Init doesn't need full state
    if let Commands::Init { difficulty } = &cli.command {
        return cli::cmd_init(&cli.data_dir, *difficulty);
    }

    let mut state = AppState::new(cli.data_dir.clone())?;

    match cli.command {
        Commands::Init { .. } => unreachable!(),
        Commands::Demo => cli::cmd_demo(&mut state)?,
        Commands::Show => cli::cmd_show(&state)?,
        Commands::Balance { identity } => cli::cmd_balance(&state, &identity)?,
        Commands::Validate => cli::cmd_validate(&state)?,
    }

    Ok(())
}
