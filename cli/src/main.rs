use anyhow::Result;
use clap::{Parser, Subcommand};
use dac_crypto::Hash;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::{expand_path, Config, DEFAULT_CONFIG_PATH};

#[derive(Parser)]
#[command(name = "dac-node")]
#[command(about = "Data Availability Committee client", version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the committee registered on L1
    Committee,

    /// Resolve the L2 data of a batch by its keccak hash
    Fetch {
        #[arg(long)]
        batch: u64,

        /// Expected keccak256 of the batch data
        #[arg(long)]
        hash: Hash,

        /// Skip the trusted sequencer (this node is the trusted sequencer)
        #[arg(long)]
        trusted_sequencer_mode: bool,
    },

    /// Collect committee signatures over a sequence of batches
    Sign {
        /// JSON array of batches
        #[arg(long, value_name = "FILE")]
        sequence: PathBuf,
    },

    /// Load batches into the local store
    Import {
        /// JSON array of stored batches
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(expand_path(DEFAULT_CONFIG_PATH)));
    let config = Config::load(&config_path)?;

    match cli.command {
        Commands::Committee => commands::committee(&config).await,
        Commands::Fetch {
            batch,
            hash,
            trusted_sequencer_mode,
        } => {
            let mode = trusted_sequencer_mode || config.sequencer.trusted_sequencer_mode;
            commands::fetch(&config, batch, hash, mode).await
        }
        Commands::Sign { sequence } => commands::sign(&config, &sequence).await,
        Commands::Import { file } => commands::import(&config, &file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::try_parse_from([
            "dac-node",
            "--config",
            "/etc/dac.toml",
            "fetch",
            "--batch",
            "12",
            "--hash",
            "0x0000000000000000000000000000000000000000000000000000000000000007",
            "--trusted-sequencer-mode",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/etc/dac.toml")));
        match cli.command {
            Commands::Fetch {
                batch,
                hash,
                trusted_sequencer_mode,
            } => {
                assert_eq!(batch, 12);
                assert_eq!(hash[31], 7);
                assert!(trusted_sequencer_mode);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_bad_hash_rejected() {
        let args = ["dac-node", "fetch", "--batch", "1", "--hash", "0x12"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
