//! # CLI Interface
//!
//! Command-line argument structure for `vera-node` using `clap` derive.
//! Four subcommands: `run`, `init`, `export`, and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use vera_ledger::config::{DEFAULT_BATCH_SIZE, DEFAULT_METRICS_PORT, DEFAULT_RPC_PORT};

/// VERA ballot-intake node.
///
/// Hosts a hash-chained vote ledger behind an HTTP API: accepts ballots,
/// enforces one submission per voter identity, serves recent blocks and
/// chain validity, and exports the full chain as CSV.
#[derive(Parser, Debug)]
#[command(
    name = "vera-node",
    about = "VERA ballot-intake node",
    version,
    propagate_version = true
)]
pub struct VeraNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the VERA node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the ballot-intake service.
    Run(RunArgs),
    /// Initialize a data directory — seals and persists the genesis block.
    Init(InitArgs),
    /// Export the persisted chain as CSV, offline.
    Export(ExportArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the data directory where sealed blocks are stored.
    ///
    /// Created on first run if it does not exist.
    #[arg(long, short = 'd', env = "VERA_DATA_DIR", default_value = "./vera-data")]
    pub data_dir: PathBuf,

    /// Port for the ballot-intake HTTP API.
    #[arg(long, env = "VERA_RPC_PORT", default_value_t = DEFAULT_RPC_PORT)]
    pub rpc_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "VERA_METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// Entries accumulated before a block is sealed.
    #[arg(long, env = "VERA_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Run without persistence: blocks live only in memory.
    ///
    /// A restart loses the whole chain. Demo and test use only.
    #[arg(long)]
    pub volatile: bool,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "VERA_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Path to the data directory to initialize.
    #[arg(long, short = 'd', env = "VERA_DATA_DIR", default_value = "./vera-data")]
    pub data_dir: PathBuf,
}

/// Arguments for the `export` subcommand.
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Path to the data directory holding the persisted chain.
    #[arg(long, short = 'd', env = "VERA_DATA_DIR", default_value = "./vera-data")]
    pub data_dir: PathBuf,

    /// Write the CSV here instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        VeraNodeCli::command().debug_assert();
    }

    #[test]
    fn run_defaults_match_config() {
        let cli = VeraNodeCli::parse_from(["vera-node", "run"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.rpc_port, DEFAULT_RPC_PORT);
        assert_eq!(args.metrics_port, DEFAULT_METRICS_PORT);
        assert_eq!(args.batch_size, DEFAULT_BATCH_SIZE);
        assert!(!args.volatile);
    }
}
