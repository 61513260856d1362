use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "chef-load",
    version,
    about = "Simulates a fleet of chef-client runs against a Chef Server to load-test it."
)]
pub struct LoadArgs {
    /// Configuration file to load (.toml or .json)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Number of nodes making chef-client runs (overrides the config file)
    #[arg(long, short = 'n')]
    pub nodes: Option<usize>,

    /// Number of chef-client runs each node should make, 0 value will make infinite runs
    #[arg(long, short = 'r')]
    pub runs: Option<u64>,

    /// Print out full sample configuration
    #[arg(long = "sample-config")]
    pub sample_config: bool,

    /// Enable debug logging (CHEF_LOAD_LOG / RUST_LOG take precedence)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
