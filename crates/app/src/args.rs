pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ssb-keys")]
#[command(about = "Manage an ssb identity: sign, verify, box and unbox messages")]
#[command(version)]
pub struct Args {
    /// Path to the ssb config directory (defaults to ~/.ssb)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Path to the identity key file (overrides `keyfile` in config.toml)
    #[arg(long, global = true)]
    pub keys_path: Option<PathBuf>,

    /// Log level written to stderr (overrides `log_level` in config.toml)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}
