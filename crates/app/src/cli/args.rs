pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dtx")]
#[command(about = "Storage audits (PDP) and verifiable secret sharing")]
pub struct Args {
    /// Path to the dtx config directory (defaults to ~/.dtx)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Override the configured log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    #[command(subcommand)]
    pub command: crate::Command,
}
