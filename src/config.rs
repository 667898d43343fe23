use clap::Parser;
use std::path::PathBuf;

/// Roster and fair random-caller sidecar. Speaks newline-delimited JSON on
/// stdin/stdout; logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "rollcalld", version)]
pub struct Cli {
    /// Open this workspace at startup instead of waiting for `workspace.select`.
    #[arg(long)]
    pub workspace: Option<PathBuf>,

    /// Seed for the selection RNG (deterministic picking order).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn log_directive(&self) -> String {
        format!("rollcalld={}", self.log_level)
    }
}
