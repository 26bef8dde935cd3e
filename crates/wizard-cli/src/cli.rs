//! Command-line arguments for the `wizard` binary.

use std::path::PathBuf;

use clap::Parser;

/// Walk through the sample account-setup wizard in the terminal.
#[derive(Parser, Debug)]
#[command(name = "wizard", version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "WIZARD_CONFIG", default_value = "wizard.toml")]
    pub config: PathBuf,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long)]
    pub otel: bool,

    /// Log every step transition at info level.
    #[arg(long)]
    pub debug: bool,

    /// Detailed output (-v for engine debug logs, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter directives: verbosity flags override the configured filter.
    pub fn log_filter<'a>(&self, configured: &'a str) -> &'a str {
        match self.verbose {
            0 => configured,
            1 => "info,wizard_core=debug",
            _ => "trace",
        }
    }
}
