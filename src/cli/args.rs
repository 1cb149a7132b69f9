//! Command-line argument parsing for Salt Courier
//!
//! Flags come first; everything from the first positional token on is the
//! salt command, handed to the translator untouched.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::constants::DEFAULT_PROFILE;
use crate::output::OutputKind;

/// Salt Courier - run salt commands through salt-api
#[derive(Parser, Debug)]
#[command(
    name = "salt_courier",
    version,
    about = "Run salt commands against salt-api from any terminal",
    long_about = "Submits salt, salt-run and salt-wheel commands to salt-api, polls the job
until it completes and renders the results.

Example: salt_courier salt -G os:Debian pkg.version vim"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Profile from the config file to connect with
    #[arg(short, long, value_name = "NAME", default_value = DEFAULT_PROFILE)]
    pub profile: String,

    /// Force the output kind instead of choosing it from the function
    #[arg(short = 'o', long = "out", value_enum, value_name = "KIND")]
    pub output: Option<OutputKind>,

    /// List known output kinds and exit
    #[arg(long)]
    pub out_list: bool,

    /// Write rendered output to a file (not implemented)
    #[arg(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Number of job lookups before giving up waiting
    #[arg(short, long, value_name = "N")]
    pub timeout: Option<u32>,

    /// Logging level
    #[arg(short = 'L', long = "log", value_enum, value_name = "LEVEL", ignore_case = true)]
    pub log: Option<LogLevel>,

    /// Salt command, e.g. `salt '*' test.ping`
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        num_args = 0..
    )]
    pub command: Vec<String>,
}

/// Log levels accepted by `-L`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Critical | LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Logging level from `-L`, if given
    pub fn log_level(&self) -> Option<tracing::Level> {
        self.log.map(LogLevel::as_tracing)
    }

    /// True when no salt command was given
    pub fn has_command(&self) -> bool {
        !self.command.is_empty()
    }
}
