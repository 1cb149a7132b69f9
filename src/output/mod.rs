//! Terminal rendering of job results
//!
//! Every render event names an [`OutputKind`]; the [`Dispatcher`] drains the
//! event channel and hands each payload to the matching renderer. Response
//! envelopes are normalized once by [`JobEnvelope`] before any renderer
//! reads them.
//!
//! - [`envelope`] - shape detection for job status responses
//! - [`dispatch`] - the consumer loop
//! - [`status`] - in-place progress line
//! - [`renderers`] - one function per output kind

pub mod dispatch;
pub mod envelope;
pub mod renderers;
pub mod status;

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use dispatch::Dispatcher;
pub use envelope::{EnvelopeShape, JobEnvelope};
pub use renderers::Palette;
pub use status::StatusLine;

/// How a payload is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Pretty-printed raw payload
    Json,
    /// The job's return value as YAML
    Yaml,
    /// One-line progress indicator
    Status,
    /// Per-minion success markers
    Boolean,
    /// Per-state highstate report
    Highstate,
    /// Highstate as a table with durations and totals
    Profile,
}

impl OutputKind {
    /// Every kind, in the order `--out-list` prints them
    pub const ALL: [OutputKind; 6] = [
        OutputKind::Json,
        OutputKind::Yaml,
        OutputKind::Status,
        OutputKind::Boolean,
        OutputKind::Highstate,
        OutputKind::Profile,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputKind::Json => "json",
            OutputKind::Yaml => "yaml",
            OutputKind::Status => "status",
            OutputKind::Boolean => "boolean",
            OutputKind::Highstate => "highstate",
            OutputKind::Profile => "profile",
        }
    }

    /// Short description for `--out-list`
    pub fn description(self) -> &'static str {
        match self {
            OutputKind::Json => "raw response, pretty printed",
            OutputKind::Yaml => "return data as YAML (default)",
            OutputKind::Status => "progress line while a job runs",
            OutputKind::Boolean => "check or cross per minion (test.ping)",
            OutputKind::Highstate => "per-state report (state.apply, state.sls, state.highstate)",
            OutputKind::Profile => "state timings table with totals",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the output kind for a finished job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputPolicy {
    /// Set from `-o` or the config; wins over everything
    pub forced: Option<OutputKind>,
}

impl OutputPolicy {
    pub fn new(forced: Option<OutputKind>) -> Self {
        Self { forced }
    }

    /// Output kind for the given salt function name
    pub fn resolve(&self, function: &str) -> OutputKind {
        if let Some(forced) = self.forced {
            return forced;
        }
        match function {
            "test.ping" => OutputKind::Boolean,
            "state.sls" | "state.highstate" | "state.apply" => OutputKind::Highstate,
            _ => OutputKind::Yaml,
        }
    }
}
