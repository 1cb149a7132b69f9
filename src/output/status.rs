//! In-place status line shown while a job is polled
//!
//! Uses an indicatif spinner on stderr so it never mixes with rendered
//! results on stdout. When stderr is not a terminal the spinner is hidden
//! and updates only reach the debug log.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use super::envelope::JobEnvelope;
use crate::constants::output;

/// Non-scrolling progress indicator
#[derive(Debug)]
pub struct StatusLine {
    bar: ProgressBar,
    last_message: Option<String>,
}

impl StatusLine {
    /// Spinner on stderr when it is a terminal, hidden otherwise
    pub fn new() -> Self {
        if atty::is(atty::Stream::Stderr) {
            Self::spinner()
        } else {
            Self::hidden()
        }
    }

    /// Animated spinner
    pub fn spinner() -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(output::SPINNER_FRAMES);
        bar.set_style(style);
        bar.set_message("Waiting ...");
        bar.enable_steady_tick(Duration::from_millis(output::SPINNER_TICK_MS));
        Self {
            bar,
            last_message: None,
        }
    }

    /// Status line that draws nothing
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            last_message: None,
        }
    }

    /// Replace the status text
    pub fn update(&mut self, message: String) {
        debug!("status: {}", message);
        self.bar.set_message(message.clone());
        self.last_message = Some(message);
    }

    /// Remove the line before final output is printed
    pub fn clear(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }

    /// Most recent status text
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StatusLine {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Progress text for a job status response
pub fn status_message(envelope: &JobEnvelope<'_>) -> String {
    let jid = envelope.jid().unwrap_or("unknown");
    if envelope.has_error() {
        format!("waiting on master for jid: {}", jid)
    } else if envelope
        .info()
        .map_or(false, |info| info.contains_key("Minions"))
    {
        format!(
            "{}/{} returned from jid: {}",
            envelope.returned_count(),
            envelope.targeted_minions().len(),
            jid
        )
    } else {
        format!("waiting on jid: {}", jid)
    }
}
