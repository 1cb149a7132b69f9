//! Consumer loop that renders events as they arrive

use std::io::Write;

use tracing::{debug, error};

use super::envelope::JobEnvelope;
use super::renderers::{self, Palette};
use super::status::{status_message, StatusLine};
use super::OutputKind;
use crate::app::coordinator::events::{EventReceiver, RenderEvent};
use crate::app::coordinator::signals::{CancelReason, CancelToken};
use crate::constants::output;
use crate::errors::{AppError, RenderResult, Result};

/// What the dispatcher rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Events rendered, progress updates included
    pub rendered: usize,
    /// Output kind of the final event
    pub final_output: OutputKind,
}

/// Renders events to `out` and progress to the status line
pub struct Dispatcher<W: Write> {
    out: W,
    status: StatusLine,
    palette: Palette,
    rendered: usize,
}

impl<W: Write> Dispatcher<W> {
    /// Dispatcher writing plain text
    pub fn new(out: W, status: StatusLine) -> Self {
        Self {
            out,
            status,
            palette: Palette::plain(),
            rendered: 0,
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Render events in order until the final one
    ///
    /// Returns `AppError::Cancelled` when cancellation is raised first, or
    /// when the channel closes without a final event. A render failure is
    /// returned after raising cancellation.
    pub async fn run(
        &mut self,
        events: &mut EventReceiver,
        cancel: &CancelToken,
    ) -> Result<DispatchSummary> {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                event = events.recv() => event,
            };
            let event = match next {
                Some(event) if !cancel.is_cancelled() => event,
                _ => {
                    self.status.clear();
                    return Err(AppError::Cancelled);
                }
            };

            if let Err(e) = self.render(&event) {
                error!("Failed to render {} output: {}", event.meta.output, e);
                self.status.clear();
                cancel.cancel(CancelReason::Failure);
                return Err(e.into());
            }
            self.rendered += 1;

            if event.is_final() {
                self.out.flush()?;
                debug!("Rendered {} events", self.rendered);
                return Ok(DispatchSummary {
                    rendered: self.rendered,
                    final_output: event.meta.output,
                });
            }
        }
    }

    /// Render one event with the renderer its output kind names
    pub fn render(&mut self, event: &RenderEvent) -> RenderResult<()> {
        let envelope = JobEnvelope::new(&event.payload);
        if event.is_final() {
            self.status.clear();
        }

        if envelope.is_empty_result() {
            writeln!(self.out, "{}", output::NO_MINIONS_MATCHED)?;
            return Ok(());
        }

        let out = &mut self.out;
        let palette = self.palette;
        match event.meta.output {
            OutputKind::Json => renderers::render_json(out, &event.payload),
            OutputKind::Yaml => renderers::render_yaml(out, &envelope),
            OutputKind::Status => {
                let message = status_message(&envelope);
                if event.is_final() {
                    writeln!(out, "{}", message)?;
                } else {
                    self.status.update(message);
                }
                Ok(())
            }
            OutputKind::Boolean => renderers::render_boolean(out, &envelope, palette),
            OutputKind::Highstate => renderers::render_highstate(out, &envelope, palette),
            OutputKind::Profile => renderers::render_profile(out, &envelope, palette),
        }
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
