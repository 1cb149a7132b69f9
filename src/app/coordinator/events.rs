//! Render events passed from the poller to the dispatcher

use serde_json::Value;
use tokio::sync::mpsc;

use crate::errors::{AppError, Result};
use crate::output::OutputKind;

/// Whether more events follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Normal,
    /// Last event of a run; the dispatcher stops after rendering it
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMeta {
    pub output: OutputKind,
    pub step: Step,
}

/// A payload and how to render it
#[derive(Debug, Clone, PartialEq)]
pub struct RenderEvent {
    pub meta: EventMeta,
    pub payload: Value,
}

impl RenderEvent {
    pub fn new(output: OutputKind, step: Step, payload: Value) -> Self {
        Self {
            meta: EventMeta { output, step },
            payload,
        }
    }

    /// Progress update shown on the status line
    pub fn progress(payload: Value) -> Self {
        Self::new(OutputKind::Status, Step::Normal, payload)
    }

    pub fn finished(output: OutputKind, payload: Value) -> Self {
        Self::new(output, Step::Final, payload)
    }

    pub fn is_final(&self) -> bool {
        self.meta.step == Step::Final
    }
}

/// Producer half, owned by the poller
#[derive(Debug)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<RenderEvent>,
}

impl EventSender {
    /// Queue an event; fails once the dispatcher has gone away
    pub fn send(&self, event: RenderEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| AppError::Cancelled)
    }
}

/// Consumer half, owned by the dispatcher
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<RenderEvent>,
}

impl EventReceiver {
    /// Next event in send order, `None` once the sender is dropped and drained
    pub async fn recv(&mut self) -> Option<RenderEvent> {
        self.rx.recv().await
    }
}

/// FIFO channel between the two actors
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventReceiver { rx })
}
