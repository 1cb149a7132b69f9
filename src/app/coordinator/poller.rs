//! Submit-and-poll state machine
//!
//! The poller logs in, submits the call, then looks the job up until it
//! completes or the poll budget runs out. Every lookup becomes a render
//! event; exactly one event per run is marked final.

use std::future::Future;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::completion::{classify, is_complete, JobHandle};
use super::config::CoordinatorConfig;
use super::events::{EventSender, RenderEvent};
use super::signals::{CancelReason, CancelToken};
use crate::app::client::{JobApi, LoginOutcome};
use crate::app::command::CallPayload;
use crate::auth::Credentials;
use crate::errors::{AppError, Result};
use crate::output::{JobEnvelope, OutputKind};

/// Where the poller is in its run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Authenticating,
    Submitting,
    Polling,
    Done,
    Failed,
}

/// What a finished run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSummary {
    /// Job lookups performed
    pub iterations: u32,
    /// Budget left when the loop ended
    pub remaining_budget: u32,
    /// The submitted job, if one was accepted
    pub job: Option<JobHandle>,
}

impl PollSummary {
    fn without_job(budget: u32) -> Self {
        Self {
            iterations: 0,
            remaining_budget: budget,
            job: None,
        }
    }
}

/// Race a future against cancellation
async fn until_cancelled<F: Future>(cancel: &CancelToken, future: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        value = future => Ok(value),
    }
}

/// Producer side of a job run
pub struct Poller<A: JobApi> {
    api: A,
    config: CoordinatorConfig,
    events: EventSender,
    cancel: CancelToken,
    state: PollState,
}

impl<A: JobApi> Poller<A> {
    pub fn new(api: A, config: CoordinatorConfig, events: EventSender, cancel: CancelToken) -> Self {
        Self {
            api,
            config,
            events,
            cancel,
            state: PollState::Authenticating,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Run to completion, closing the client whatever the outcome
    ///
    /// On error the cancel token is raised so the dispatcher stops too.
    pub async fn run(
        &mut self,
        credentials: &Credentials,
        payload: Option<&CallPayload>,
    ) -> Result<PollSummary> {
        let result = self.drive(credentials, payload).await;
        self.api.close().await;

        match &result {
            Ok(summary) => {
                self.state = PollState::Done;
                debug!(
                    "Poller done after {} lookups, {} budget left",
                    summary.iterations, summary.remaining_budget
                );
            }
            Err(e) => {
                self.state = PollState::Failed;
                if !e.is_cancellation() {
                    error!("Job run failed ({}): {}", e.category(), e);
                    self.cancel.cancel(CancelReason::Failure);
                }
            }
        }
        result
    }

    async fn drive(
        &mut self,
        credentials: &Credentials,
        payload: Option<&CallPayload>,
    ) -> Result<PollSummary> {
        let budget = self.config.poll_budget;

        self.state = PollState::Authenticating;
        let login = until_cancelled(&self.cancel, self.api.login(credentials)).await??;
        let login_body = match login {
            LoginOutcome::Rejected(body) => {
                warn!("Login rejected for user {}", credentials.username);
                self.emit(RenderEvent::finished(OutputKind::Json, body))?;
                return Ok(PollSummary::without_job(budget));
            }
            LoginOutcome::Authenticated(body) => body,
        };
        info!("Logged in as {}", credentials.username);

        self.state = PollState::Submitting;
        let payload = match payload {
            Some(payload) => payload,
            None => {
                debug!("No command given, rendering login response");
                self.emit(RenderEvent::finished(OutputKind::Json, login_body))?;
                return Ok(PollSummary::without_job(budget));
            }
        };

        let response = until_cancelled(&self.cancel, self.api.submit(payload)).await??;
        let job = match classify(&response) {
            Some(job) => job,
            None => {
                warn!("Submission of {} was not accepted as a job", payload.fun);
                self.emit(RenderEvent::finished(OutputKind::Json, response))?;
                return Ok(PollSummary::without_job(budget));
            }
        };
        info!("Submitted {} job {}", job.kind, job.jid);

        self.state = PollState::Polling;
        self.poll(job, &payload.fun, budget).await
    }

    async fn poll(&mut self, job: JobHandle, submitted_fun: &str, mut budget: u32) -> Result<PollSummary> {
        let mut iterations = 0;

        loop {
            let last = budget == 0;
            let lookup = until_cancelled(&self.cancel, self.api.lookup(&job.jid)).await??;
            iterations += 1;

            let event = match self.final_output(&job, &lookup, submitted_fun, last) {
                Some(output) => RenderEvent::finished(output, lookup),
                None => RenderEvent::progress(lookup),
            };
            let finished = event.is_final();
            self.emit(event)?;

            if finished {
                if last {
                    warn!("Poll budget exhausted for job {}", job.jid);
                }
                return Ok(PollSummary {
                    iterations,
                    remaining_budget: budget,
                    job: Some(job),
                });
            }

            budget -= 1;
            until_cancelled(&self.cancel, tokio::time::sleep(self.config.poll_interval)).await?;
        }
    }

    /// Output kind for a final event, `None` while the job is still running
    fn final_output(
        &self,
        job: &JobHandle,
        lookup: &Value,
        submitted_fun: &str,
        last: bool,
    ) -> Option<OutputKind> {
        let envelope = JobEnvelope::new(lookup);
        if !last && !is_complete(job.kind, &envelope) {
            return None;
        }
        let function = envelope.function().unwrap_or(submitted_fun);
        Some(self.config.output.resolve(function))
    }

    fn emit(&self, event: RenderEvent) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        self.events.send(event)
    }
}
