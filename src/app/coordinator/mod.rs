//! Job orchestration
//!
//! A job run has two actors: the [`Poller`], which logs in, submits and
//! polls, and the output [`Dispatcher`], which renders what the poller
//! finds. They share an event channel and a [`CancelToken`] and are driven
//! together on the current task by the [`Coordinator`].
//!
//! - [`config`] - run settings and validation
//! - [`events`] - render events and the channel carrying them
//! - [`signals`] - cancellation and Ctrl-C handling
//! - [`completion`] - job classification and completion checks
//! - [`poller`] - the submit-and-poll state machine
//!
//! # Examples
//!
//! ```rust,no_run
//! use salt_courier::app::{translate, ClientConfig, Coordinator, CoordinatorConfig, SaltClient};
//! use salt_courier::auth::Credentials;
//!
//! # async fn example() -> salt_courier::Result<()> {
//! let client = SaltClient::new("https://salt:8000", &ClientConfig::default())?;
//! let credentials = Credentials {
//!     username: "salt".to_string(),
//!     password: "secret".to_string(),
//!     eauth: "pam".to_string(),
//! };
//! let payload = translate(&["salt", "*", "test.ping"])?;
//!
//! let coordinator = Coordinator::new(CoordinatorConfig::default());
//! let report = coordinator
//!     .run(client, &credentials, Some(&payload), std::io::stdout())
//!     .await?;
//! println!("{} lookups", report.poll.iterations);
//! # Ok(())
//! # }
//! ```

pub mod completion;
pub mod config;
pub mod events;
pub mod poller;
pub mod signals;

use std::io::Write;

use tracing::{debug, info};

use crate::app::client::JobApi;
use crate::app::command::CallPayload;
use crate::auth::Credentials;
use crate::errors::{AppError, Result};
use crate::output::dispatch::DispatchSummary;
use crate::output::{Dispatcher, Palette, StatusLine};

pub use completion::{JobHandle, JobKind};
pub use config::CoordinatorConfig;
pub use events::{event_channel, EventMeta, RenderEvent, Step};
pub use poller::{PollState, PollSummary, Poller};
pub use signals::{CancelReason, CancelToken, SignalHandler};

/// Outcome of a successful job run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub poll: PollSummary,
    pub dispatch: DispatchSummary,
}

/// Runs the poller and the dispatcher side by side
pub struct Coordinator {
    config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Run one job, cancelling it on Ctrl-C or SIGTERM
    pub async fn run<A, W>(
        &self,
        api: A,
        credentials: &Credentials,
        payload: Option<&CallPayload>,
        out: W,
    ) -> Result<JobReport>
    where
        A: JobApi,
        W: Write,
    {
        let cancel = CancelToken::new();
        let signals = SignalHandler::new(cancel.clone()).setup();
        let result = self
            .run_with_token(api, credentials, payload, out, cancel)
            .await;
        signals.abort();
        result
    }

    /// Run one job under an externally owned cancel token
    ///
    /// Both actors are awaited before returning. The first error that is not
    /// a cancellation wins; a run stopped only by cancellation reports
    /// `Interrupted` or `Cancelled` depending on the token's reason.
    pub async fn run_with_token<A, W>(
        &self,
        api: A,
        credentials: &Credentials,
        payload: Option<&CallPayload>,
        out: W,
        cancel: CancelToken,
    ) -> Result<JobReport>
    where
        A: JobApi,
        W: Write,
    {
        self.config.validate()?;

        let status = if self.config.show_status {
            StatusLine::new()
        } else {
            StatusLine::hidden()
        };
        let (tx, mut rx) = event_channel();
        let mut poller = Poller::new(api, self.config.clone(), tx, cancel.clone());
        let mut dispatcher =
            Dispatcher::new(out, status).with_palette(Palette::new(self.config.color));

        info!(
            "Starting job run with poll budget {}",
            self.config.poll_budget
        );
        let (polled, dispatched) = tokio::join!(
            poller.run(credentials, payload),
            dispatcher.run(&mut rx, &cancel)
        );

        match (polled, dispatched) {
            (Ok(poll), Ok(dispatch)) => {
                debug!("Job run finished in state {:?}", poller.state());
                Ok(JobReport { poll, dispatch })
            }
            (polled, dispatched) => {
                let errors = [polled.err(), dispatched.err()];
                if let Some(first) = errors
                    .into_iter()
                    .flatten()
                    .find(|e| !e.is_cancellation())
                {
                    return Err(first);
                }
                match cancel.reason() {
                    Some(CancelReason::Interrupted) => Err(AppError::Interrupted),
                    _ => Err(AppError::Cancelled),
                }
            }
        }
    }
}
