//! Cancellation shared by the poller and the dispatcher
//!
//! A [`CancelToken`] is a cloneable handle over a `watch` channel. Either
//! actor may raise it on failure, and the [`SignalHandler`] raises it when
//! the user presses Ctrl-C or the process receives SIGTERM. The first reason
//! recorded wins.

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Why cancellation was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// One of the actors failed
    Failure,
    /// Ctrl-C or SIGTERM
    Interrupted,
}

/// One-shot, observable cancellation flag
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<Option<CancelReason>>>,
    rx: watch::Receiver<Option<CancelReason>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Raise cancellation; later calls keep the first reason
    pub fn cancel(&self, reason: CancelReason) {
        let raised = self.tx.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(reason);
                true
            } else {
                false
            }
        });
        if raised {
            debug!("Cancellation raised: {:?}", reason);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.borrow().is_some()
    }

    pub fn reason(&self) -> Option<CancelReason> {
        *self.rx.borrow()
    }

    /// Resolve once cancellation has been raised
    pub async fn cancelled(&self) -> CancelReason {
        let mut rx = self.rx.clone();
        loop {
            if let Some(reason) = *rx.borrow_and_update() {
                return reason;
            }
            if rx.changed().await.is_err() {
                // Every sender is gone, so nothing can cancel any more.
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Raises cancellation on Ctrl-C or SIGTERM
pub struct SignalHandler {
    token: CancelToken,
}

impl SignalHandler {
    pub fn new(token: CancelToken) -> Self {
        Self { token }
    }

    /// Spawn the background task that watches for signals
    ///
    /// The task ends on its own once the token is cancelled for any reason,
    /// so callers may also abort it when the run is over.
    pub fn setup(&self) -> JoinHandle<()> {
        let token = self.token.clone();

        tokio::spawn(async move {
            let ctrl_c = async {
                match signal::ctrl_c().await {
                    Ok(()) => info!("Ctrl+C signal received"),
                    Err(e) => {
                        warn!("Failed to install Ctrl+C handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut stream) => {
                        stream.recv().await;
                        info!("SIGTERM signal received");
                    }
                    Err(e) => {
                        warn!("Failed to install SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => {
                    info!("Received Ctrl+C, cancelling job");
                    token.cancel(CancelReason::Interrupted);
                },
                _ = terminate => {
                    info!("Received terminate signal, cancelling job");
                    token.cancel(CancelReason::Interrupted);
                },
                _ = token.cancelled() => {},
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_cancel_wakes_waiters() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel(CancelReason::Failure);

        let reason = timeout(Duration::from_millis(200), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reason, CancelReason::Failure);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_first_reason_wins() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert_eq!(token.reason(), None);

        token.cancel(CancelReason::Interrupted);
        token.clone().cancel(CancelReason::Failure);
        assert_eq!(token.reason(), Some(CancelReason::Interrupted));
        assert_eq!(token.cancelled().await, CancelReason::Interrupted);
    }

    #[tokio::test]
    async fn test_not_cancelled_stays_pending() {
        let token = CancelToken::new();
        let result = timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_signal_handler_exits_on_cancel() {
        let token = CancelToken::new();
        let handle = SignalHandler::new(token.clone()).setup();

        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel(CancelReason::Failure);

        let joined = timeout(Duration::from_millis(200), handle).await;
        assert!(joined.is_ok());
        assert_eq!(token.reason(), Some(CancelReason::Failure));
    }
}
