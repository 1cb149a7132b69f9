//! HTTP session client for salt-api
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `auth`: login against `/login`
//! - `http`: single-attempt JSON requests with status checks
//!
//! [`SaltClient`] owns the connection pool and the session cookies. The
//! orchestrator talks to it through the [`JobApi`] trait.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::app::command::CallPayload;
use crate::auth::Credentials;
use crate::constants::api;
use crate::errors::{ConfigError, ConfigResult, TransportError, TransportResult};

pub mod auth;
pub mod config;
pub mod http;

pub use auth::{AuthHandler, LoginOutcome};
pub use config::ClientConfig;

use http::HttpHandler;

/// Operations the orchestrator needs from a salt-api session
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Authenticate; a 401 is `Ok(LoginOutcome::Rejected)`
    async fn login(&mut self, credentials: &Credentials) -> TransportResult<LoginOutcome>;

    /// Submit a call and return the raw submission response
    async fn submit(&self, payload: &CallPayload) -> TransportResult<Value>;

    /// Fetch the current status of a job
    async fn lookup(&self, jid: &str) -> TransportResult<Value>;

    /// Release the connection pool; safe to call more than once
    async fn close(&mut self);
}

/// URL scheme accepted for the API endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

/// Mutable session facts; only `login` changes them
#[derive(Debug, Clone)]
pub struct SessionState {
    pub base_url: Url,
    pub scheme: Scheme,
    pub authenticated: bool,
}

impl SessionState {
    /// Validate the base URL and build a fresh, unauthenticated state
    pub fn new(base_url: &str) -> ConfigResult<Self> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            field: "url".to_string(),
            value: base_url.to_string(),
            reason,
        };

        let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => return Err(invalid(format!("Unknown URL scheme '{}'", other))),
        };
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot be used as a base".to_string()));
        }
        // endpoints are joined below the base path, so keep a trailing slash
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            base_url: url,
            scheme,
            authenticated: false,
        })
    }

    /// Build `{base}/{segments...}`
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// HTTP client for a single salt-api endpoint
#[derive(Debug)]
pub struct SaltClient {
    http: Option<HttpHandler>,
    session: SessionState,
}

impl SaltClient {
    /// Create a client for `base_url` with the given configuration
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the URL is invalid or not http(s),
    /// and `AppError::Transport` when the HTTP client cannot be built.
    pub fn new(base_url: &str, config: &ClientConfig) -> crate::errors::Result<Self> {
        let session = SessionState::new(base_url)?;
        let client = config.build_http_client()?;
        tracing::debug!("Created salt-api client for {}", session.base_url);

        Ok(Self {
            http: Some(HttpHandler::new(client, config.request_timeout)),
            session,
        })
    }

    /// Current session state
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.http.is_none()
    }

    fn handler(&self) -> TransportResult<&HttpHandler> {
        self.http.as_ref().ok_or(TransportError::Closed)
    }
}

#[async_trait]
impl JobApi for SaltClient {
    async fn login(&mut self, credentials: &Credentials) -> TransportResult<LoginOutcome> {
        let login_url = self.session.endpoint(&[api::LOGIN_PATH]);
        let outcome = AuthHandler::login(self.handler()?, &login_url, credentials).await?;
        self.session.authenticated = outcome.is_authenticated();
        Ok(outcome)
    }

    async fn submit(&self, payload: &CallPayload) -> TransportResult<Value> {
        tracing::debug!("Submitting {} via {:?}", payload.fun, payload.client);
        self.handler()?
            .post_json(&self.session.base_url, std::slice::from_ref(payload))
            .await
    }

    async fn lookup(&self, jid: &str) -> TransportResult<Value> {
        let url = self.session.endpoint(&[api::JOBS_PATH, jid]);
        self.handler()?.get_json(&url).await
    }

    async fn close(&mut self) {
        if self.http.take().is_some() {
            tracing::debug!("Closed salt-api client for {}", self.session.base_url);
        }
    }
}
