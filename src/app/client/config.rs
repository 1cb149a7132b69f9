//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! used for every salt-api call.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;

use crate::constants::http;
use crate::errors::{TransportError, TransportResult};

/// Configuration for the salt-api HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Per-request timeout; expiry is fatal, never retried
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
    /// Accept self-signed certificates on the API endpoint
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            tcp_nodelay: true,
            accept_invalid_certs: false,
        }
    }
}

impl ClientConfig {
    /// Headers sent with every request
    pub fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Requested-With",
            HeaderValue::from_static(http::REQUESTED_WITH),
        );
        headers
    }

    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> TransportResult<Client> {
        let mut client_builder = Client::builder()
            .cookie_store(true) // login session lives in the cookie jar
            .default_headers(Self::default_headers())
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(http::USER_AGENT)
            .tcp_nodelay(self.tcp_nodelay)
            .danger_accept_invalid_certs(self.accept_invalid_certs);

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder.build().map_err(TransportError::Http)
    }
}
