//! Core HTTP operations against salt-api
//!
//! Every call gets exactly one attempt. A timeout or a non-success status is
//! reported to the caller as a `TransportError`; salt jobs are not idempotent
//! so nothing here retries.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::errors::{TransportError, TransportResult};

/// HTTP operations handler
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    request_timeout: Duration,
}

impl HttpHandler {
    /// Creates a new HttpHandler around a configured client
    pub fn new(client: Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    /// POST a JSON body and return the raw response without status checks
    pub async fn post<B: Serialize + ?Sized>(&self, url: &Url, body: &B) -> TransportResult<Response> {
        tracing::debug!("POST {}", url);
        self.client
            .post(url.as_str())
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(url, e))
    }

    /// POST a JSON body and decode a JSON reply, failing on non-2xx
    pub async fn post_json<B: Serialize + ?Sized>(&self, url: &Url, body: &B) -> TransportResult<Value> {
        let response = self.post(url, body).await?;
        Self::check_status(url, response.status())?;
        Self::decode(url, response).await
    }

    /// GET a JSON document, failing on non-2xx
    pub async fn get_json(&self, url: &Url) -> TransportResult<Value> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| self.map_send_error(url, e))?;
        Self::check_status(url, response.status())?;
        Self::decode(url, response).await
    }

    /// Decode a response body as JSON
    pub async fn decode(url: &Url, response: Response) -> TransportResult<Value> {
        response.json().await.map_err(|source| TransportError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Reject anything outside the 2xx range
    pub fn check_status(url: &Url, status: StatusCode) -> TransportResult<()> {
        if status.is_success() {
            Ok(())
        } else {
            tracing::warn!("{} answered with HTTP {}", url, status);
            Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }

    fn map_send_error(&self, url: &Url, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            tracing::error!("Request to {} timed out", url);
            TransportError::Timeout {
                url: url.to_string(),
                seconds: self.request_timeout.as_secs(),
            }
        } else {
            tracing::error!("Request to {} failed: {}", url, error);
            TransportError::Http(error)
        }
    }
}
