//! salt-api login
//!
//! Posts the profile credentials to `/login`. A 401 is an expected answer
//! (wrong password, expired eauth) and comes back as `LoginOutcome::Rejected`
//! so it can be shown to the user like any other result.

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use super::http::HttpHandler;
use crate::auth::Credentials;
use crate::constants::api;
use crate::errors::TransportResult;

/// Result of a login attempt that reached the server
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// HTTP 200; carries the login response body (token, expiry, perms)
    Authenticated(Value),
    /// HTTP 401; carries a status body suitable for rendering
    Rejected(Value),
}

impl LoginOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginOutcome::Authenticated(_))
    }

    /// Body to hand to the renderer
    pub fn payload(&self) -> &Value {
        match self {
            LoginOutcome::Authenticated(body) | LoginOutcome::Rejected(body) => body,
        }
    }

    pub fn into_payload(self) -> Value {
        match self {
            LoginOutcome::Authenticated(body) | LoginOutcome::Rejected(body) => body,
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    eauth: &'a str,
}

/// Handles salt-api authentication
pub struct AuthHandler;

impl AuthHandler {
    /// Log in with the given credentials.
    ///
    /// Session cookies set by a successful login are kept by the client's
    /// cookie store and sent with every later request.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on network failure or any status other than
    /// 200 and 401.
    pub async fn login(
        http: &HttpHandler,
        login_url: &Url,
        credentials: &Credentials,
    ) -> TransportResult<LoginOutcome> {
        tracing::info!(
            "Logging in to {} as {} (eauth: {})",
            login_url,
            credentials.username,
            credentials.eauth
        );

        let request = LoginRequest {
            username: &credentials.username,
            password: &credentials.password,
            eauth: &credentials.eauth,
        };
        let response = http.post(login_url, &request).await?;
        let status = response.status();
        tracing::info!("Login response status: {}", status);

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("salt-api rejected credentials for {}", credentials.username);
            return Ok(LoginOutcome::Rejected(Self::rejection_body()));
        }

        HttpHandler::check_status(login_url, status)?;
        let body = HttpHandler::decode(login_url, response).await?;
        Ok(LoginOutcome::Authenticated(body))
    }

    /// Body rendered in place of a login response after a 401
    pub fn rejection_body() -> Value {
        json!({ "return": [{ "Status": api::UNAUTHORIZED_STATUS }] })
    }
}
