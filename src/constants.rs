//! Application constants for Salt Courier
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names for credential overrides
pub mod env {
    /// Overrides the profile username
    pub const USERNAME: &str = "SALT_COURIER_USERNAME";

    /// Supplies the profile password when the config omits it
    pub const PASSWORD: &str = "SALT_COURIER_PASSWORD";
}

/// Salt API endpoints and wire details
pub mod api {
    /// Login endpoint, relative to the base URL
    pub const LOGIN_PATH: &str = "login";

    /// Job status endpoint prefix, relative to the base URL
    pub const JOBS_PATH: &str = "jobs";

    /// Default external auth backend
    pub const DEFAULT_EAUTH: &str = "pam";

    /// Body returned to the renderer when the API rejects the credentials
    pub const UNAUTHORIZED_STATUS: &str = "Unable to authorize connection";

    /// Separator inside highstate result identifiers
    pub const STATE_ID_SEPARATOR: &str = "_|-";

    /// Highstate comment that carries no information
    pub const SILENT_COMMENT: &str = "Success!";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("salt_courier/", env!("CARGO_PKG_VERSION"));

    /// Value of the `X-Requested-With` header salt-api expects from clients
    pub const REQUESTED_WITH: &str = "XMLHttpRequest";

    /// Default per-request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
}

/// Job polling defaults
pub mod polling {
    use super::Duration;

    /// Default number of lookups before the final iteration is forced
    pub const DEFAULT_POLL_BUDGET: u32 = 30;

    /// Pause between two lookups of the same job
    pub const POLL_INTERVAL: Duration = Duration::from_millis(500);
}

/// Configuration file defaults
pub mod config {
    /// Directory under the user config dir
    pub const APP_DIR: &str = "salt_courier";

    /// Config file name
    pub const FILE_NAME: &str = "config.toml";

    /// Profile used when `-p` is not given
    pub const DEFAULT_PROFILE: &str = "netapi";
}

/// Terminal output
pub mod output {
    /// Marker for a successful minion or state
    pub const SUCCESS_MARK: &str = "✔";

    /// Marker for a failed or missing minion or state
    pub const FAILURE_MARK: &str = "✘";

    /// Printed instead of a render when the target matched nothing
    pub const NO_MINIONS_MATCHED: &str = "No minions matched the target.";

    /// Spinner frames for the status line
    pub const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

    /// Spinner redraw interval in milliseconds
    pub const SPINNER_TICK_MS: u64 = 120;
}

// Re-export commonly used constants for convenience
pub use config::DEFAULT_PROFILE;
pub use http::USER_AGENT;
pub use polling::{DEFAULT_POLL_BUDGET, POLL_INTERVAL};
