//! Prelude module for Salt Courier
//!
//! Re-exports the items needed to drive a job run with a single
//! `use salt_courier::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use salt_courier::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::load(None).await?;
//!     let profile = config.profile(DEFAULT_PROFILE)?;
//!     let credentials = resolve_credentials(DEFAULT_PROFILE, profile)?;
//!     let client = SaltClient::new(&profile.url, &config.client.to_runtime_config())?;
//!
//!     let payload = translate(&["salt", "*", "test.ping"])?;
//!     let coordinator = Coordinator::new(CoordinatorConfig::default());
//!     coordinator
//!         .run(client, &credentials, Some(&payload), std::io::stdout())
//!         .await?;
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Translation, session and orchestration
pub use crate::app::{
    translate, CallPayload, ClientConfig, Coordinator, CoordinatorConfig, JobApi, JobReport,
    LoginOutcome, SaltClient,
};

// Configuration and credentials
pub use crate::auth::{resolve_credentials, Credentials};
pub use crate::config::{AppConfig, ProfileConfig};

// Rendering
pub use crate::output::{OutputKind, OutputPolicy};

// Commonly used constants
pub use crate::constants::{DEFAULT_POLL_BUDGET, DEFAULT_PROFILE, USER_AGENT};

pub use tokio;
