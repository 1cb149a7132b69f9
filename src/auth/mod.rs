//! Credential resolution for salt-api profiles
//!
//! A profile in the config file names the user and eauth backend. The
//! password may be left out of the file; it is then taken from the
//! environment (a `.env` file is honoured) or asked for on the terminal.
//!
//! # Examples
//!
//! ```rust,no_run
//! use salt_courier::auth::resolve_credentials;
//! use salt_courier::config::AppConfig;
//!
//! # fn example(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let profile = config.profile("netapi")?;
//! let credentials = resolve_credentials("netapi", profile)?;
//! println!("logging in as {}", credentials.username);
//! # Ok(())
//! # }
//! ```

pub mod credentials;

// Re-export main public API
pub use credentials::{resolve_credentials, resolve_credentials_with, Credentials};
