//! Salt Courier Library
//!
//! A command-line client for salt-api: translates salt-style command tokens
//! into API calls, submits them over an authenticated session, polls the job
//! until it completes and renders the results for the terminal.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod output;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
