//! Command-line interface components
//!
//! This module contains CLI-specific code for Salt Courier: argument
//! parsing and the handlers that turn parsed arguments into a job run.

pub mod args;
pub mod commands;

pub use args::{Cli, LogLevel};
pub use commands::{coordinator_config, handle_out_list, handle_run, load_config};
