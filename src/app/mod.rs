//! Core application logic for Salt Courier
//!
//! This module contains the command translator, the salt-api session
//! client and the job orchestration that ties them to the renderers.
//!
//! # Examples
//!
//! ```rust
//! use salt_courier::app::translate;
//!
//! let payload = translate(&["salt", "-G", "os:Debian", "pkg.version", "vim"]).unwrap();
//! assert_eq!(payload.fun, "pkg.version");
//! assert_eq!(payload.tgt.as_deref(), Some("os:Debian"));
//! ```

pub mod client;
pub mod command;
pub mod coordinator;

// Re-export main public API
pub use client::{ClientConfig, JobApi, LoginOutcome, SaltClient, SessionState};
pub use command::{translate, CallPayload, ClientKind, Protocol, TargetType};
pub use coordinator::{
    CancelReason, CancelToken, Coordinator, CoordinatorConfig, JobHandle, JobKind, JobReport,
    PollSummary, RenderEvent,
};
