//! Passhook Core Library
//!
//! Configuration, error types and the inline-hook payload model shared by
//! the validator and server crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::PasshookConfig;
pub use error::{Error, Result};

/// Passhook version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Route served for the password import inline hook
pub const HOOK_PATH: &str = "/PasswordImportHook";

/// Liveness text returned by `GET` on the hook route
pub const HOOK_LIVENESS_MESSAGE: &str = "POST an authentication request to /PasswordImportHook!";
