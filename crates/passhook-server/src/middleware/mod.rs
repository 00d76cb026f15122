//! Request guards for the hook route

pub mod auth;

pub use auth::{authorize, RemoteAddr};
