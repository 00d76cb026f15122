//! Core types for Passhook

mod hook;

pub use hook::*;
