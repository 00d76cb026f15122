//! Directory error types

use thiserror::Error;

/// Errors raised by directory connections and principal contexts.
///
/// Validators never surface these to callers; they are logged and turned
/// into an unverified result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Platform not supported: {0}")]
    PlatformNotSupported(String),

    #[error("Failed to connect to directory: {0}")]
    Connection(String),

    #[error("TLS negotiation failed: {0}")]
    Tls(String),

    #[error("Bind failed with code {code}: {message}")]
    Bind { code: u32, message: String },

    #[error("Unsupported LDAP protocol version: {0}")]
    UnsupportedProtocolVersion(u32),

    #[error("Connection is not open")]
    NotConnected,

    #[error("Unexpected directory error: {0}")]
    Unexpected(String),
}

impl DirectoryError {
    /// LDAP result code 49, invalid credentials
    pub const INVALID_CREDENTIALS: u32 = 49;

    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, DirectoryError::Bind { code, .. } if *code == Self::INVALID_CREDENTIALS)
    }
}
