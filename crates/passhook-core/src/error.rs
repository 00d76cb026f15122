//! Error types for Passhook

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Configuration Errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No password validator configured: enable active_directory or set ldap.server")]
    NoValidatorConfigured,

    // Request Errors
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // Internal Errors
    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "InvalidConfiguration",
            Error::NoValidatorConfigured => "NoValidatorConfigured",
            Error::Unauthorized => "Unauthorized",
            Error::MalformedRequest(_) => "MalformedRequest",
            Error::MissingField(_) => "MissingField",
            Error::InternalError(_) => "InternalError",
            Error::Io(_) => "InternalError",
            Error::Other(_) => "InternalError",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Error::MalformedRequest(_) | Error::MissingField(_) => 400,

            Error::Unauthorized => 401,

            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(Error::Unauthorized.http_status(), 401);
        assert_eq!(Error::MissingField("data.context".into()).http_status(), 400);
        assert_eq!(Error::MalformedRequest("eof".into()).http_status(), 400);
        assert_eq!(Error::Config("ldap.port".into()).http_status(), 500);
        assert_eq!(Error::NoValidatorConfigured.http_status(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::Unauthorized.code(), "Unauthorized");
        assert_eq!(Error::Config("x".into()).code(), "InvalidConfiguration");
        assert_eq!(Error::InternalError("x".into()).code(), "InternalError");
    }
}
