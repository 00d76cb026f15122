//! Shared-secret authentication for the inline hook

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use passhook_core::config::HookConfig;
use passhook_core::{Error, Result};
use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;

/// Check the configured secret header.
///
/// The header value must equal the secret exactly. A missing header, a
/// non-UTF-8 value or any other value is `Error::Unauthorized`.
pub fn authorize(headers: &HeaderMap, hook: &HookConfig) -> Result<()> {
    let presented = headers
        .get(hook.authentication_field.as_str())
        .and_then(|value| value.to_str().ok());

    match presented {
        Some(value) if value == hook.authentication_secret => Ok(()),
        _ => Err(Error::Unauthorized),
    }
}

/// Peer address of the caller, when the server was started with connect info
#[derive(Debug, Clone, Copy)]
pub struct RemoteAddr(pub Option<SocketAddr>);

impl<S> FromRequestParts<S> for RemoteAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
        ))
    }
}

impl fmt::Display for RemoteAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(addr) => write!(f, "{}", addr.ip()),
            None => f.write_str("unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn hook() -> HookConfig {
        HookConfig {
            authentication_field: "mydomain-authentication".to_string(),
            authentication_secret: "secret".to_string(),
        }
    }

    #[test]
    fn test_matching_secret_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert("mydomain-authentication", HeaderValue::from_static("secret"));

        assert!(authorize(&headers, &hook()).is_ok());
    }

    #[test]
    fn test_header_name_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("mydomain-authentication", HeaderValue::from_static("secret"));

        let mut config = hook();
        config.authentication_field = "MyDomain-Authentication".to_string();
        assert!(authorize(&headers, &config).is_ok());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("mydomain-authentication", HeaderValue::from_static("wrong-secret"));

        assert!(matches!(authorize(&headers, &hook()), Err(Error::Unauthorized)));
    }

    #[test]
    fn test_secret_comparison_is_exact() {
        let mut headers = HeaderMap::new();
        headers.insert("mydomain-authentication", HeaderValue::from_static("Secret"));
        assert!(authorize(&headers, &hook()).is_err());

        headers.insert("mydomain-authentication", HeaderValue::from_static("secret "));
        assert!(authorize(&headers, &hook()).is_err());
    }

    #[test]
    fn test_missing_header_is_rejected() {
        assert!(matches!(
            authorize(&HeaderMap::new(), &hook()),
            Err(Error::Unauthorized)
        ));
    }

    #[test]
    fn test_non_utf8_value_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "mydomain-authentication",
            HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap(),
        );

        assert!(authorize(&headers, &hook()).is_err());
    }

    #[test]
    fn test_remote_addr_display() {
        let addr: SocketAddr = "10.0.0.7:51234".parse().unwrap();
        assert_eq!(RemoteAddr(Some(addr)).to_string(), "10.0.0.7");
        assert_eq!(RemoteAddr(None).to_string(), "unknown");
    }
}
