//! Password validator trait and startup selection

use crate::ad::AdPasswordValidator;
use crate::ldap::LdapPasswordValidator;
use async_trait::async_trait;
use passhook_core::{Error, PasshookConfig, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Answers whether a username/password pair is valid.
///
/// Implementations never fail: directory and platform errors are logged and
/// reported as `false`. One instance serves all requests concurrently.
#[async_trait]
pub trait PasswordValidator: Send + Sync {
    async fn validate(&self, username: &str, password: &str) -> bool;

    /// Short backend name used in logs and metrics
    fn backend(&self) -> &'static str;
}

/// Choose the validator for this process.
///
/// Active Directory wins over LDAP when both are configured. With neither,
/// startup must fail: answering every request UNVERIFIED would look exactly
/// like a wrong password.
pub fn select_validator(config: &PasshookConfig) -> Result<Arc<dyn PasswordValidator>> {
    if config.active_directory {
        info!("Validating passwords against the Active Directory domain of this host");
        return Ok(Arc::new(AdPasswordValidator::new()));
    }

    if config.ldap.is_configured() {
        let settings = config.ldap.settings()?;
        info!(
            server = %settings.server,
            port = settings.port,
            start_tls = settings.start_tls,
            "Validating passwords against LDAP"
        );
        if settings.start_tls && settings.verify_server_certificate {
            warn!("LDAP server certificates are accepted without verification");
        }
        return Ok(Arc::new(LdapPasswordValidator::new(settings)));
    }

    Err(Error::NoValidatorConfigured)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ldap_config() -> PasshookConfig {
        let mut config = PasshookConfig::default();
        config.ldap.server = "ldap.example.com".to_string();
        config
    }

    #[test]
    fn test_active_directory_takes_precedence() {
        let mut config = ldap_config();
        config.active_directory = true;

        let validator = select_validator(&config).unwrap();
        assert_eq!(validator.backend(), "active_directory");
    }

    #[test]
    fn test_ldap_selected_when_server_configured() {
        let validator = select_validator(&ldap_config()).unwrap();
        assert_eq!(validator.backend(), "ldap");
    }

    #[test]
    fn test_nothing_configured_is_an_error() {
        let err = select_validator(&PasshookConfig::default()).err().unwrap();
        assert!(matches!(err, Error::NoValidatorConfigured));
    }

    #[test]
    fn test_invalid_ldap_settings_are_reported() {
        let mut config = ldap_config();
        config.ldap.port = 0;

        let err = select_validator(&config).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
