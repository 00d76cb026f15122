//! Active Directory-backed password validation

use super::context::{ContextOptions, DomainContextBuilder, PrincipalContextBuilder};
use crate::error::DirectoryError;
use crate::validator::PasswordValidator;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Validates credentials against the host's Active Directory domain
pub struct AdPasswordValidator {
    builder: Arc<dyn PrincipalContextBuilder>,
}

impl AdPasswordValidator {
    pub fn new() -> Self {
        Self::with_builder(Arc::new(DomainContextBuilder))
    }

    pub fn with_builder(builder: Arc<dyn PrincipalContextBuilder>) -> Self {
        Self { builder }
    }
}

impl Default for AdPasswordValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PasswordValidator for AdPasswordValidator {
    async fn validate(&self, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            warn!(username = %username, "Refusing to validate an empty username or password");
            return false;
        }

        let builder = Arc::clone(&self.builder);
        let account = username.to_string();
        let secret = password.to_string();

        // The platform logon call blocks
        let outcome = tokio::task::spawn_blocking(move || {
            let context = builder.build()?;
            context.validate_credentials(&account, &secret, ContextOptions::Negotiate)
        })
        .await;

        match outcome {
            Ok(Ok(valid)) => {
                debug!(username = %username, valid, "Active Directory validation finished");
                valid
            }
            Ok(Err(DirectoryError::PlatformNotSupported(reason))) => {
                error!(username = %username, "Unable to login: {}", reason);
                false
            }
            Ok(Err(e)) => {
                error!(username = %username, "Unexpected error during Active Directory validation: {}", e);
                false
            }
            Err(e) => {
                error!(username = %username, "Active Directory validation task failed: {}", e);
                false
            }
        }
    }

    fn backend(&self) -> &'static str {
        "active_directory"
    }
}
