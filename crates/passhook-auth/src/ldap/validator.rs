//! LDAP-backed password validation

use crate::error::DirectoryError;
use crate::ldap::client::{DirectoryConnection, DirectoryConnector, Ldap3Connector};
use crate::ldap::types::*;
use crate::validator::PasswordValidator;
use async_trait::async_trait;
use passhook_core::config::LdapSettings;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Validates credentials by binding to an LDAP server as the user
pub struct LdapPasswordValidator {
    settings: LdapSettings,
    connector: Arc<dyn DirectoryConnector>,
}

impl LdapPasswordValidator {
    pub fn new(settings: LdapSettings) -> Self {
        Self::with_connector(settings, Arc::new(Ldap3Connector))
    }

    pub fn with_connector(settings: LdapSettings, connector: Arc<dyn DirectoryConnector>) -> Self {
        Self { settings, connector }
    }

    pub fn settings(&self) -> &LdapSettings {
        &self.settings
    }

    /// Run the bind sequence on a fresh connection, disposing it on every path.
    async fn authenticate(
        &self,
        spec: &DirectoryConnectionSpec,
        password: &str,
    ) -> Result<(), DirectoryError> {
        let mut connection = self.connector.connection(&spec.identifier, spec.timeout);
        let outcome = bind_with(connection.as_mut(), spec, password).await;
        connection.dispose().await;
        outcome
    }
}

async fn bind_with(
    connection: &mut dyn DirectoryConnection,
    spec: &DirectoryConnectionSpec,
    password: &str,
) -> Result<(), DirectoryError> {
    connection.set_protocol_version(LDAP_PROTOCOL_VERSION);
    connection.set_credential(BindCredential::new(spec.bind_dn.clone(), password));
    connection.set_auth_type(AuthType::Basic);

    if spec.use_start_tls {
        // Accepts any certificate. Test and development directories only.
        if spec.verify_server_certificate {
            connection.accept_any_server_certificate();
        }
        connection.start_transport_layer_security().await?;
    }

    connection.bind().await
}

#[async_trait]
impl PasswordValidator for LdapPasswordValidator {
    async fn validate(&self, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            warn!(username = %username, "Refusing to bind with an empty username or password");
            return false;
        }

        let spec = DirectoryConnectionSpec::from_settings(&self.settings, username);

        match self.authenticate(&spec, password).await {
            Ok(()) => {
                debug!(bind_dn = %spec.bind_dn, "LDAP bind succeeded");
                true
            }
            Err(e @ DirectoryError::Unexpected(_)) => {
                error!(bind_dn = %spec.bind_dn, "Unexpected error during LDAP validation: {}", e);
                false
            }
            Err(e) => {
                error!(bind_dn = %spec.bind_dn, "Unable to login: {}", e);
                false
            }
        }
    }

    fn backend(&self) -> &'static str {
        "ldap"
    }
}
