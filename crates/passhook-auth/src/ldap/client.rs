//! LDAP Client implementation
//!
//! [`DirectoryConnector`] and [`DirectoryConnection`] expose only the
//! operations the validator needs. [`Ldap3Connector`] implements them over
//! `ldap3`; tests substitute in-memory fakes.

use crate::error::DirectoryError;
use crate::ldap::types::*;
use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings};
use std::time::Duration;
use tracing::{debug, warn};

/// Creates unopened connections for a directory endpoint
pub trait DirectoryConnector: Send + Sync {
    fn connection(
        &self,
        identifier: &DirectoryIdentifier,
        timeout: Duration,
    ) -> Box<dyn DirectoryConnection>;
}

/// A single directory session, owned by one validation
#[async_trait]
pub trait DirectoryConnection: Send {
    fn set_protocol_version(&mut self, version: u32);

    fn set_credential(&mut self, credential: BindCredential);

    fn set_auth_type(&mut self, auth_type: AuthType);

    /// Accept any certificate the server presents during STARTTLS.
    fn accept_any_server_certificate(&mut self);

    /// Open the connection and upgrade it with STARTTLS.
    async fn start_transport_layer_security(&mut self) -> Result<(), DirectoryError>;

    /// Bind with the attached credential, opening a plain connection if none is open yet.
    async fn bind(&mut self) -> Result<(), DirectoryError>;

    /// Release the connection. Safe to call on a connection that never opened.
    async fn dispose(&mut self);
}

/// Connector backed by `ldap3`
#[derive(Debug, Clone, Copy, Default)]
pub struct Ldap3Connector;

impl DirectoryConnector for Ldap3Connector {
    fn connection(
        &self,
        identifier: &DirectoryIdentifier,
        timeout: Duration,
    ) -> Box<dyn DirectoryConnection> {
        Box::new(Ldap3Connection::new(identifier.clone(), timeout))
    }
}

/// `ldap3` session. The socket opens lazily on STARTTLS or bind.
pub struct Ldap3Connection {
    identifier: DirectoryIdentifier,
    timeout: Duration,
    protocol_version: u32,
    credential: Option<BindCredential>,
    auth_type: AuthType,
    accept_any_certificate: bool,
    ldap: Option<Ldap>,
}

impl Ldap3Connection {
    pub fn new(identifier: DirectoryIdentifier, timeout: Duration) -> Self {
        Self {
            identifier,
            timeout,
            protocol_version: LDAP_PROTOCOL_VERSION,
            credential: None,
            auth_type: AuthType::default(),
            accept_any_certificate: false,
            ldap: None,
        }
    }

    /// Create LDAP connection with proper TLS settings
    async fn open(&mut self, start_tls: bool) -> Result<(), DirectoryError> {
        if self.ldap.is_some() {
            if start_tls {
                return Err(DirectoryError::Tls(
                    "connection is already open; STARTTLS must precede bind".to_string(),
                ));
            }
            return Ok(());
        }
        if self.protocol_version != LDAP_PROTOCOL_VERSION {
            return Err(DirectoryError::UnsupportedProtocolVersion(self.protocol_version));
        }
        if self.identifier.connectionless {
            return Err(DirectoryError::Connection(
                "connectionless LDAP does not support binds".to_string(),
            ));
        }

        let settings = LdapConnSettings::new()
            .set_conn_timeout(self.timeout)
            .set_starttls(start_tls)
            .set_no_tls_verify(self.accept_any_certificate);

        let url = self.identifier.url();
        debug!("Connecting to LDAP server: {} (starttls: {})", url, start_tls);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| {
                if start_tls {
                    DirectoryError::Tls(format!("{}: {}", url, e))
                } else {
                    DirectoryError::Connection(format!("{}: {}", url, e))
                }
            })?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!("LDAP connection error: {}", e);
            }
        });

        self.ldap = Some(ldap);
        Ok(())
    }
}

#[async_trait]
impl DirectoryConnection for Ldap3Connection {
    fn set_protocol_version(&mut self, version: u32) {
        self.protocol_version = version;
    }

    fn set_credential(&mut self, credential: BindCredential) {
        self.credential = Some(credential);
    }

    fn set_auth_type(&mut self, auth_type: AuthType) {
        self.auth_type = auth_type;
    }

    fn accept_any_server_certificate(&mut self) {
        self.accept_any_certificate = true;
    }

    async fn start_transport_layer_security(&mut self) -> Result<(), DirectoryError> {
        self.open(true).await
    }

    async fn bind(&mut self) -> Result<(), DirectoryError> {
        let (bind_dn, password) = match (self.auth_type, &self.credential) {
            (AuthType::Basic, Some(credential)) => {
                (credential.username.clone(), credential.password.clone())
            }
            (AuthType::Basic, None) => {
                return Err(DirectoryError::Unexpected(
                    "basic authentication requires a credential".to_string(),
                ))
            }
            (AuthType::Anonymous, _) => (String::new(), String::new()),
        };

        self.open(false).await?;
        let timeout = self.timeout;
        let ldap = self.ldap.as_mut().ok_or(DirectoryError::NotConnected)?;

        let result = ldap
            .with_timeout(timeout)
            .simple_bind(&bind_dn, &password)
            .await
            .map_err(|e| DirectoryError::Connection(format!("Bind request failed: {}", e)))?;

        if result.rc != 0 {
            return Err(DirectoryError::Bind {
                code: result.rc,
                message: result.text,
            });
        }

        debug!("Bound to {} as {}", self.identifier.url(), bind_dn);
        Ok(())
    }

    async fn dispose(&mut self) {
        if let Some(mut ldap) = self.ldap.take() {
            if let Err(e) = ldap.unbind().await {
                debug!("LDAP unbind failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispose_without_open_is_noop() {
        let mut connection =
            Ldap3Connection::new(DirectoryIdentifier::new("localhost", 389), Duration::from_secs(1));
        connection.dispose().await;
        assert!(connection.ldap.is_none());
    }

    #[tokio::test]
    async fn test_rejects_protocol_version_2() {
        let mut connection =
            Ldap3Connection::new(DirectoryIdentifier::new("localhost", 389), Duration::from_secs(1));
        connection.set_protocol_version(2);
        connection.set_auth_type(AuthType::Basic);
        connection.set_credential(BindCredential::new("uid=bob,dc=x,dc=com", "pw"));

        let err = connection.bind().await.unwrap_err();
        assert_eq!(err, DirectoryError::UnsupportedProtocolVersion(2));
    }

    #[tokio::test]
    async fn test_basic_auth_requires_credential() {
        let mut connection =
            Ldap3Connection::new(DirectoryIdentifier::new("localhost", 389), Duration::from_secs(1));
        connection.set_auth_type(AuthType::Basic);

        assert!(matches!(
            connection.bind().await,
            Err(DirectoryError::Unexpected(_))
        ));
    }

    #[tokio::test]
    async fn test_connectionless_is_rejected() {
        let mut identifier = DirectoryIdentifier::new("localhost", 389);
        identifier.connectionless = true;
        let mut connection = Ldap3Connection::new(identifier, Duration::from_secs(1));

        assert!(matches!(
            connection.start_transport_layer_security().await,
            Err(DirectoryError::Connection(_))
        ));
    }
}
