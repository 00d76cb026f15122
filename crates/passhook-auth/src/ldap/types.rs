//! LDAP connection types
//!
//! Plain values describing one bind attempt. They are rebuilt for every
//! validation and never shared between requests.

use passhook_core::config::LdapSettings;
use std::fmt;
use std::time::Duration;

/// The only protocol version spoken to directories
pub const LDAP_PROTOCOL_VERSION: u32 = 3;

// ============================================================================
// Bind DN
// ============================================================================

/// Build the distinguished name used to bind as `username`.
///
/// An empty `identifier` yields the bare username, which Active Directory
/// accepts for simple binds. Otherwise the result is
/// `{identifier}={username},{base}` with the username escaped as an RDN value.
pub fn bind_dn(identifier: &str, base: &str, username: &str) -> String {
    if identifier.is_empty() {
        username.to_string()
    } else {
        format!("{}={},{}", identifier, ldap3::dn_escape(username), base)
    }
}

// ============================================================================
// Directory Identifier
// ============================================================================

/// Address of a directory endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryIdentifier {
    pub server: String,
    pub port: u16,
    /// The server name is a fully qualified DNS host name.
    /// Host names are resolved as given either way.
    pub fully_qualified_dns_host_name: bool,
    /// UDP (CLDAP) transport. Not supported for binds.
    pub connectionless: bool,
}

impl DirectoryIdentifier {
    pub fn new(server: impl Into<String>, port: u16) -> Self {
        Self {
            server: server.into(),
            port,
            fully_qualified_dns_host_name: false,
            connectionless: false,
        }
    }

    /// `ldap://` URL for this endpoint
    pub fn url(&self) -> String {
        if self.server.contains(':') && !self.server.starts_with('[') {
            format!("ldap://[{}]:{}", self.server, self.port)
        } else {
            format!("ldap://{}:{}", self.server, self.port)
        }
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// How the connection authenticates on bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthType {
    /// Bind without credentials
    #[default]
    Anonymous,
    /// LDAP simple bind with DN and password
    Basic,
}

/// Credential attached to a connection before binding
#[derive(Clone, PartialEq, Eq)]
pub struct BindCredential {
    pub username: String,
    pub password: String,
}

impl BindCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BindCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Connection Spec
// ============================================================================

/// Everything needed for one bind attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConnectionSpec {
    pub identifier: DirectoryIdentifier,
    pub bind_dn: String,
    pub use_start_tls: bool,
    /// Accept any server certificate during STARTTLS (test/dev only)
    pub verify_server_certificate: bool,
    pub timeout: Duration,
}

impl DirectoryConnectionSpec {
    pub fn from_settings(settings: &LdapSettings, username: &str) -> Self {
        Self {
            identifier: DirectoryIdentifier::new(settings.server.clone(), settings.port),
            bind_dn: bind_dn(&settings.identifier, &settings.base, username),
            use_start_tls: settings.start_tls,
            verify_server_certificate: settings.verify_server_certificate,
            timeout: settings.timeout,
        }
    }
}
