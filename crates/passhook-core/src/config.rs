//! Configuration for Passhook
//!
//! Settings come from an optional TOML file, then `PASSHOOK_*` environment
//! variables, then command-line overrides applied by the binary. Values that
//! fail to parse are reported as [`Error::Config`](crate::Error::Config)
//! instead of falling back to a default.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasshookConfig {
    /// Validate against the Active Directory domain of this host.
    /// Takes precedence over `[ldap]`.
    #[serde(default)]
    pub active_directory: bool,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub hook: HookConfig,

    #[serde(default)]
    pub ldap: LdapConfigSection,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl PasshookConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config {}: {}", path, e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> crate::Result<Self> {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Load the file if one is given, then layer the process environment on top.
    pub fn load(path: Option<&str>) -> crate::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply `PASSHOOK_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("PASSHOOK_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }
        if let Some(port) = parse_var(&lookup, "PASSHOOK_PORT")? {
            self.server.port = port;
        }
        if let Some(value) = lookup("PASSHOOK_ACTIVE_DIRECTORY") {
            self.active_directory = parse_bool("PASSHOOK_ACTIVE_DIRECTORY", &value)?;
        }

        // Hook authentication
        if let Some(field) = lookup("PASSHOOK_HOOK_AUTHENTICATION_FIELD") {
            self.hook.authentication_field = field;
        }
        if let Some(secret) = lookup("PASSHOOK_HOOK_AUTHENTICATION_SECRET") {
            self.hook.authentication_secret = secret;
        }

        // LDAP
        if let Some(server) = lookup("PASSHOOK_LDAP_SERVER") {
            self.ldap.server = server;
        }
        if let Some(port) = parse_var(&lookup, "PASSHOOK_LDAP_PORT")? {
            self.ldap.port = port;
        }
        if let Some(base) = lookup("PASSHOOK_LDAP_BASE") {
            self.ldap.base = base;
        }
        if let Some(identifier) = lookup("PASSHOOK_LDAP_IDENTIFIER") {
            self.ldap.identifier = identifier;
        }
        if let Some(value) = lookup("PASSHOOK_LDAP_START_TLS") {
            self.ldap.start_tls = parse_bool("PASSHOOK_LDAP_START_TLS", &value)?;
        }
        if let Some(value) = lookup("PASSHOOK_LDAP_VERIFY_SERVER_CERTIFICATE") {
            self.ldap.verify_server_certificate =
                parse_bool("PASSHOOK_LDAP_VERIFY_SERVER_CERTIFICATE", &value)?;
        }
        if let Some(timeout) = parse_var(&lookup, "PASSHOOK_LDAP_TIMEOUT_SECONDS")? {
            self.ldap.timeout_seconds = timeout;
        }

        // Logging and metrics
        if let Some(level) = lookup("PASSHOOK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("PASSHOOK_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(value) = lookup("PASSHOOK_METRICS_ENABLED") {
            self.metrics.enabled = parse_bool("PASSHOOK_METRICS_ENABLED", &value)?;
        }

        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> crate::Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| crate::Error::Config(format!("{}={:?}: {}", name, raw, e))),
        None => Ok(None),
    }
}

/// Parse a boolean setting, accepting `true`/`false` in any letter case.
pub fn parse_bool(name: &str, raw: &str) -> crate::Result<bool> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(crate::Error::Config(format!(
            "{}={:?}: expected true or false",
            name, raw
        )))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Shared-secret authentication of the inline hook caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookConfig {
    /// Name of the request header carrying the secret
    #[serde(default)]
    pub authentication_field: String,
    /// Expected header value
    #[serde(default)]
    pub authentication_secret: String,
}

impl HookConfig {
    pub fn validate(&self) -> crate::Result<()> {
        let field = &self.authentication_field;
        if field.is_empty() {
            return Err(crate::Error::Config(
                "hook.authentication_field must be set".into(),
            ));
        }
        if !field.bytes().all(is_header_name_byte) {
            return Err(crate::Error::Config(format!(
                "hook.authentication_field {:?} is not a valid header name",
                field
            )));
        }
        if self.authentication_secret.is_empty() {
            return Err(crate::Error::Config(
                "hook.authentication_secret must be set".into(),
            ));
        }
        Ok(())
    }
}

// RFC 7230 token characters
fn is_header_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// LDAP directory configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapConfigSection {
    /// LDAP server host name. Empty means LDAP is not configured.
    #[serde(default)]
    pub server: String,

    /// LDAP server port
    #[serde(default = "default_ldap_port")]
    pub port: u16,

    /// Base DN appended to the bind name when `identifier` is set
    #[serde(default)]
    pub base: String,

    /// RDN attribute used to build the bind DN (e.g. `uid`).
    /// Empty binds with the bare username, as Active Directory expects.
    #[serde(default)]
    pub identifier: String,

    /// Upgrade the connection with STARTTLS before binding
    #[serde(default)]
    pub start_tls: bool,

    /// Accept any server certificate during STARTTLS.
    /// Weakens TLS; meant for test and development directories only.
    #[serde(default)]
    pub verify_server_certificate: bool,

    /// Connection timeout in seconds
    #[serde(default = "default_ldap_timeout")]
    pub timeout_seconds: u64,
}

fn default_ldap_port() -> u16 {
    389
}

fn default_ldap_timeout() -> u64 {
    10
}

impl Default for LdapConfigSection {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: default_ldap_port(),
            base: String::new(),
            identifier: String::new(),
            start_tls: false,
            verify_server_certificate: false,
            timeout_seconds: default_ldap_timeout(),
        }
    }
}

impl LdapConfigSection {
    pub fn is_configured(&self) -> bool {
        !self.server.trim().is_empty()
    }

    /// Check the section and produce the settings used by the LDAP validator.
    pub fn settings(&self) -> crate::Result<LdapSettings> {
        let server = self.server.trim();
        if server.is_empty() {
            return Err(crate::Error::Config("ldap.server must be set".into()));
        }
        if self.port == 0 {
            return Err(crate::Error::Config("ldap.port must not be 0".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(crate::Error::Config(
                "ldap.timeout_seconds must be greater than 0".into(),
            ));
        }
        if !self.identifier.is_empty() && self.base.is_empty() {
            tracing::warn!(
                identifier = %self.identifier,
                "ldap.identifier is set but ldap.base is empty; bind DNs will end with a bare comma"
            );
        }

        Ok(LdapSettings {
            server: server.to_string(),
            port: self.port,
            base: self.base.clone(),
            identifier: self.identifier.clone(),
            start_tls: self.start_tls,
            verify_server_certificate: self.verify_server_certificate,
            timeout: Duration::from_secs(self.timeout_seconds),
        })
    }
}

/// Checked LDAP settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdapSettings {
    pub server: String,
    pub port: u16,
    pub base: String,
    pub identifier: String,
    pub start_tls: bool,
    pub verify_server_certificate: bool,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Serve Prometheus metrics at `/metrics`
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
