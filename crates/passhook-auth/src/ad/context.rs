//! Principal contexts
//!
//! A principal context validates credentials against a directory using the
//! platform's account-management API. Only Windows hosts provide one.

use crate::error::DirectoryError;

/// How credentials are presented to the domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextOptions {
    /// Kerberos, falling back to NTLM
    Negotiate,
    /// The platform's default logon provider
    Default,
}

/// A handle able to validate credentials
pub trait PrincipalContext: Send {
    /// `Ok(false)` for rejected credentials, `Err` when the check itself failed.
    fn validate_credentials(
        &self,
        username: &str,
        password: &str,
        options: ContextOptions,
    ) -> Result<bool, DirectoryError>;
}

/// Creates principal contexts; called once per validation
pub trait PrincipalContextBuilder: Send + Sync {
    fn build(&self) -> Result<Box<dyn PrincipalContext>, DirectoryError>;
}

/// Builds contexts scoped to the host's own domain
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainContextBuilder;

#[cfg(windows)]
impl PrincipalContextBuilder for DomainContextBuilder {
    fn build(&self) -> Result<Box<dyn PrincipalContext>, DirectoryError> {
        Ok(Box::new(super::logon::DomainContext::current()?))
    }
}

#[cfg(not(windows))]
impl PrincipalContextBuilder for DomainContextBuilder {
    fn build(&self) -> Result<Box<dyn PrincipalContext>, DirectoryError> {
        Err(DirectoryError::PlatformNotSupported(format!(
            "Active Directory validation requires a Windows host (running on {})",
            std::env::consts::OS
        )))
    }
}
