//! Active Directory password validation
//!
//! Credentials are checked against the domain this host belongs to. There is
//! no setting for another domain or domain controller.

mod context;
mod validator;
#[cfg(windows)]
mod logon;

pub use context::{ContextOptions, DomainContextBuilder, PrincipalContext, PrincipalContextBuilder};
pub use validator::AdPasswordValidator;
