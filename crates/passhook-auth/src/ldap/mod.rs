//! LDAP password validation
//!
//! Validates a credential by binding to the directory as the user:
//! - bind DN built from a configured RDN attribute and base, or the bare name
//! - optional STARTTLS, with an opt-in accept-any-certificate override
//! - one connection per validation, always disposed

mod client;
mod types;
mod validator;

pub use client::{DirectoryConnection, DirectoryConnector, Ldap3Connection, Ldap3Connector};
pub use types::*;
pub use validator::LdapPasswordValidator;
