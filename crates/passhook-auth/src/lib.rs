//! Credential validation for Passhook
//!
//! A [`PasswordValidator`] answers whether a username/password pair is valid
//! against a directory. Two backends exist:
//! - Active Directory, through the host's domain logon API
//! - LDAP, through a simple bind with the user's own credentials
//!
//! Directory handles sit behind narrow traits so the validators can be
//! exercised with in-memory fakes.

pub mod ad;
pub mod error;
pub mod ldap;
pub mod validator;

pub use ad::{AdPasswordValidator, ContextOptions, DomainContextBuilder, PrincipalContext, PrincipalContextBuilder};
pub use error::DirectoryError;
pub use ldap::{
    bind_dn, AuthType, BindCredential, DirectoryConnection, DirectoryConnectionSpec,
    DirectoryConnector, DirectoryIdentifier, Ldap3Connector, LdapPasswordValidator,
};
pub use validator::{select_validator, PasswordValidator};
