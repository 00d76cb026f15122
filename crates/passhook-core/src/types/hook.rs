//! Password import inline hook payloads
//!
//! The request body is owned by the identity provider and carries many
//! fields this service ignores, so it is read as a JSON tree and only the
//! credential leaves are extracted. The response has a fixed shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Command type understood by the provider for credential updates
pub const UPDATE_COMMAND_TYPE: &str = "com.okta.action.update";

/// JSON path of the submitted username
pub const USERNAME_PATH: [&str; 4] = ["data", "context", "credential", "username"];

/// JSON path of the submitted password
pub const PASSWORD_PATH: [&str; 4] = ["data", "context", "credential", "password"];

/// Credentials submitted for verification
#[derive(Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    pub username: String,
    pub password: String,
}

impl ValidationRequest {
    /// Parse a raw request body and extract the credential.
    pub fn from_slice(body: &[u8]) -> crate::Result<Self> {
        let payload: Value = serde_json::from_slice(body)
            .map_err(|e| crate::Error::MalformedRequest(e.to_string()))?;
        Self::from_payload(&payload)
    }

    /// Extract the credential from an already parsed payload.
    pub fn from_payload(payload: &Value) -> crate::Result<Self> {
        Ok(Self {
            username: string_at(payload, &USERNAME_PATH)?.to_string(),
            password: string_at(payload, &PASSWORD_PATH)?.to_string(),
        })
    }
}

impl fmt::Debug for ValidationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn string_at<'a>(payload: &'a Value, path: &[&str]) -> crate::Result<&'a str> {
    let mut node = payload;
    for key in path {
        node = node
            .get(key)
            .ok_or_else(|| crate::Error::MissingField(path.join(".")))?;
    }
    node.as_str().ok_or_else(|| {
        crate::Error::MalformedRequest(format!("{} must be a string", path.join(".")))
    })
}

/// Outcome of a credential check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialStatus {
    Verified,
    Unverified,
}

impl CredentialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "VERIFIED",
            Self::Unverified => "UNVERIFIED",
        }
    }
}

impl From<bool> for CredentialStatus {
    fn from(valid: bool) -> Self {
        if valid {
            Self::Verified
        } else {
            Self::Unverified
        }
    }
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response body for the password import inline hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookResponse {
    pub commands: Vec<HookCommand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookCommand {
    #[serde(rename = "type")]
    pub command_type: String,
    pub value: CredentialValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialValue {
    pub credential: CredentialStatus,
}

impl HookResponse {
    /// Build the single credential-update command for `status`.
    pub fn credential_update(status: CredentialStatus) -> Self {
        Self {
            commands: vec![HookCommand {
                command_type: UPDATE_COMMAND_TYPE.to_string(),
                value: CredentialValue { credential: status },
            }],
        }
    }
}
