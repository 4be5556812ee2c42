use chrono::{ DateTime, Utc };
use serde::{ Serialize, Deserialize };
use std::collections::BTreeMap;
use super::timestamp;

/// username -> credential record. The map key is what keeps usernames unique.
pub type CredentialDocument = BTreeMap<String, CredentialRecord>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Hex SHA-256 digest, stored under `password` for compatibility with existing files.
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub email: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// The authenticated principal. There is no token; holding an `Identity`
/// is what being logged in means.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identity {
    username: String,
}

impl Identity {
    pub(crate) fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}
