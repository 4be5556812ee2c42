//! Credential checks against the user document.
//!
//! Passwords are stored as a single unsalted SHA-256 hex digest. That is weak
//! against offline guessing, but existing user files depend on it; changing the
//! scheme needs a migration that re-hashes on the next successful login.

use crate::error::AuthError;
use crate::models::{ CredentialRecord, Identity };
use crate::store::CredentialStore;
use chrono::Utc;
use log::{ info, warn };
use sha2::{ Digest, Sha256 };

pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

pub struct Authenticator {
    store: CredentialStore,
}

impl Authenticator {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }

    /// Creates a user. Password policy is the caller's job.
    pub fn register(&self, username: &str, password: &str, email: &str) -> Result<(), AuthError> {
        let mut users = self.store.load()?;
        if users.contains_key(username) {
            warn!("Sign-up rejected, username '{}' is taken", username);
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        users.insert(username.to_string(), CredentialRecord {
            password_hash: hash_password(password),
            email: email.to_string(),
            created_at: Utc::now(),
        });
        self.store.save(&users)?;
        info!("Registered user '{}'", username);
        Ok(())
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let users = self.store.load()?;
        let record = users.get(username).ok_or_else(|| {
            warn!("Login failed, unknown user '{}'", username);
            AuthError::UnknownUser(username.to_string())
        })?;

        if record.password_hash != hash_password(password) {
            warn!("Login failed for '{}': incorrect password", username);
            return Err(AuthError::BadPassword);
        }

        info!("User '{}' logged in", username);
        Ok(Identity::new(username))
    }
}
