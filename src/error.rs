use std::path::PathBuf;
use thiserror::Error;

/// Failure reading or writing one of the JSON documents.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read store file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write store file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {} is malformed: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize store document: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    #[error("Username not found: {0}")]
    UnknownUser(String),

    #[error("Incorrect password")]
    BadPassword,

    #[error("Not logged in")]
    NotAuthenticated,

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// A chat id that is not owned by the current user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Chat not found: {chat_id}")]
pub struct NotFoundError {
    pub chat_id: String,
}

impl NotFoundError {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl SessionError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, Self::Auth(AuthError::NotAuthenticated))
    }
}

/// Validation failures raised by the sign-up form before the authenticator is consulted.
#[derive(Debug, Error)]
pub enum SignUpError {
    #[error("Username must not be empty")]
    EmptyUsername,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error(transparent)]
    Auth(#[from] AuthError),
}
