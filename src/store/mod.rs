mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::cli::Args;
use crate::error::PersistenceError;
use crate::models::{ ConversationDocument, CredentialDocument };
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;

/// A whole-document store. Every `save` replaces the previous content
/// entirely; there are no partial writes.
pub trait DocumentStore<T>: Send + Sync {
    /// Returns the stored document, or `T::default()` when nothing has been
    /// stored yet. A document that exists but cannot be read or parsed is an error.
    fn load(&self) -> Result<T, PersistenceError>;

    fn save(&self, document: &T) -> Result<(), PersistenceError>;

    /// Human-readable location, used for logging.
    fn location(&self) -> String;
}

pub type CredentialStore = Box<dyn DocumentStore<CredentialDocument>>;
pub type ConversationStore = Box<dyn DocumentStore<ConversationDocument>>;

pub fn create_store<T>(
    store_type: &str,
    path: &str
) -> Result<Box<dyn DocumentStore<T>>, Box<dyn Error + Send + Sync>>
    where T: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static
{
    match store_type.to_lowercase().as_str() {
        "json" => Ok(Box::new(JsonFileStore::<T>::new(path))),
        "memory" => Ok(Box::new(MemoryStore::<T>::new())),
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported store type: {}", store_type)
                    )
                )
            ),
    }
}

pub fn initialize_stores(
    args: &Args
) -> Result<(CredentialStore, ConversationStore), Box<dyn Error + Send + Sync>> {
    let users = create_store::<CredentialDocument>(&args.store_type, &args.user_file)?;
    let chats = create_store::<ConversationDocument>(&args.store_type, &args.chat_file)?;
    info!("Credentials will be stored in: {}", users.location());
    info!("Chat history will be stored in: {}", chats.location());
    Ok((users, chats))
}
