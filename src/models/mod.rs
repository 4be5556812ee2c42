pub mod chat;
pub mod timestamp;
pub mod user;

pub use chat::{ Chat, ChatMessage, ConversationDocument, MessageRole, UserChats, DEFAULT_CHAT_TITLE };
pub use user::{ CredentialDocument, CredentialRecord, Identity };
