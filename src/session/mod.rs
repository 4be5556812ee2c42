//! The session controller: the only writer of the conversation document.
//!
//! The whole document is loaded once when the session opens. Each mutation
//! edits the in-memory copy and then writes the entire document back. If that
//! write fails the error is returned and the in-memory copy keeps the change,
//! so the next successful save brings the file up to date.

use crate::error::{ AuthError, NotFoundError, PersistenceError, SessionError };
use crate::models::{ Chat, ChatMessage, ConversationDocument, Identity, MessageRole, UserChats };
use crate::store::ConversationStore;
use log::{ debug, info };
use uuid::Uuid;

pub struct ChatSession {
    store: ConversationStore,
    chats: ConversationDocument,
    identity: Option<Identity>,
    current_chat: Option<String>,
}

fn require(identity: &Option<Identity>) -> Result<&Identity, AuthError> {
    identity.as_ref().ok_or(AuthError::NotAuthenticated)
}

impl ChatSession {
    pub fn open(store: ConversationStore) -> Result<Self, PersistenceError> {
        let chats = store.load()?;
        debug!("Loaded chat history for {} user(s) from {}", chats.len(), store.location());
        Ok(Self {
            store,
            chats,
            identity: None,
            current_chat: None,
        })
    }

    /// Binds the session to a logged-in user. Any previous selection is dropped.
    pub fn bind(&mut self, identity: Identity) {
        self.current_chat = None;
        self.identity = Some(identity);
    }

    pub fn unbind(&mut self) -> Option<Identity> {
        self.current_chat = None;
        self.identity.take()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn current_chat(&self) -> Option<&str> {
        self.current_chat.as_deref()
    }

    fn user_chats(&self) -> Result<Option<&UserChats>, AuthError> {
        let identity = require(&self.identity)?;
        Ok(self.chats.get(identity.username()))
    }

    fn chat_mut(&mut self, chat_id: &str) -> Result<&mut Chat, SessionError> {
        let identity = require(&self.identity)?;
        self.chats
            .get_mut(identity.username())
            .and_then(|chats| chats.get_mut(chat_id))
            .ok_or_else(|| NotFoundError::new(chat_id).into())
    }

    fn persist(&self) -> Result<(), PersistenceError> {
        self.store.save(&self.chats)
    }

    pub fn create_chat(&mut self, title: &str) -> Result<String, SessionError> {
        let identity = require(&self.identity)?;
        let chats = self.chats.entry(identity.username().to_string()).or_default();

        let mut chat_id = Uuid::new_v4().to_string();
        while chats.contains_key(&chat_id) {
            chat_id = Uuid::new_v4().to_string();
        }
        chats.insert(chat_id.clone(), Chat::new(title));
        info!("Created chat {} for '{}'", chat_id, identity.username());

        self.persist()?;
        Ok(chat_id)
    }

    /// Removes a chat. Returns `false` without touching the store when the
    /// chat does not exist for this user.
    pub fn delete_chat(&mut self, chat_id: &str) -> Result<bool, SessionError> {
        let identity = require(&self.identity)?;
        let removed = self.chats
            .get_mut(identity.username())
            .and_then(|chats| chats.remove(chat_id))
            .is_some();
        if !removed {
            return Ok(false);
        }
        info!("Deleted chat {} for '{}'", chat_id, identity.username());

        if self.current_chat.as_deref() == Some(chat_id) {
            self.current_chat = None;
        }
        self.persist()?;
        Ok(true)
    }

    pub fn append_message(
        &mut self,
        chat_id: &str,
        role: MessageRole,
        content: &str
    ) -> Result<(), SessionError> {
        let chat = self.chat_mut(chat_id)?;
        chat.push(ChatMessage::new(role, content));
        debug!("Appended {} message to chat {}", role, chat_id);
        self.persist()?;
        Ok(())
    }

    pub fn rename_chat(&mut self, chat_id: &str, title: &str) -> Result<(), SessionError> {
        self.chat_mut(chat_id)?.set_title(title);
        self.persist()?;
        Ok(())
    }

    /// The user's chats, most recently active first. Ties keep chat id order.
    pub fn list_chats(&self) -> Result<Vec<(&str, &Chat)>, SessionError> {
        let mut listing: Vec<(&str, &Chat)> = match self.user_chats()? {
            Some(chats) =>
                chats
                    .iter()
                    .map(|(id, chat)| (id.as_str(), chat))
                    .collect(),
            None => Vec::new(),
        };
        listing.sort_by(|a, b| b.1.updated_at().cmp(&a.1.updated_at()));
        Ok(listing)
    }

    pub fn get_chat(&self, chat_id: &str) -> Result<&Chat, SessionError> {
        self.user_chats()?
            .and_then(|chats| chats.get(chat_id))
            .ok_or_else(|| NotFoundError::new(chat_id).into())
    }

    pub fn select_chat(&mut self, chat_id: &str) -> Result<(), SessionError> {
        self.get_chat(chat_id)?;
        self.current_chat = Some(chat_id.to_string());
        Ok(())
    }
}
