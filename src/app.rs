use crate::auth::Authenticator;
use crate::cli::Args;
use crate::error::{ AuthError, SessionError, SignUpError };
use crate::llm::chat::{ generate_reply, new_client as new_chat_client, ChatClient };
use crate::llm::{ LlmConfig, LlmType };
use crate::models::{ Identity, MessageRole, DEFAULT_CHAT_TITLE };
use crate::ocr::{ OcrEngine, OcrError, TesseractOcr };
use crate::session::ChatSession;
use crate::store::initialize_stores;

use log::info;
use std::error::Error;
use std::sync::Arc;

/// Everything a front end needs: accounts, the bound chat session, the model
/// and the OCR engine.
pub struct ChatApp {
    auth: Authenticator,
    session: ChatSession,
    chat_client: Arc<dyn ChatClient>,
    ocr: Arc<dyn OcrEngine>,
    min_password_len: usize,
}

impl ChatApp {
    fn initialize_chat_client(
        args: &Args
    ) -> Result<Arc<dyn ChatClient>, Box<dyn Error + Send + Sync>> {
        let chat_config = LlmConfig {
            llm_type: args.chat_llm_type.parse::<LlmType>()?,
            base_url: args.chat_base_url.clone(),
            completion_model: args.chat_model.clone(),
        };
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Type={}, Model={}, BaseURL={:?}",
            args.chat_llm_type,
            chat_client.get_model(),
            chat_client.get_base_url().as_deref().unwrap_or("adapter default")
        );
        Ok(chat_client)
    }

    pub fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let chat_client = Self::initialize_chat_client(args)?;
        let (user_store, chat_store) = initialize_stores(args)?;
        let session = ChatSession::open(chat_store)?;
        let ocr = Arc::new(TesseractOcr::new(args.tesseract_cmd.clone(), args.ocr_lang.clone()));

        Ok(
            Self::with_parts(
                Authenticator::new(user_store),
                session,
                chat_client,
                ocr,
                args.min_password_len
            )
        )
    }

    pub fn with_parts(
        auth: Authenticator,
        session: ChatSession,
        chat_client: Arc<dyn ChatClient>,
        ocr: Arc<dyn OcrEngine>,
        min_password_len: usize
    ) -> Self {
        Self {
            auth,
            session,
            chat_client,
            ocr,
            min_password_len,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ChatSession {
        &mut self.session
    }

    /// Sign-up form handling: the password policy lives here, not in the authenticator.
    pub fn sign_up(
        &self,
        username: &str,
        password: &str,
        confirm: &str,
        email: &str
    ) -> Result<(), SignUpError> {
        if username.trim().is_empty() {
            return Err(SignUpError::EmptyUsername);
        }
        if password != confirm {
            return Err(SignUpError::PasswordMismatch);
        }
        if password.chars().count() < self.min_password_len {
            return Err(SignUpError::PasswordTooShort { min: self.min_password_len });
        }
        self.auth.register(username, password, email.trim())?;
        Ok(())
    }

    pub fn log_in(&mut self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = self.auth.login(username, password)?;
        self.session.bind(identity.clone());
        Ok(identity)
    }

    pub fn log_out(&mut self) -> Option<Identity> {
        let identity = self.session.unbind();
        if let Some(identity) = &identity {
            info!("User '{}' logged out", identity.username());
        }
        identity
    }

    /// Returns the selected chat, creating and selecting a fresh one if needed.
    pub fn ensure_current_chat(&mut self) -> Result<String, SessionError> {
        if let Some(chat_id) = self.session.current_chat() {
            return Ok(chat_id.to_string());
        }
        let chat_id = self.session.create_chat(DEFAULT_CHAT_TITLE)?;
        self.session.select_chat(&chat_id)?;
        Ok(chat_id)
    }

    /// Records the user's text, asks the model, and records the reply.
    ///
    /// The model call happens between two independent writes; nothing in the
    /// session is borrowed while it runs. A model failure is not an error here,
    /// it becomes the assistant message.
    pub async fn send_message(&mut self, chat_id: &str, text: &str) -> Result<String, SessionError> {
        self.session.append_message(chat_id, MessageRole::User, text)?;

        let client = Arc::clone(&self.chat_client);
        let reply = generate_reply(client.as_ref(), text).await;

        self.session.append_message(chat_id, MessageRole::Assistant, &reply)?;
        Ok(reply)
    }

    pub async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError> {
        self.ocr.extract_text(image).await
    }
}
