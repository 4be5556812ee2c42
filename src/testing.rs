//! Test doubles shared by the unit tests.

use crate::app::ChatApp;
use crate::auth::Authenticator;
use crate::llm::chat::{ ChatClient, CompletionResponse };
use crate::models::{ ConversationDocument, CredentialDocument };
use crate::ocr::{ OcrEngine, OcrError };
use crate::session::ChatSession;
use crate::store::MemoryStore;
use async_trait::async_trait;
use std::error::Error;
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::Arc;

/// Replies with `echo: <prompt>`, or fails with "connection refused".
pub struct EchoClient {
    calls: AtomicUsize,
    fail: bool,
}

impl EchoClient {
    pub fn new(fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for EchoClient {
    async fn complete(
        &self,
        prompt: &str
    ) -> Result<CompletionResponse, Box<dyn Error + Send + Sync>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err("connection refused".into());
        }
        Ok(CompletionResponse { response: format!("echo: {}", prompt) })
    }

    fn get_model(&self) -> String {
        "echo".to_string()
    }

    fn get_base_url(&self) -> Option<String> {
        None
    }
}

pub struct StaticOcr(pub &'static str);

#[async_trait]
impl OcrEngine for StaticOcr {
    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError> {
        if image.is_empty() {
            return Err(OcrError::EmptyImage);
        }
        Ok(self.0.to_string())
    }
}

/// An app over memory stores with a 6-character password minimum.
pub fn memory_app(fail_inference: bool) -> (ChatApp, Arc<EchoClient>) {
    let client = Arc::new(EchoClient::new(fail_inference));
    let auth = Authenticator::new(Box::new(MemoryStore::<CredentialDocument>::new()));
    let session = ChatSession::open(Box::new(MemoryStore::<ConversationDocument>::new())).expect("memory store loads");
    let app = ChatApp::with_parts(
        auth,
        session,
        Arc::clone(&client) as Arc<dyn ChatClient>,
        Arc::new(StaticOcr("scanned text")),
        6
    );
    (app, client)
}
