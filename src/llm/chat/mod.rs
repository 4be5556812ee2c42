pub mod ollama;

use async_trait::async_trait;
use log::error;
use serde::Deserialize;
use std::error::Error as StdError;
use std::sync::Arc;
use super::{ LlmConfig, LlmType };
use self::ollama::OllamaClient;

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Ollama => {
            let specific_client = OllamaClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

/// Asks the model for a reply. Never fails: a backend error becomes the reply
/// text itself, so it lands in the chat history like any other answer.
pub async fn generate_reply(client: &dyn ChatClient, prompt: &str) -> String {
    match client.complete(prompt).await {
        Ok(resp) => resp.response,
        Err(e) => {
            error!("Chat completion via {} failed: {}", client.get_model(), e);
            format!("Error contacting Ollama: {}", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClient(Result<String, String>);

    #[async_trait]
    impl ChatClient for FixedClient {
        async fn complete(
            &self,
            _prompt: &str
        ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
            match &self.0 {
                Ok(text) => Ok(CompletionResponse { response: text.clone() }),
                Err(msg) => Err(msg.clone().into()),
            }
        }

        fn get_model(&self) -> String {
            "fixed".to_string()
        }

        fn get_base_url(&self) -> Option<String> {
            None
        }
    }

    #[tokio::test]
    async fn reply_passes_through_on_success() {
        let client = FixedClient(Ok("Hi!".to_string()));
        assert_eq!(generate_reply(&client, "hello").await, "Hi!");
    }

    #[tokio::test]
    async fn reply_carries_the_error_on_failure() {
        let client = FixedClient(Err("connection refused".to_string()));
        assert_eq!(
            generate_reply(&client, "hello").await,
            "Error contacting Ollama: connection refused"
        );
    }

    #[test]
    fn factory_applies_adapter_defaults() {
        let client = new_client(&LlmConfig::default()).unwrap();
        assert_eq!(client.get_model(), "llama3.2");
        assert_eq!(client.get_base_url().as_deref(), Some("http://localhost:11434"));
    }
}
