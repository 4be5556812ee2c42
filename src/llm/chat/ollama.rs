use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use std::error::Error;
use async_trait::async_trait;
use super::{ ChatClient, CompletionResponse };
use crate::llm::LlmConfig;
use log::debug;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2";

#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
}

#[derive(Serialize, Deserialize)]
struct ChatTurn {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatTurn>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatTurn,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, completion_model: Option<String>) -> Self {
        let model = completion_model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into());

        Self {
            http: HttpClient::new(),
            base_url: url.trim_end_matches('/').to_string(),
            completion_model: model,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(Self::new(config.base_url.clone(), config.completion_model.clone()))
    }

    /// Single-turn, non-streaming chat: the prompt goes in as one user message.
    pub async fn chat(&self, prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        let url = format!("{}/api/chat", self.base_url);
        let req = ChatRequest {
            model: self.completion_model.clone(),
            messages: vec![ChatTurn {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
        };
        debug!("POST {} (model {})", url, self.completion_model);
        let resp = self.http.post(&url).json(&req).send().await?.error_for_status()?;
        let data = resp.json::<ChatResponse>().await?;
        Ok(data.message.content)
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(
        &self,
        prompt: &str
    ) -> Result<CompletionResponse, Box<dyn Error + Send + Sync>> {
        let response = self.chat(prompt).await?;
        Ok(CompletionResponse { response })
    }

    fn get_model(&self) -> String {
        self.completion_model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn chat_posts_single_user_turn() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(
                Matcher::PartialJson(
                    json!({
                    "model": "llama3.2",
                    "stream": false,
                    "messages": [{"role": "user", "content": "hello"}]
                })
                )
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"model":"llama3.2","message":{"role":"assistant","content":"Hi there"},"done":true}"#
            )
            .create_async().await;

        let client = OllamaClient::new(Some(format!("{}/", server.url())), None);
        let resp = client.complete("hello").await.unwrap();
        assert_eq!(resp.response, "Hi there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_errors_are_returned() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(404)
            .with_body(r#"{"error":"model 'missing' not found"}"#)
            .create_async().await;

        let client = OllamaClient::new(Some(server.url()), Some("missing".to_string()));
        assert!(client.complete("hello").await.is_err());
    }
}
