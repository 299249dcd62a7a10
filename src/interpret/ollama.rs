use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::Interpretor;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

/// Local-model backend. Talks to an Ollama server and needs no credential.
pub struct OllamaInterpretor {
    name: String,
    model_flavor: String,
    base_url: String,
    client: Option<Client>,
}

impl OllamaInterpretor {
    pub fn new(name: impl Into<String>, model_flavor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_flavor: model_flavor.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Interpretor for OllamaInterpretor {
    fn name(&self) -> &str {
        &self.name
    }

    fn api_label(&self) -> &'static str {
        "Ollama"
    }

    fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn configure(&mut self) -> Result<()> {
        self.client = Some(Client::new());
        Ok(())
    }

    async fn complete(&self, prompt: &str, _deterministic: bool) -> Result<String> {
        let client = self.client.as_ref().context("client not configured")?;
        let request = ChatRequest {
            model: self.model_flavor.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
        };

        let response = client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .context("failed to reach Ollama")?;
        if !response.status().is_success() {
            anyhow::bail!("Ollama returned {}", response.status());
        }

        let body: ChatResponse = response
            .json()
            .await
            .context("unexpected Ollama response body")?;
        Ok(body.message.content.trim().to_string())
    }
}
