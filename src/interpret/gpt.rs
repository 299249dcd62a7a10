use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::Interpretor;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are a system that classifies scan results as 'Completed', \
    'Incomplete', or 'False Positive Rich', optionally providing additional recommendations \
    based on your analysis.";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Hosted backend A: OpenAI chat completions. Deterministic runs drop the
/// sampling temperature to zero.
pub struct GptInterpretor {
    name: String,
    model_flavor: String,
    api_key: Option<String>,
    client: Option<Client>,
}

impl GptInterpretor {
    pub fn new(
        name: impl Into<String>,
        model_flavor: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model_flavor: model_flavor.into(),
            api_key,
            client: None,
        }
    }
}

pub(crate) fn sampling_temperature(deterministic: bool) -> f32 {
    if deterministic { 0.0 } else { 1.0 }
}

#[async_trait]
impl Interpretor for GptInterpretor {
    fn name(&self) -> &str {
        &self.name
    }

    fn api_label(&self) -> &'static str {
        "OpenAI"
    }

    fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn configure(&mut self) -> Result<()> {
        self.client = Some(Client::new());
        Ok(())
    }

    async fn complete(&self, prompt: &str, deterministic: bool) -> Result<String> {
        let client = self.client.as_ref().context("client not configured")?;
        // A missing key is not rejected earlier; it surfaces here.
        let api_key = self.api_key.as_deref().context("OPENAI_API_KEY is not set")?;

        let request = ChatRequest {
            model: self.model_flavor.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: sampling_temperature(deterministic),
            top_p: 1.0,
        };

        let response = client
            .post(CHAT_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .context("failed to reach OpenAI")?;
        if !response.status().is_success() {
            anyhow::bail!("OpenAI returned {}", response.status());
        }

        let body: ChatResponse = response
            .json()
            .await
            .context("unexpected OpenAI response body")?;
        let content = body
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .context("no completion choices returned")?;
        Ok(content)
    }
}
