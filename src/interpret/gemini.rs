use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::Interpretor;

const BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// The default content filters reject port-scan text; every category is sent
/// unblocked.
const SAFETY_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_DANGEROUS",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

/// Hosted backend B: Gemini generateContent. The model flavor carries its
/// `models/` prefix straight into the request path.
pub struct GeminiInterpretor {
    name: String,
    model_flavor: String,
    api_key: Option<String>,
    client: Option<Client>,
}

impl GeminiInterpretor {
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

    fn safety_settings() -> Vec<SafetySetting> {
        SAFETY_CATEGORIES
            .iter()
            .map(|category| SafetySetting {
                category: category.to_string(),
                threshold: "BLOCK_NONE".to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl Interpretor for GeminiInterpretor {
    fn name(&self) -> &str {
        &self.name
    }

    fn api_label(&self) -> &'static str {
        "Gemini"
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
        let api_key = self.api_key.as_deref().context("GOOGLE_API_KEY is not set")?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            safety_settings: Self::safety_settings(),
        };

        let url = format!(
            "{BASE_URL}/v1beta/{}:generateContent?key={api_key}",
            self.model_flavor
        );
        let response = client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("failed to reach Gemini")?;
        if !response.status().is_success() {
            anyhow::bail!("Gemini returned {}", response.status());
        }

        let body: GenerateResponse = response
            .json()
            .await
            .context("unexpected Gemini response body")?;
        let text = body
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.trim().to_string())
            .context("no candidates returned")?;
        Ok(text)
    }
}
