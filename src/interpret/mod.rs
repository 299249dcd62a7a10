pub mod factory;
pub mod gemini;
pub mod gpt;
pub mod ollama;
pub mod parse;
pub mod prompts;

pub use factory::create_interpretor;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::models::{ClassificationResult, ScanRecord};
use crate::storage;
use parse::parse_model_output;
use prompts::{render, PromptKind};

pub const NOT_CONFIGURED: &str = "Interpretor not configured.";

/// Capability contract shared by every interpreter backend.
///
/// Backends differ only in how credentials are bound and how the completion
/// call is issued; prompt selection, response parsing, persistence, and the
/// error taxonomy live in the provided methods so they cannot drift between
/// backends.
#[async_trait]
pub trait Interpretor: Send + Sync {
    /// Identity used for the persisted artifact (`<name>_results.json`).
    fn name(&self) -> &str;

    /// Label used in error messages ("Ollama", "OpenAI", "Gemini").
    fn api_label(&self) -> &'static str;

    fn is_configured(&self) -> bool;

    /// Binds credential/client state. Call exactly once before interpreting.
    fn configure(&mut self) -> Result<()>;

    /// Issues the underlying completion call and returns the raw model text.
    /// `deterministic` requests reproducible sampling where the backend has
    /// such a control.
    async fn complete(&self, prompt: &str, deterministic: bool) -> Result<String>;

    async fn interpret(
        &self,
        records: &[ScanRecord],
        save_dir: &Path,
    ) -> Result<ClassificationResult> {
        self.run(records, save_dir, PromptKind::Default, false).await
    }

    async fn interpret_restricted(
        &self,
        records: &[ScanRecord],
        save_dir: &Path,
    ) -> Result<ClassificationResult> {
        self.run(records, save_dir, PromptKind::Restricted, true)
            .await
    }

    async fn interpret_with_suggestions(
        &self,
        records: &[ScanRecord],
        save_dir: &Path,
    ) -> Result<ClassificationResult> {
        self.run(records, save_dir, PromptKind::WithSuggestions, false)
            .await
    }

    /// Shared interpretation path: configured check, prompt render, completion
    /// call, tolerant parse, persist-then-return. An unconfigured backend
    /// short-circuits before any network state is touched.
    async fn run(
        &self,
        records: &[ScanRecord],
        save_dir: &Path,
        kind: PromptKind,
        deterministic: bool,
    ) -> Result<ClassificationResult> {
        let result = if !self.is_configured() {
            ClassificationResult::failed(NOT_CONFIGURED)
        } else {
            let prompt = render(kind, records)?;
            match self.complete(&prompt, deterministic).await {
                Ok(raw) => parse_model_output(&raw, self.api_label()),
                Err(err) => ClassificationResult::failed(format!(
                    "Error with {} API: {err:#}.",
                    self.api_label()
                )),
            }
        };
        storage::write_result_artifact(&result, self.name(), save_dir)?;
        Ok(result)
    }
}
