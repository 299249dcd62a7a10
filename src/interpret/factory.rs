use crate::config::BackendKind;

use super::gemini::GeminiInterpretor;
use super::gpt::GptInterpretor;
use super::ollama::OllamaInterpretor;
use super::Interpretor;

/// Selects and constructs a backend by kind tag. Credentials are threaded in
/// explicitly; only the hosted backends use one.
pub fn create_interpretor(
    kind: BackendKind,
    name: &str,
    model_flavor: &str,
    api_key: Option<String>,
) -> Box<dyn Interpretor> {
    match kind {
        BackendKind::Ollama => Box::new(OllamaInterpretor::new(name, model_flavor)),
        BackendKind::Gpt => Box::new(GptInterpretor::new(name, model_flavor, api_key)),
        BackendKind::Gemini => Box::new(GeminiInterpretor::new(name, model_flavor, api_key)),
    }
}
