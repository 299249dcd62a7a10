use std::collections::HashMap;

use anyhow::Result;
use once_cell::sync::Lazy;

use crate::core::models::ScanRecord;

/// Selects which template and response shape an interpretation call uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Default,
    Restricted,
    WithSuggestions,
}

/// Process-wide template table, loaded once and never mutated.
static PROMPTS: Lazy<HashMap<PromptKind, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            PromptKind::Default,
            "Classify the following nmap scan results as Completed, Incomplete, or False Positive Rich.\n\
             Provide a single JSON object API response for the response with the following fields:\n\
             1. 'classification': The classification result.\n\
             2. 'analysis_description': A detailed explanation of the classification decision.\n\
             3. 'next_arguments': keep it NULL.\n\
             IT IS MISSION CRITICAL THAT YOU NOT ADD ANY COMMENTS TO THE JSON OBJECT.\n\n{scan_results}",
        ),
        (
            PromptKind::Restricted,
            "Classify the following nmap scan results into one of the following categories:\n\
             'Completed', 'Incomplete', or 'False Positive Rich'.\n\
             Do not provide any details, only return the category name in a single JSON object API \
             response following this structure:\n\
             1. 'classification': The classification result.\n\
             2. 'analysis_description': keep it NULL.\n\
             3. 'next_arguments': keep it NULL.\n\
             IT IS MISSION CRITICAL THAT YOU NOT ADD ANY COMMENTS TO THE JSON OBJECT.\n\n{scan_results}",
        ),
        (
            PromptKind::WithSuggestions,
            "Classify the following nmap scan results as Completed, Incomplete, or False Positive Rich.\n\
             Prepare a single JSON object that will be returned as an API Response with the following fields:\n\
             1. 'classification': The classification result.\n\
             2. 'analysis_description': A detailed explanation of the classification decision.\n\
             3. 'next_arguments': An array of recommended nmap arguments for the next nmap scan.\n\
             IT IS MISSION CRITICAL THAT YOU NOT ADD ANY COMMENTS TO THE JSON OBJECT.\n\n{scan_results}",
        ),
    ])
});

/// Renders the template for `kind` with the serialized record set substituted
/// in.
pub fn render(kind: PromptKind, records: &[ScanRecord]) -> Result<String> {
    let template = PROMPTS
        .get(&kind)
        .copied()
        .ok_or_else(|| anyhow::anyhow!("no prompt template registered for {kind:?}"))?;
    let serialized = serde_json::to_string_pretty(records)?;
    Ok(template.replace("{scan_results}", &serialized))
}
