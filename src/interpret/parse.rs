use serde_json::Value;

use crate::core::models::ClassificationResult;

/// Decodes free-text model output into the strict result shape.
///
/// Extraction takes the first `{` through the last `}` so prose before or
/// after the object is tolerated; the substring itself must decode as strict
/// JSON. `backend` names the backend in the error messages.
pub fn parse_model_output(raw: &str, backend: &str) -> ClassificationResult {
    let (start, end) = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return ClassificationResult::failed(format!(
                "No valid JSON found in {backend} response."
            ));
        }
    };

    let candidate = if start <= end { &raw[start..=end] } else { "" };
    let parsed: Value = match serde_json::from_str(candidate) {
        Ok(value) => value,
        Err(_) => {
            return ClassificationResult::failed(format!(
                "Failed to parse JSON response from {backend}."
            ));
        }
    };

    let mut result = ClassificationResult::empty();
    result.classification = string_field(&parsed, "classification");
    result.analysis_description = string_field(&parsed, "analysis_description");
    // An absent key means "no suggestions"; an explicit null stays null.
    result.next_arguments = match parsed.get("next_arguments") {
        None => Some(Vec::new()),
        Some(Value::Null) => None,
        Some(value) => serde_json::from_value(value.clone()).ok(),
    };
    result
}

fn string_field(parsed: &Value, key: &str) -> Option<String> {
    parsed.get(key).and_then(Value::as_str).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let raw = "noise {\"classification\":\"Completed\",\"analysis_description\":\"ok\",\"next_arguments\":null} trailing";
        let result = parse_model_output(raw, "Ollama");

        assert_eq!(result.error, None);
        assert_eq!(result.classification.as_deref(), Some("Completed"));
        assert_eq!(result.analysis_description.as_deref(), Some("ok"));
        assert_eq!(result.next_arguments, None);
    }

    #[test]
    fn braceless_output_is_a_distinct_error() {
        let result = parse_model_output("nothing structured here", "Gemini");
        assert_eq!(
            result.error.as_deref(),
            Some("No valid JSON found in Gemini response.")
        );
        assert_eq!(result.classification, None);
        assert_eq!(result.analysis_description, None);
        assert_eq!(result.next_arguments, None);
    }

    #[test]
    fn undecodable_substring_is_a_distinct_error() {
        let result = parse_model_output("{not json}", "OpenAI");
        assert_eq!(
            result.error.as_deref(),
            Some("Failed to parse JSON response from OpenAI.")
        );
    }

    #[test]
    fn reversed_braces_fail_the_decode() {
        let result = parse_model_output("} no object here {", "OpenAI");
        assert_eq!(
            result.error.as_deref(),
            Some("Failed to parse JSON response from OpenAI.")
        );
    }

    #[test]
    fn absent_suggestions_default_to_an_empty_sequence() {
        let result = parse_model_output("{\"classification\":\"Incomplete\"}", "Ollama");
        assert_eq!(result.classification.as_deref(), Some("Incomplete"));
        assert_eq!(result.analysis_description, None);
        assert_eq!(result.next_arguments, Some(Vec::new()));
    }

    #[test]
    fn populated_suggestions_are_kept_in_order() {
        let raw = "{\"classification\":\"Incomplete\",\"next_arguments\":[\"-sV\",\"-p\",\"-T4\"]}";
        let result = parse_model_output(raw, "Ollama");
        assert_eq!(
            result.next_arguments,
            Some(vec!["-sV".to_string(), "-p".to_string(), "-T4".to_string()])
        );
    }

    #[test]
    fn foreign_types_decode_to_null() {
        let raw = "{\"classification\":42,\"analysis_description\":[],\"next_arguments\":\"-sV\"}";
        let result = parse_model_output(raw, "Ollama");
        assert_eq!(result.classification, None);
        assert_eq!(result.analysis_description, None);
        assert_eq!(result.next_arguments, None);
        assert_eq!(result.error, None);
    }

    #[test]
    fn markdown_fenced_json_is_tolerated() {
        let raw = "```json\n{\"classification\":\"Completed\"}\n```";
        let result = parse_model_output(raw, "Gemini");
        assert_eq!(result.classification.as_deref(), Some("Completed"));
        assert_eq!(result.error, None);
    }
}
