use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only nmap flags a request may carry.
pub const NMAP_ARG_ALLOWLIST: &[&str] = &["-sS", "-sV", "-sT", "-A", "-T3", "-v", "-p", "-T4"];

/// Model flavors accepted per backend kind.
pub fn model_flavors(kind: BackendKind) -> &'static [&'static str] {
    match kind {
        BackendKind::Gpt => &["gpt-4", "gpt-4o", "gpt-4o-mini", "o1", "o1-mini"],
        BackendKind::Gemini => &[
            "models/gemini-1.5-pro",
            "models/gemini-1.5-flash",
            "models/gemini-1.5-flash-8b",
            "models/gemini-1.0-pro",
        ],
        BackendKind::Ollama => &[
            "llama3.3",
            "llama3.2",
            "llama3.1",
            "llama3",
            "llama2",
            "gemma2",
            "gemma",
            "jimscard/whiterabbit-neo",
            "ALIENTELLIGENCE/cybersecuritythreatanalysis",
        ],
    }
}

/// Malformed or out-of-allowlist request fields. Carries every violation
/// found, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid request: {}", .issues.join("; "))]
pub struct ValidationError {
    pub issues: Vec<String>,
}

impl ValidationError {
    pub fn single(issue: impl Into<String>) -> Self {
        Self {
            issues: vec![issue.into()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Ollama,
    Gpt,
    Gemini,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Ollama => "ollama",
            BackendKind::Gpt => "gpt",
            BackendKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ollama" => Ok(BackendKind::Ollama),
            "gpt" => Ok(BackendKind::Gpt),
            "gemini" => Ok(BackendKind::Gemini),
            other => Err(ValidationError::single(format!(
                "interpretor_type must be one of 'ollama', 'gpt', 'gemini', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Normal,
    Restricted,
    Suggest,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Normal => "normal",
            RunMode::Restricted => "restricted",
            RunMode::Suggest => "suggest",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(RunMode::Normal),
            "restricted" => Ok(RunMode::Restricted),
            "suggest" => Ok(RunMode::Suggest),
            other => Err(ValidationError::single(format!(
                "interpret_runner must be one of 'normal', 'restricted', 'suggest', got '{other}'"
            ))),
        }
    }
}

/// Validated scan request. Construction is the only way in: every field is
/// checked eagerly and no partially-valid value escapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawScannerSpec")]
pub struct ScannerSpec {
    pub nmap_args: Vec<String>,
    pub save_dir: PathBuf,
    pub target: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawScannerSpec {
    nmap_args: Vec<String>,
    save_dir: PathBuf,
    target: Vec<String>,
}

impl TryFrom<RawScannerSpec> for ScannerSpec {
    type Error = ValidationError;

    fn try_from(raw: RawScannerSpec) -> Result<Self, ValidationError> {
        ScannerSpec::new(raw.nmap_args, raw.save_dir, raw.target)
    }
}

impl ScannerSpec {
    pub fn new(
        nmap_args: Vec<String>,
        save_dir: impl Into<PathBuf>,
        target: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let mut issues = Vec::new();
        if nmap_args.is_empty() {
            issues.push("nmap_args must not be empty".to_string());
        }
        for arg in &nmap_args {
            if !NMAP_ARG_ALLOWLIST.contains(&arg.as_str()) {
                issues.push(format!(
                    "nmap_args entry '{arg}' is not allowed; expected one of {NMAP_ARG_ALLOWLIST:?}"
                ));
            }
        }
        if target.is_empty() {
            issues.push("target must contain at least one host".to_string());
        }
        if issues.is_empty() {
            Ok(Self {
                nmap_args,
                save_dir: save_dir.into(),
                target,
            })
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// Validated interpretation request: backend kind, a flavor from that kind's
/// allow-list, and one of the three run modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawInterpreterSpec")]
pub struct InterpreterSpec {
    pub interpretor_type: BackendKind,
    pub model_flavor: String,
    pub interpret_runner: RunMode,
}

#[derive(Debug, Deserialize)]
struct RawInterpreterSpec {
    interpretor_type: String,
    model_flavor: String,
    interpret_runner: String,
}

impl TryFrom<RawInterpreterSpec> for InterpreterSpec {
    type Error = ValidationError;

    fn try_from(raw: RawInterpreterSpec) -> Result<Self, ValidationError> {
        InterpreterSpec::new(&raw.interpretor_type, raw.model_flavor, &raw.interpret_runner)
    }
}

impl InterpreterSpec {
    pub fn new(
        interpretor_type: &str,
        model_flavor: impl Into<String>,
        interpret_runner: &str,
    ) -> Result<Self, ValidationError> {
        let mut issues = Vec::new();

        let kind = match interpretor_type.parse::<BackendKind>() {
            Ok(kind) => Some(kind),
            Err(err) => {
                issues.extend(err.issues);
                None
            }
        };
        let mode = match interpret_runner.parse::<RunMode>() {
            Ok(mode) => Some(mode),
            Err(err) => {
                issues.extend(err.issues);
                None
            }
        };

        let model_flavor = model_flavor.into();
        if let Some(kind) = kind {
            let allowed = model_flavors(kind);
            if !allowed.contains(&model_flavor.as_str()) {
                issues.push(format!(
                    "model_flavor must be one of {allowed:?} for interpretor_type '{kind}'"
                ));
            }
        }

        match (kind, mode) {
            (Some(interpretor_type), Some(interpret_runner)) if issues.is_empty() => Ok(Self {
                interpretor_type,
                model_flavor,
                interpret_runner,
            }),
            _ => Err(ValidationError { issues }),
        }
    }
}

/// Combined request: one scan plus one interpretation over its output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub scanner: ScannerSpec,
    pub interpretor: InterpreterSpec,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn scanner_spec_rejects_unlisted_argument() {
        let err = ScannerSpec::new(
            vec!["-sS".into(), "--script".into()],
            "/tmp/results",
            vec!["10.0.0.1".into()],
        )
        .unwrap_err();
        assert!(err.issues.iter().any(|issue| issue.contains("--script")));
    }

    #[test]
    fn scanner_spec_collects_every_violation() {
        let err = ScannerSpec::new(vec![], "out", vec![]).unwrap_err();
        assert_eq!(err.issues.len(), 2);
    }

    #[test]
    fn scanner_spec_accepts_allowlisted_arguments() {
        let spec = ScannerSpec::new(
            vec!["-sV".into(), "-T4".into()],
            "out",
            vec!["example.com".into()],
        )
        .unwrap();
        assert_eq!(spec.nmap_args, vec!["-sV", "-T4"]);
        assert_eq!(spec.target, vec!["example.com"]);
    }

    #[rstest]
    #[case::gpt("gpt", "gpt-4o")]
    #[case::gpt_reasoning("gpt", "o1-mini")]
    #[case::gemini("gemini", "models/gemini-1.5-pro")]
    #[case::ollama("ollama", "gemma2")]
    #[case::ollama_tuned("ollama", "ALIENTELLIGENCE/cybersecuritythreatanalysis")]
    fn interpreter_spec_accepts_known_flavors(#[case] kind: &str, #[case] flavor: &str) {
        assert!(InterpreterSpec::new(kind, flavor, "normal").is_ok());
    }

    #[rstest]
    #[case("gpt", "models/gemini-1.5-pro")]
    #[case("gemini", "gpt-4")]
    #[case("ollama", "gpt-4o")]
    fn interpreter_spec_rejects_cross_backend_flavors(#[case] kind: &str, #[case] flavor: &str) {
        let err = InterpreterSpec::new(kind, flavor, "normal").unwrap_err();
        assert!(err.issues.iter().any(|issue| issue.contains("model_flavor")));
    }

    #[test]
    fn every_allowlisted_pair_validates() {
        for kind in [BackendKind::Ollama, BackendKind::Gpt, BackendKind::Gemini] {
            for flavor in model_flavors(kind) {
                assert!(
                    InterpreterSpec::new(kind.as_str(), *flavor, "restricted").is_ok(),
                    "{kind} / {flavor} should validate"
                );
            }
        }
    }

    #[test]
    fn unknown_run_mode_is_fatal() {
        let err = InterpreterSpec::new("gpt", "gpt-4", "bogus").unwrap_err();
        assert!(err.issues.iter().any(|issue| issue.contains("interpret_runner")));
    }

    #[test]
    fn unknown_backend_kind_is_fatal() {
        assert!("claude".parse::<BackendKind>().is_err());
    }

    #[test]
    fn deserialization_goes_through_validation() {
        let err = serde_json::from_value::<InterpreterSpec>(serde_json::json!({
            "interpretor_type": "gpt",
            "model_flavor": "gpt-4",
            "interpret_runner": "bogus",
        }));
        assert!(err.is_err());

        let ok = serde_json::from_value::<InterpreterSpec>(serde_json::json!({
            "interpretor_type": "ollama",
            "model_flavor": "llama3.1",
            "interpret_runner": "suggest",
        }))
        .unwrap();
        assert_eq!(ok.interpretor_type, BackendKind::Ollama);
        assert_eq!(ok.interpret_runner, RunMode::Suggest);
    }
}
