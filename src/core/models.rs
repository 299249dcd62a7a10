use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One canonical row per (host, protocol, port) discovered by a single
/// target's scan. Field order matches the canonical CSV header. Repeated
/// scans of the same target may produce duplicate triples; they are kept
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    #[serde(rename = "IP")]
    pub ip: String,
    #[serde(rename = "Protocol")]
    pub protocol: String,
    #[serde(rename = "Port")]
    pub port: u16,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Subdomain")]
    pub subdomain: String,
}

/// Strict result shape produced by every interpreter backend. Either `error`
/// is set or the classification-path fields carry the decoded model output;
/// nulls are serialized explicitly so the artifact always shows all four
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub error: Option<String>,
    pub classification: Option<String>,
    pub analysis_description: Option<String>,
    pub next_arguments: Option<Vec<String>>,
}

impl ClassificationResult {
    pub fn empty() -> Self {
        Self {
            error: None,
            classification: None,
            analysis_description: None,
            next_arguments: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::empty()
        }
    }
}

/// Outcome of scanning one target. Exactly one of `results`/`error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetScan {
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ScanRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub nmap_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub results: Vec<TargetScan>,
    pub scan_file_path: PathBuf,
    pub scan_dir_path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombinedOutcome {
    pub raw_results: ScanOutcome,
    pub interpreted_results: ClassificationResult,
}
