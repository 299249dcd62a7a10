use std::env;
use std::path::Path;

use crate::config::{
    BackendKind, InterpreterSpec, PipelineConfig, RunMode, ScannerSpec, ValidationError,
};
use crate::core::errors::PipelineError;
use crate::core::models::{ClassificationResult, CombinedOutcome, ScanOutcome, TargetScan};
use crate::interpret::{create_interpretor, Interpretor};
use crate::scanner::{NmapEngine, ScanEngine, Scanner};
use crate::storage;

/// Backend kind to credential environment entry. The local backend needs
/// none. A missing entry is not an error here; it surfaces from the backend
/// at call time.
const CREDENTIAL_ENV: &[(BackendKind, &str)] = &[
    (BackendKind::Gpt, "OPENAI_API_KEY"),
    (BackendKind::Gemini, "GOOGLE_API_KEY"),
];

pub fn credential_env(kind: BackendKind) -> Option<&'static str> {
    CREDENTIAL_ENV
        .iter()
        .find(|(candidate, _)| *candidate == kind)
        .map(|(_, name)| *name)
}

/// Composes the scan executor with a chosen interpreter backend. Holds no
/// state between calls; every invocation is request-scoped.
pub struct Runner<E = NmapEngine> {
    scanner: Scanner<E>,
}

impl Runner<NmapEngine> {
    pub fn new() -> Self {
        Self {
            scanner: Scanner::new(NmapEngine::new()),
        }
    }
}

impl Default for Runner<NmapEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ScanEngine> Runner<E> {
    pub fn with_engine(engine: E) -> Self {
        Self {
            scanner: Scanner::new(engine),
        }
    }

    /// Scan-only: one run directory, a sequential pass over every target. A
    /// failing target is recorded as `{target, error}` and never aborts its
    /// siblings.
    pub async fn run_scan(&self, spec: &ScannerSpec) -> Result<ScanOutcome, PipelineError> {
        let scan_dir = storage::create_run_dir(&spec.save_dir)?;
        tracing::info!(
            "scan run started in {} for {} target(s)",
            scan_dir.display(),
            spec.target.len()
        );

        let mut results = Vec::with_capacity(spec.target.len());
        for target in &spec.target {
            let entry = match self.scanner.scan(target, &spec.nmap_args, &scan_dir).await {
                Ok(records) => TargetScan {
                    target: target.clone(),
                    results: Some(records),
                    error: None,
                    nmap_args: spec.nmap_args.clone(),
                },
                Err(err) => {
                    tracing::error!("error scanning target {}: {:#}", target, err);
                    TargetScan {
                        target: target.clone(),
                        results: None,
                        error: Some(format!("{err:#}")),
                        nmap_args: spec.nmap_args.clone(),
                    }
                }
            };
            results.push(entry);
        }

        Ok(ScanOutcome {
            results,
            scan_file_path: storage::scan_file_path(&scan_dir),
            scan_dir_path: scan_dir,
        })
    }

    /// Interpret-only: canonical records are read back from `scan_file` and
    /// the configured backend classifies them into `scan_dir`.
    pub async fn run_interpretation(
        &self,
        spec: &InterpreterSpec,
        scan_file: &Path,
        scan_dir: &Path,
    ) -> Result<ClassificationResult, PipelineError> {
        let records = storage::read_scan_csv(scan_file)?;
        let interpretor = self.build_interpretor(spec)?;
        tracing::info!(
            "interpreting with {} via {} ({} mode)",
            spec.interpretor_type,
            spec.model_flavor,
            spec.interpret_runner
        );

        let result = match spec.interpret_runner {
            RunMode::Normal => interpretor.interpret(&records, scan_dir).await,
            RunMode::Restricted => interpretor.interpret_restricted(&records, scan_dir).await,
            RunMode::Suggest => {
                interpretor
                    .interpret_with_suggestions(&records, scan_dir)
                    .await
            }
        }?;
        Ok(result)
    }

    /// Scan-and-interpret: scan-only for exactly one target, then
    /// interpret-only, scoped to the same run directory.
    pub async fn run_scan_and_interpret(
        &self,
        config: &PipelineConfig,
    ) -> Result<CombinedOutcome, PipelineError> {
        if config.scanner.target.len() != 1 {
            return Err(ValidationError::single(format!(
                "scan-and-interpret takes exactly one target, got {}",
                config.scanner.target.len()
            ))
            .into());
        }

        let raw_results = self.run_scan(&config.scanner).await?;
        let interpreted_results = self
            .run_interpretation(
                &config.interpretor,
                &raw_results.scan_file_path,
                &raw_results.scan_dir_path,
            )
            .await?;

        Ok(CombinedOutcome {
            raw_results,
            interpreted_results,
        })
    }

    fn build_interpretor(
        &self,
        spec: &InterpreterSpec,
    ) -> Result<Box<dyn Interpretor>, PipelineError> {
        let api_key =
            credential_env(spec.interpretor_type).and_then(|name| env::var(name).ok());
        let mut interpretor = create_interpretor(
            spec.interpretor_type,
            spec.interpretor_type.as_str(),
            &spec.model_flavor,
            api_key,
        );
        interpretor.configure().map_err(PipelineError::Other)?;
        Ok(interpretor)
    }
}
