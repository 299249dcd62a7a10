pub mod schema;

pub use schema::{
    BackendKind, InterpreterSpec, PipelineConfig, RunMode, ScannerSpec, ValidationError,
    model_flavors, NMAP_ARG_ALLOWLIST,
};
