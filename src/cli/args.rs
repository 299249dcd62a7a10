use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "scansage",
    version,
    about = "Scan hosts with nmap and classify the results with a language-model interpreter"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose human output
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Debug logs (implies verbose)
    #[arg(short = 'd', long = "debug", global = true, action = ArgAction::SetTrue)]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run nmap against one or more targets and persist canonical records
    Scan(ScanArgs),

    /// Classify a previously written canonical scan file
    Interpret(InterpretArgs),

    /// Scan a single target, then classify the results
    Run {
        #[command(flatten)]
        scan: ScanArgs,
        #[command(flatten)]
        interpret: InterpretModeArgs,
    },

    /// Enumerate known subdomains for a domain
    Discover {
        /// Domain to enumerate
        #[arg(long = "domain")]
        domain: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Target host/IP/domain (repeatable)
    #[arg(short = 't', long = "target", required = true)]
    pub target: Vec<String>,

    /// Nmap argument from the allowed set (repeatable)
    #[arg(short = 'a', long = "nmap-arg", required = true)]
    pub nmap_args: Vec<String>,

    /// Directory that receives the timestamped run directory
    #[arg(long = "save-dir", default_value = "./results")]
    pub save_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct InterpretModeArgs {
    /// Interpreter backend: ollama, gpt, or gemini
    #[arg(long = "interpretor")]
    pub interpretor_type: String,

    /// Model flavor for the chosen backend
    #[arg(long = "flavor")]
    pub model_flavor: String,

    /// Run mode: normal, restricted, or suggest
    #[arg(long = "mode", default_value = "normal")]
    pub interpret_runner: String,
}

#[derive(Args, Debug, Clone)]
pub struct InterpretArgs {
    #[command(flatten)]
    pub mode: InterpretModeArgs,

    /// Canonical scan file written by a previous scan
    #[arg(long = "scan-file")]
    pub scan_file: PathBuf,

    /// Run directory that receives the result artifact
    #[arg(long = "scan-dir")]
    pub scan_dir: PathBuf,
}
