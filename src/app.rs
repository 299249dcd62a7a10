use anyhow::Result;

use crate::cli::args::{Cli, Command, InterpretModeArgs, ScanArgs};
use crate::config::{InterpreterSpec, PipelineConfig, ScannerSpec};
use crate::discovery;
use crate::pipeline::Runner;
use crate::utils::logging;

pub async fn run(cli: Cli) -> Result<()> {
    logging::init(cli.verbose, cli.debug)?;

    match cli.command {
        Command::Scan(args) => {
            let spec = scanner_spec(&args)?;
            let outcome = Runner::new().run_scan(&spec).await?;
            print_json(&outcome)
        }
        Command::Interpret(args) => {
            let spec = interpreter_spec(&args.mode)?;
            let result = Runner::new()
                .run_interpretation(&spec, &args.scan_file, &args.scan_dir)
                .await?;
            print_json(&result)
        }
        Command::Run { scan, interpret } => {
            let config = PipelineConfig {
                scanner: scanner_spec(&scan)?,
                interpretor: interpreter_spec(&interpret)?,
            };
            let outcome = Runner::new().run_scan_and_interpret(&config).await?;
            print_json(&outcome)
        }
        Command::Discover { domain } => {
            let subdomains = discovery::enumerate_subdomains(&domain)?;
            print_json(&serde_json::json!({
                "domain": domain,
                "subdomains": subdomains,
            }))
        }
    }
}

fn scanner_spec(args: &ScanArgs) -> Result<ScannerSpec> {
    Ok(ScannerSpec::new(
        args.nmap_args.clone(),
        args.save_dir.clone(),
        args.target.clone(),
    )?)
}

fn interpreter_spec(args: &InterpretModeArgs) -> Result<InterpreterSpec> {
    Ok(InterpreterSpec::new(
        &args.interpretor_type,
        args.model_flavor.clone(),
        &args.interpret_runner,
    )?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
