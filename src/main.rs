use clap::Parser;
use scansage::app;
use scansage::cli::args::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = app::run(cli).await {
        eprintln!("fatal: {:#}", err);
        std::process::exit(1);
    }
}
