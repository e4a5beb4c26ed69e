use anyhow::Result;
use boi_exchange::log::init_logging;
use clap::Parser;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long)]
    config_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = boi_exchange::run(cli.config_path.as_deref()).await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Server failed");
    }
    result
}
