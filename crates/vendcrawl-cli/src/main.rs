use clap::{Parser, Subcommand};

use vendcrawl_core::load_config;

mod crawl;
mod export;
mod status;

#[derive(Debug, Parser)]
#[command(name = "vendcrawl")]
#[command(about = "Resumable vendor catalog crawler")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the crawl, resuming from the persisted checkpoint.
    Crawl,
    /// Show per-region progress from the persisted checkpoint.
    Status,
    /// Re-render the CSV exports from collected records without crawling.
    Export,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config.log_level);

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Crawl) {
        Commands::Crawl => crawl::run(config).await,
        Commands::Status => status::run(&config),
        Commands::Export => export::run(&config),
    }
}

/// `RUST_LOG` wins when set; otherwise the configured level applies.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
