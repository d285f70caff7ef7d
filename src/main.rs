//! news-relay binary
//!
//! Usage:
//!   news-relay --config news-relay.json
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use clap::Parser;
use news_relay::{App, Config, run_with_shutdown};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "news-relay", version, about)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "news-relay.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!(config = %args.config.display(), "starting news-relay");

    let config = Config::from_file(&args.config).await?;
    let app = App::new(config).await?;
    run_with_shutdown(app).await?;

    info!("news-relay stopped");
    Ok(())
}
