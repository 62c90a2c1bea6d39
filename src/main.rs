//! Tabserve - serve windows of a static dataset over HTTP

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use argh::FromArgs;
use tracing_subscriber::EnvFilter;

use tabserve::config::{ServerConfig, DEFAULT_BIND, DEFAULT_FAILURE_PROBABILITY};
use tabserve::server;

/// Tabserve - read-only HTTP API over a static tabular dataset
#[derive(FromArgs)]
struct Args {
    /// path to the dataset file (.csv, .tsv, .jsonl or .parquet)
    #[argh(option, short = 'd', default = "PathBuf::from(tabserve::config::DEFAULT_DATA_PATH)")]
    data: PathBuf,

    /// address to listen on (default: 127.0.0.1:5000)
    #[argh(option, short = 'b', default = "DEFAULT_BIND")]
    bind: SocketAddr,

    /// probability in [0, 1] that a /faulty request fails (default: 0.5)
    #[argh(option, short = 'p', default = "DEFAULT_FAILURE_PROBABILITY")]
    failure_probability: f64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            data_path: args.data,
            bind: args.bind,
            failure_probability: args.failure_probability,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = argh::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = server::serve(ServerConfig::from(args)).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
