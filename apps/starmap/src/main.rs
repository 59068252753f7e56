//! # Starmap - System/Planet/Station Registry
//!
//! The main binary: tracing setup, banner, then the CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! starmap server --host 0.0.0.0 --port 8080
//!
//! # With a configuration file
//! starmap --config starmap.toml server
//!
//! # Database maintenance
//! starmap init --force
//! starmap status --json-mode
//! ```

use clap::Parser;
use starmap::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // STARMAP_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("STARMAP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "starmap=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
   *  .   STARMAP   .  *
  Systems . Planets . Stations  v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
