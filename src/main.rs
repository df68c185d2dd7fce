//! Body-logging reverse proxy.
//!
//! ```text
//!     client ──▶ handler ──▶ proxy core ──▶ director ──▶ upstream
//!               (log req)                                   │
//!     client ◀────────────── interceptor (log resp) ◀───────┘
//! ```
//!
//! Usage: `body-logging-proxy --dest http://localhost:9000 --port 8080`

use clap::Parser;
use std::process::ExitCode;

use body_logging_proxy::config::{validate, Cli};
use body_logging_proxy::lifecycle::{signals, Shutdown};
use body_logging_proxy::{net, BodyLogger, BootstrapError, HttpServer};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let logger = BodyLogger::stdout();

    match run(cli, &logger).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger.error("Fatal error", &e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, logger: &BodyLogger) -> Result<(), BootstrapError> {
    let config = validate(&cli)?;
    let listener = net::bind(&config.listener).await?;

    logger.startup(config.listener.port, cli.dest.trim());

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    HttpServer::new(&config, logger.clone())
        .run(listener, server_shutdown)
        .await?;

    logger.in_scope(|| tracing::info!("Shutdown complete"));
    Ok(())
}
