//! # linehttp server
//!
//! This binary crate serves a tiny router on top of the library in this crate.
//!
//! `GET /` answers `Gopher!!`, everything else is `404 Not Found`. Every connection carries a single
//! request and is closed after the response.
use std::{process::ExitCode, sync::Arc};

use linehttp::{
    config::ServerConfig,
    http::{
        request::{HttpError, Request},
        response::{Response, StatusCode},
    },
    runtime::{handler::Handler, server::serve},
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Body of the only route.
const GOPHER_BODY: &str = "Gopher!!";

struct GopherRouter;

impl Handler for GopherRouter {
    async fn call(&self, request: &Request) -> Result<Response, HttpError> {
        if request.method() == "GET" && request.path() == "/" {
            Ok(Response::new(StatusCode::Ok, GOPHER_BODY))
        } else {
            Ok(Response::new(StatusCode::NotFound, Vec::new()))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server = match serve(&config, Arc::new(GopherRouter)).await {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, host = %config.host, port = config.port, "failed to create the listener");
            return ExitCode::FAILURE;
        }
    };
    info!(address = %server.local_addr(), "started the listener, hit CTRL+C to quit");

    if let Err(e) = shutdown_signal().await {
        error!(error = %e, "failed to listen for shutdown signals");
    }

    server.close();
    server.wait().await;
    info!("Bubye fellow gophers!");
    ExitCode::SUCCESS
}

/// Resolves on Ctrl-C or SIGTERM.
#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

/// Resolves on Ctrl-C.
#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
