// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use supabase_gateway::{
    api::router,
    config::{Settings, TlsPaths},
    state::AppState,
    telemetry::init_tracing,
};
use tracing::{error, info, warn};

/// Grace period for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(settings.log_format);

    let addr = settings.bind_addr;
    let tls = settings.tls.clone();
    let project = settings.project_name.clone();
    let prefix = settings.api_prefix.clone();

    let state = match AppState::new(settings) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to build Supabase client");
            return ExitCode::FAILURE;
        }
    };
    info!(supabase_url = %state.supabase.base_url(), "Supabase client ready");
    let app = router(state);

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    let result = match tls {
        Some(paths) => {
            let config = match load_tls(&paths).await {
                Ok(config) => config,
                Err(e) => {
                    error!(cert = %paths.cert.display(), key = %paths.key.display(), error = %e, "Failed to load TLS certificate");
                    return ExitCode::FAILURE;
                }
            };
            info!(%addr, api_prefix = %prefix, "{project} listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!(%addr, api_prefix = %prefix, "{project} listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    match result {
        Ok(()) => {
            info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn load_tls(paths: &TlsPaths) -> std::io::Result<RustlsConfig> {
    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        warn!("rustls crypto provider was already installed");
    }
    RustlsConfig::from_pem_file(&paths.cert, &paths.key).await
}

async fn shutdown_signal(handle: Handle<std::net::SocketAddr>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
    }
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
