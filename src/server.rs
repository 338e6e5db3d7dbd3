// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP endpoints for metrics scraping and kubelet probes.
//!
//! | Address | Path | Response |
//! |---|---|---|
//! | metrics | `/metrics` | Prometheus text format |
//! | probe | `/healthz` | `200 ok` while the process runs |
//! | probe | `/readyz` | `200 ok`, `503` once shutdown has begun |
//!
//! Both servers stop gracefully when the shutdown token is cancelled.

use crate::constants::{HEALTHZ_PATH, METRICS_SERVER_PATH, READYZ_PATH};
use crate::metrics::gather_metrics;
use anyhow::{Context as _, Result};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Router serving the Prometheus registry.
pub fn metrics_router() -> Router {
    Router::new().route(METRICS_SERVER_PATH, get(metrics_handler))
}

/// Router serving liveness and readiness probes.
pub fn probe_router(shutdown: CancellationToken) -> Router {
    Router::new()
        .route(HEALTHZ_PATH, get(healthz))
        .route(READYZ_PATH, get(readyz))
        .with_state(shutdown)
}

/// Bind `address` and serve `router` until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(
    name: &str,
    address: SocketAddr,
    router: Router,
    shutdown: CancellationToken,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind {name} server to {address}"))?;
    info!(server = name, address = %address, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
        })
        .await
        .with_context(|| format!("{name} server failed"))?;

    debug!(server = name, "HTTP server stopped");
    Ok(())
}

async fn metrics_handler() -> impl IntoResponse {
    match gather_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                e.to_string(),
            )
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn readyz(State(shutdown): State<CancellationToken>) -> (StatusCode, &'static str) {
    if shutdown.is_cancelled() {
        (StatusCode::SERVICE_UNAVAILABLE, "shutting down")
    } else {
        (StatusCode::OK, "ok")
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod server_tests;
