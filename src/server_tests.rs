// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `server.rs`

use super::*;
use axum::body::Body;
use axum::http::Request;
use tower::ServiceExt;

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_healthz_returns_ok() {
    let app = probe_router(CancellationToken::new());
    let req = Request::get("/healthz").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "ok");
}

#[tokio::test]
async fn test_readyz_reports_shutdown() {
    let shutdown = CancellationToken::new();

    let req = Request::get("/readyz").body(Body::empty()).unwrap();
    let resp = probe_router(shutdown.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    shutdown.cancel();
    let req = Request::get("/readyz").body(Body::empty()).unwrap();
    let resp = probe_router(shutdown).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_registry() {
    crate::metrics::record_requeue("ServerTest");

    let req = Request::get("/metrics").body(Body::empty()).unwrap();
    let resp = metrics_router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("ptrsync_requeues_total"));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let req = Request::get("/nope").body(Body::empty()).unwrap();
    let resp = metrics_router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_serve_stops_on_shutdown() {
    let shutdown = CancellationToken::new();
    let address: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let server = tokio::spawn(serve("probe", address, probe_router(shutdown.clone()), shutdown.clone()));

    shutdown.cancel();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}
