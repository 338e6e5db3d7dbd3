// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use futures::StreamExt;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::{
    runtime::{controller::Action, reflector::ObjectRef, watcher::Config as WatcherConfig, Controller},
    Api, Client, ResourceExt,
};
use ptrsync::{
    config::{Config, SinkKind},
    constants::{ERROR_REQUEUE_DURATION_SECS, TOKIO_WORKER_THREADS},
    context::{Context, SecretRef},
    crd::ReverseNetwork,
    delivery::{ConfigMapSink, RemotePushSink, Sink, SshConnector},
    discovery::CrdNetworkSource,
    errors::PipelineError,
    metrics,
    pipeline::Pipeline,
    reconcilers::reconcile_secret,
    server,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    let config = Config::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("ptrsync-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

/// Initialize logging.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`json` or `text`).
fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(config: Config) -> Result<()> {
    init_logging();

    info!(
        sink = ?config.sink,
        secret_namespace = %config.secret_namespace,
        secret_name = %config.secret_name,
        namespace = %config.namespace,
        cidrs = ?config.additional_cidrs(),
        discover_networks = config.discover_networks,
        "Starting PTR record operator"
    );

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!(error = %e, "Failed to listen for shutdown signals"),
        }
        signal_token.cancel();
    });

    let metrics_server = tokio::spawn(server::serve(
        "metrics",
        config.metrics_bind_address,
        server::metrics_router(),
        shutdown.clone(),
    ));
    let probe_server = tokio::spawn(server::serve(
        "probe",
        config.health_probe_bind_address,
        server::probe_router(shutdown.clone()),
        shutdown.clone(),
    ));

    let pipeline = build_pipeline(&config, &client);
    let ctx = Arc::new(Context::new(
        pipeline,
        SecretRef::new(&config.secret_namespace, &config.secret_name),
        shutdown.clone(),
    ));

    let result = run_secret_controller(client, ctx, &config).await;
    shutdown.cancel();

    for handle in [metrics_server, probe_server] {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "HTTP server exited with error"),
            Err(e) => warn!(error = %e, "HTTP server task failed"),
        }
    }

    info!("PTR record operator stopped");
    result
}

/// Assemble the pipeline for the configured sink.
fn build_pipeline(config: &Config, client: &Client) -> Pipeline {
    let timeout = config.delivery_timeout();
    let sink: Arc<dyn Sink> = match config.sink {
        SinkKind::Configmap => Arc::new(ConfigMapSink::new(
            Api::<ConfigMap>::namespaced(client.clone(), &config.namespace),
            &config.namespace,
            timeout,
        )),
        SinkKind::Remote => Arc::new(RemotePushSink::new(
            SshConnector::new(),
            config.remote_target(),
            timeout,
        )),
    };
    debug!(sink = sink.name(), "Delivery sink configured");

    let pipeline = Pipeline::new(sink, config.additional_cidrs());
    if config.discover_networks {
        pipeline.with_discovery(Arc::new(CrdNetworkSource::new(
            client.clone(),
            &config.namespace,
        )))
    } else {
        pipeline
    }
}

/// Run the inventory Secret controller until shutdown.
async fn run_secret_controller(client: Client, ctx: Arc<Context>, config: &Config) -> Result<()> {
    info!(secret = %ctx.secret, "Starting inventory Secret controller");

    let secrets = Api::<Secret>::namespaced(client.clone(), &ctx.secret.namespace);
    let watcher_config = WatcherConfig::default().fields(&ctx.secret.field_selector());
    let mut controller = Controller::new(secrets, watcher_config);

    if config.discover_networks {
        debug!(namespace = %config.namespace, "Watching ReverseNetworks");
        let networks = Api::<ReverseNetwork>::namespaced(client, &config.namespace);
        let secret = ctx.secret.clone();
        controller = controller.watches(networks, WatcherConfig::default(), move |network| {
            debug!(network = %network.name_any(), "ReverseNetwork changed, re-triggering inventory");
            Some(ObjectRef::<Secret>::new(&secret.name).within(&secret.namespace))
        });
    }

    let shutdown = ctx.shutdown.clone();
    controller
        .graceful_shutdown_on(async move { shutdown.cancelled().await })
        .run(reconcile_secret_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

async fn reconcile_secret_wrapper(
    secret: Arc<Secret>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    match reconcile_secret(&ctx, &secret).await {
        Ok(_) => Ok(Action::await_change()),
        Err(e) if e.is_cancelled() => {
            info!(secret = %secret.name_any(), "Reconciliation cancelled by shutdown");
            Ok(Action::await_change())
        }
        Err(e) => {
            error!(
                secret = %secret.name_any(),
                reason = e.status_reason(),
                error = %e,
                "Failed to publish PTR records"
            );
            Err(anyhow::Error::from(e).into())
        }
    }
}

/// Requeue failed reconciliations; the pipeline never retries by itself.
fn error_policy(_secret: Arc<Secret>, err: &ReconcileError, _ctx: Arc<Context>) -> Action {
    let reason = err
        .0
        .downcast_ref::<PipelineError>()
        .map_or("Unknown", PipelineError::status_reason);
    metrics::record_requeue(reason);
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
