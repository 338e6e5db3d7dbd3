// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Delivery of rendered documents to a sink.
//!
//! Two sinks implement [`Sink`]; one is chosen at startup from configuration:
//!
//! - [`configmap::ConfigMapSink`] - idempotent upsert of a served ConfigMap
//! - [`remote::RemotePushSink`] - copy to a remote host over SSH, then reload dnsmasq
//!
//! A sink also declares the [`RenderProfile`] its documents are rendered with, so the
//! pipeline never branches on sink-specific fields.
//!
//! Sinks report failures; they never retry. Re-triggering is the caller's decision.

pub mod configmap;
pub mod remote;
pub mod ssh;

use crate::errors::DeliveryError;
use crate::render::RenderProfile;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::time::Duration;

pub use configmap::{ConfigMapSink, ConfigMapStore};
pub use remote::{RemoteConnector, RemotePushSink, RemoteSession, RemoteTarget};
pub use ssh::SshConnector;

/// What a successful delivery changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The target document did not exist and was created
    Created,
    /// The target document existed with different content and was overwritten
    Updated,
    /// The target document already held the rendered content
    Unchanged,
    /// The document was copied to a remote host and the service reloaded
    Pushed,
}

impl DeliveryOutcome {
    /// Lowercase label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::Pushed => "pushed",
        }
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A destination for rendered documents.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short name used in logs, metrics and timeout errors.
    fn name(&self) -> &'static str;

    /// How documents for this sink are rendered.
    fn render_profile(&self) -> RenderProfile;

    /// Apply a rendered document carrying `records` PTR records.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] naming the failing step.
    async fn deliver(&self, document: &str, records: usize)
        -> Result<DeliveryOutcome, DeliveryError>;
}

/// Run a sink operation under a timeout.
pub(crate) async fn with_timeout<T>(
    sink: &str,
    timeout: Duration,
    operation: impl Future<Output = Result<T, DeliveryError>>,
) -> Result<T, DeliveryError> {
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(DeliveryError::Timeout {
            sink: sink.to_string(),
            timeout_secs: timeout.as_secs(),
        }),
    }
}
