// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the inventory Secret controller.
//!
//! The controller receives an `Arc<Context>` holding everything a reconcile needs:
//! - The configured [`Pipeline`] (sink, extra CIDRs, discovered-network source)
//! - The reference to the watched inventory Secret
//! - The shutdown token that cancels in-flight runs

use crate::pipeline::Pipeline;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Namespace and name of the watched inventory Secret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretRef {
    pub namespace: String,
    pub name: String,
}

impl SecretRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Field selector matching only this Secret.
    #[must_use]
    pub fn field_selector(&self) -> String {
        format!("metadata.name={}", self.name)
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Shared context passed to the controller.
pub struct Context {
    /// The configured pipeline
    pub pipeline: Pipeline,

    /// The inventory Secret
    pub secret: SecretRef,

    /// Cancelled on SIGINT/SIGTERM
    pub shutdown: CancellationToken,
}

impl Context {
    #[must_use]
    pub fn new(pipeline: Pipeline, secret: SecretRef, shutdown: CancellationToken) -> Self {
        Self {
            pipeline,
            secret,
            shutdown,
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
