// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Discovered-network input.
//!
//! A [`NetworkSource`] enumerates CIDR blocks found at run time, in addition to the
//! inventory and the configured `--cidr` blocks. The production source lists
//! [`ReverseNetwork`] resources in the operator namespace.

use crate::crd::ReverseNetwork;
use crate::errors::DiscoveryError;
use async_trait::async_trait;
use kube::api::ListParams;
use kube::{Api, ResourceExt};
use tracing::debug;

/// A CIDR block found by a [`NetworkSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredNetwork {
    /// Name of the object the block came from, used in logs and skip reports
    pub name: String,
    /// CIDR text as declared, not yet validated
    pub cidr: String,
}

impl DiscoveredNetwork {
    pub fn new(name: impl Into<String>, cidr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cidr: cidr.into(),
        }
    }
}

/// Enumerates discovered network ranges.
#[async_trait]
pub trait NetworkSource: Send + Sync {
    /// List every discovered network, in a stable order.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] if the listing itself fails. Malformed CIDR text
    /// is not an error here; it is reported when the block is expanded.
    async fn list_networks(&self) -> Result<Vec<DiscoveredNetwork>, DiscoveryError>;
}

/// Lists [`ReverseNetwork`] resources from one namespace.
pub struct CrdNetworkSource {
    api: Api<ReverseNetwork>,
    namespace: String,
}

impl CrdNetworkSource {
    #[must_use]
    pub fn new(client: kube::Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
            namespace: namespace.to_string(),
        }
    }
}

#[async_trait]
impl NetworkSource for CrdNetworkSource {
    async fn list_networks(&self) -> Result<Vec<DiscoveredNetwork>, DiscoveryError> {
        let list = self
            .api
            .list(&ListParams::default())
            .await
            .map_err(|e| DiscoveryError {
                scope: self.namespace.clone(),
                reason: e.to_string(),
            })?;

        let networks = to_discovered(list.items);
        debug!(
            namespace = %self.namespace,
            count = networks.len(),
            "Listed ReverseNetworks"
        );
        Ok(networks)
    }
}

/// Convert listed resources into discovered networks ordered by name.
#[must_use]
pub fn to_discovered(resources: Vec<ReverseNetwork>) -> Vec<DiscoveredNetwork> {
    let mut networks: Vec<DiscoveredNetwork> = resources
        .into_iter()
        .map(|rn| DiscoveredNetwork::new(rn.name_any(), rn.spec.cidr))
        .collect();
    networks.sort_by(|a, b| a.name.cmp(&b.name));
    networks
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod discovery_tests;
