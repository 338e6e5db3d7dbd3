// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for discovered networks.
//!
//! # Resource Types
//!
//! - [`ReverseNetwork`] - a CIDR block whose every address gets a PTR record
//!
//! `ReverseNetwork`s are the discovered-network input of the pipeline. They are
//! listed from the operator namespace in name order and expanded after the
//! `--cidr` blocks, so the inventory and ad-hoc ranges take priority.
//!
//! # Example
//!
//! ```rust,no_run
//! use ptrsync::crd::ReverseNetworkSpec;
//!
//! let spec = ReverseNetworkSpec {
//!     cidr: "10.20.0.0/24".to_string(),
//!     description: Some("CI workload subnet".to_string()),
//! };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `ReverseNetwork` declares a CIDR block to publish reverse-lookup names for.
///
/// # Example
///
/// ```yaml
/// apiVersion: ptrsync.io/v1alpha1
/// kind: ReverseNetwork
/// metadata:
///   name: ci-workloads
///   namespace: vsphere-infra-helpers
/// spec:
///   cidr: 10.20.0.0/24
///   description: CI workload subnet
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "ptrsync.io",
    version = "v1alpha1",
    kind = "ReverseNetwork",
    namespaced,
    shortname = "rnet",
    printcolumn = r#"{"name":"CIDR","type":"string","jsonPath":".spec.cidr"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#,
    doc = "ReverseNetwork declares a CIDR block whose addresses are published as PTR records in the managed dnsmasq configuration."
)]
#[serde(rename_all = "camelCase")]
pub struct ReverseNetworkSpec {
    /// CIDR block in `address/prefix` form (e.g. "10.20.0.0/24", "fd00::/120").
    ///
    /// Blocks larger than 2^20 addresses are skipped by the pipeline.
    pub cidr: String,

    /// Free-form note about what the block is used for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
