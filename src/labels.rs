// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label and annotation constants applied to resources ptrsync writes.

use std::collections::BTreeMap;

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the component name within the architecture
pub const K8S_COMPONENT: &str = "app.kubernetes.io/component";

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Standard label for the name of a higher-level application this one is part of
pub const K8S_PART_OF: &str = "app.kubernetes.io/part-of";

// ============================================================================
// Label Values
// ============================================================================

/// Value for `app.kubernetes.io/managed-by` on everything ptrsync creates
pub const MANAGED_BY_PTRSYNC: &str = "ptrsync";

/// Value for `app.kubernetes.io/part-of`
pub const PART_OF_DNSMASQ: &str = "dnsmasq";

/// Component value for the rendered dnsmasq configuration
pub const COMPONENT_DNS_CONFIG: &str = "dns-config";

// ============================================================================
// ptrsync-Specific Annotations
// ============================================================================

/// Annotation recording how many PTR records the rendered document contains
pub const RECORD_COUNT_ANNOTATION: &str = "ptrsync.io/record-count";

/// Labels stamped on the rendered dnsmasq ConfigMap.
#[must_use]
pub fn dns_config_labels() -> BTreeMap<String, String> {
    BTreeMap::from([
        (K8S_MANAGED_BY.to_string(), MANAGED_BY_PTRSYNC.to_string()),
        (K8S_PART_OF.to_string(), PART_OF_DNSMASQ.to_string()),
        (K8S_COMPONENT.to_string(), COMPONENT_DNS_CONFIG.to_string()),
    ])
}

#[cfg(test)]
#[path = "labels_tests.rs"]
mod labels_tests;
