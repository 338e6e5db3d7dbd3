// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `labels.rs`

use super::*;

#[test]
fn test_dns_config_labels() {
    let labels = dns_config_labels();
    assert_eq!(labels.len(), 3);
    assert_eq!(labels[K8S_MANAGED_BY], "ptrsync");
    assert_eq!(labels[K8S_PART_OF], "dnsmasq");
    assert_eq!(labels[K8S_COMPONENT], "dns-config");
}
