// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `discovery.rs`

use super::*;
use crate::crd::ReverseNetworkSpec;

fn network(name: &str, cidr: &str) -> ReverseNetwork {
    ReverseNetwork::new(
        name,
        ReverseNetworkSpec {
            cidr: cidr.to_string(),
            description: None,
        },
    )
}

#[test]
fn test_discovered_networks_sorted_by_name() {
    let discovered = to_discovered(vec![
        network("zeta", "10.9.0.0/30"),
        network("alpha", "10.1.0.0/30"),
        network("mid", "not-a-cidr"),
    ]);

    assert_eq!(
        discovered,
        vec![
            DiscoveredNetwork::new("alpha", "10.1.0.0/30"),
            DiscoveredNetwork::new("mid", "not-a-cidr"),
            DiscoveredNetwork::new("zeta", "10.9.0.0/30"),
        ]
    );
}

#[test]
fn test_no_resources_yields_no_networks() {
    assert!(to_discovered(Vec::new()).is_empty());
}
