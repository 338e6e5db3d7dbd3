// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `context.rs`

use super::*;

#[test]
fn test_secret_ref_display() {
    let secret = SecretRef::new("test-credentials", "vsphere-config");
    assert_eq!(secret.to_string(), "test-credentials/vsphere-config");
}

#[test]
fn test_secret_ref_field_selector() {
    let secret = SecretRef::new("test-credentials", "vsphere-config");
    assert_eq!(secret.field_selector(), "metadata.name=vsphere-config");
}
