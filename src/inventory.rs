// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Subnet inventory parsing.
//!
//! The inventory is a JSON document shaped as `group → subnet → Subnet`:
//!
//! ```json
//! {
//!   "ci-vlan-1": {
//!     "subnet-a": {
//!       "gateway": "10.0.0.254",
//!       "ipAddresses": ["10.0.0.1", "10.0.0.2"]
//!     }
//!   }
//! }
//! ```
//!
//! Group and subnet keys are arbitrary. Only `ipAddresses` is consumed; every other
//! leaf field is carried as opaque metadata. Both mapping levels are `BTreeMap`s, so
//! records come out ordered by group name, then subnet name, then list position.

use crate::errors::ParseError;
use crate::ptr::{to_record, PtrRecord};
use crate::record_set::RecordSet;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// A single subnet entry of the inventory.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    /// Individually-assigned addresses, in inventory order
    pub ip_addresses: Vec<String>,

    /// All other fields (gateway, mask, priority, IPv6 companions, ...)
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Subnet {
    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Gateway address, if present and a string.
    #[must_use]
    pub fn gateway(&self) -> Option<&str> {
        self.metadata_str("gateway")
    }

    /// Network address, if present and a string.
    #[must_use]
    pub fn network(&self) -> Option<&str> {
        self.metadata_str("network")
    }

    /// Dotted netmask, if present and a string.
    #[must_use]
    pub fn mask(&self) -> Option<&str> {
        self.metadata_str("mask")
    }

    /// Virtual-center tag, if present and a string.
    #[must_use]
    pub fn virtual_center(&self) -> Option<&str> {
        self.metadata_str("virtualcenter")
    }

    /// IPv6 prefix companion, if present and a string.
    #[must_use]
    pub fn ipv6_prefix(&self) -> Option<&str> {
        self.metadata_str("ipv6prefix")
    }

    /// Prefix length, if present and an integer.
    #[must_use]
    pub fn cidr(&self) -> Option<i64> {
        self.metadata.get("cidr").and_then(Value::as_i64)
    }

    /// Priority, if present and an integer.
    #[must_use]
    pub fn priority(&self) -> Option<i64> {
        self.metadata.get("priority").and_then(Value::as_i64)
    }
}

/// A decoded inventory: group name → subnet name → [`Subnet`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inventory {
    groups: BTreeMap<String, BTreeMap<String, Subnet>>,
}

impl Inventory {
    /// Decode and validate an inventory document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidDocument`] if the text is not a two-level JSON
    /// mapping, or [`ParseError::InvalidSubnet`] for the first leaf whose
    /// `ipAddresses` is missing or not a list of strings.
    pub fn from_json(document: &str) -> Result<Self, ParseError> {
        let raw: BTreeMap<String, BTreeMap<String, Value>> = serde_json::from_str(document)
            .map_err(|e| ParseError::InvalidDocument {
                reason: e.to_string(),
            })?;

        let mut groups = BTreeMap::new();
        for (group, subnets) in raw {
            let mut decoded = BTreeMap::new();
            for (name, leaf) in subnets {
                let subnet = decode_subnet(&group, &name, leaf)?;
                decoded.insert(name, subnet);
            }
            groups.insert(group, decoded);
        }

        Ok(Self { groups })
    }

    /// Iterate over `(group, subnet name, subnet)` in deterministic order.
    pub fn subnets(&self) -> impl Iterator<Item = (&str, &str, &Subnet)> {
        self.groups.iter().flat_map(|(group, subnets)| {
            subnets
                .iter()
                .map(move |(name, subnet)| (group.as_str(), name.as_str(), subnet))
        })
    }

    /// Number of groups in the inventory.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Synthesize a PTR record for every listed address.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidAddress`] for the first address that cannot be
    /// reversed.
    pub fn records(&self) -> Result<Vec<PtrRecord>, ParseError> {
        let mut records = Vec::new();
        for (group, name, subnet) in self.subnets() {
            for address in &subnet.ip_addresses {
                let record = to_record(address).map_err(|source| ParseError::InvalidAddress {
                    group: group.to_string(),
                    subnet: name.to_string(),
                    source,
                })?;
                records.push(record);
            }
        }
        Ok(records)
    }
}

fn decode_subnet(group: &str, name: &str, leaf: Value) -> Result<Subnet, ParseError> {
    let invalid = |reason: String| ParseError::InvalidSubnet {
        group: group.to_string(),
        subnet: name.to_string(),
        reason,
    };

    match &leaf {
        Value::Object(fields) if !fields.contains_key("ipAddresses") => {
            return Err(invalid("missing field `ipAddresses`".to_string()));
        }
        Value::Object(_) => {}
        other => {
            return Err(invalid(format!(
                "expected an object, found {}",
                json_kind(other)
            )))
        }
    }

    serde_json::from_value(leaf).map_err(|e| invalid(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse an inventory document straight into a [`RecordSet`].
///
/// Duplicate addresses inside the inventory collapse to their first occurrence.
///
/// # Errors
///
/// Returns [`ParseError`] if the document or any leaf is malformed. No partial
/// result is returned.
pub fn parse(document: &str) -> Result<RecordSet, ParseError> {
    let inventory = Inventory::from_json(document)?;
    let records = inventory.records()?;
    debug!(
        groups = inventory.group_count(),
        records = records.len(),
        "Parsed subnet inventory"
    );
    Ok(RecordSet::from_records(records))
}

#[cfg(test)]
#[path = "inventory_tests.rs"]
mod inventory_tests;
