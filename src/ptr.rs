// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! PTR record synthesis.
//!
//! Converts an IP address into its canonical reverse-lookup name:
//!
//! - IPv4 `10.0.0.1` → `1.0.0.10.in-addr.arpa.`
//! - IPv6 `2001:db8::1` → `1.0.0.0. ... .8.b.d.0.1.0.0.2.ip6.arpa.` (32 nibbles)
//!
//! IPv4-mapped IPv6 addresses (`::ffff:10.0.0.1`) are reversed under `in-addr.arpa.`.

use crate::constants::{IPV4_REVERSE_ZONE, IPV6_REVERSE_ZONE};
use crate::errors::ReverseNameError;
use std::fmt::Write as _;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// A reverse-lookup record: the address as supplied plus its reverse name.
///
/// How the record is printed (reverse name alone, or address and name) is chosen
/// by the sink's render profile, not by the record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PtrRecord {
    address: String,
    reverse_name: String,
}

impl PtrRecord {
    /// Build a record for an already-parsed address.
    #[must_use]
    pub fn from_ip(ip: IpAddr) -> Self {
        Self {
            address: ip.to_string(),
            reverse_name: reverse_name(ip),
        }
    }

    /// The original address text.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The fully-qualified reverse-lookup name, with trailing dot.
    #[must_use]
    pub fn reverse_name(&self) -> &str {
        &self.reverse_name
    }
}

/// Synthesize the PTR record for an address given as text.
///
/// The original text is kept verbatim in the record.
///
/// # Errors
///
/// Returns [`ReverseNameError`] if `address` is not an IPv4 or IPv6 address.
pub fn to_record(address: &str) -> Result<PtrRecord, ReverseNameError> {
    let ip: IpAddr = address.parse().map_err(|_| ReverseNameError {
        address: address.to_string(),
    })?;

    Ok(PtrRecord {
        address: address.to_string(),
        reverse_name: reverse_name(ip),
    })
}

/// Compute the reverse-lookup name for an address.
#[must_use]
pub fn reverse_name(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => reverse_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => reverse_v4(v4),
            None => reverse_v6(v6),
        },
    }
}

fn reverse_v4(ip: Ipv4Addr) -> String {
    let reversed: Vec<String> = ip.octets().iter().rev().map(u8::to_string).collect();
    format!("{}.{IPV4_REVERSE_ZONE}", reversed.join("."))
}

fn reverse_v6(ip: Ipv6Addr) -> String {
    let mut name = String::with_capacity(72);
    for byte in ip.octets().iter().rev() {
        // Low nibble first: the byte order is already reversed
        let _ = write!(name, "{:x}.{:x}.", byte & 0x0F, byte >> 4);
    }
    name.push_str(IPV6_REVERSE_ZONE);
    name
}

#[cfg(test)]
#[path = "ptr_tests.rs"]
mod ptr_tests;
