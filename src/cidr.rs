// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CIDR block expansion.
//!
//! Enumerates every address in a block, network and broadcast addresses included.
//! Callers that need only usable hosts must filter the result.
//!
//! Enumeration starts at the masked network address and increments the address as a
//! fixed-width big-endian counter (least-significant byte first, carrying into more
//! significant bytes) until the address leaves the block. The same code path serves
//! 4-byte and 16-byte families.

use crate::constants::MAX_EXPANSION_ADDRESSES;
use crate::errors::InvalidCidrError;
use ipnet::IpNet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::debug;

/// Parse a CIDR string. Host bits may be set; they are masked off on expansion.
///
/// # Errors
///
/// Returns [`InvalidCidrError::Malformed`] if `cidr` is not `address/prefix`.
pub fn parse_cidr(cidr: &str) -> Result<IpNet, InvalidCidrError> {
    cidr.parse::<IpNet>()
        .map_err(|e| InvalidCidrError::Malformed {
            cidr: cidr.to_string(),
            reason: e.to_string(),
        })
}

/// Expand a CIDR string into every address it contains, in ascending order.
///
/// # Errors
///
/// Returns [`InvalidCidrError`] if the text is malformed or the block holds more than
/// [`MAX_EXPANSION_ADDRESSES`] addresses.
pub fn expand(cidr: &str) -> Result<Vec<IpAddr>, InvalidCidrError> {
    let network = parse_cidr(cidr)?;
    let host_bits = network.max_prefix_len() - network.prefix_len();

    if host_bits >= usize::BITS as u8 || (1usize << host_bits) > MAX_EXPANSION_ADDRESSES {
        return Err(InvalidCidrError::TooLarge {
            cidr: cidr.to_string(),
            host_bits,
            limit: MAX_EXPANSION_ADDRESSES,
        });
    }

    debug!(cidr = %cidr, network = %network.trunc(), "Expanding CIDR");

    let addresses = match network.network() {
        IpAddr::V4(start) => walk(start.octets(), |octets| {
            let ip = IpAddr::V4(Ipv4Addr::from(octets));
            network.contains(&ip).then_some(ip)
        }),
        IpAddr::V6(start) => walk(start.octets(), |octets| {
            let ip = IpAddr::V6(Ipv6Addr::from(octets));
            network.contains(&ip).then_some(ip)
        }),
    };

    Ok(addresses)
}

/// Collect addresses from `start` for as long as `contained` accepts them.
fn walk<const N: usize>(
    start: [u8; N],
    contained: impl Fn([u8; N]) -> Option<IpAddr>,
) -> Vec<IpAddr> {
    let mut addresses = Vec::new();
    let mut current = start;

    while let Some(ip) = contained(current) {
        addresses.push(ip);
        if !increment(&mut current) {
            break;
        }
    }

    addresses
}

/// Increment a big-endian byte sequence by one.
///
/// Returns `false` when the counter wrapped past its maximum value back to zero.
pub fn increment(bytes: &mut [u8]) -> bool {
    for byte in bytes.iter_mut().rev() {
        let (next, overflowed) = byte.overflowing_add(1);
        *byte = next;
        if !overflowed {
            return true;
        }
    }
    false
}

#[cfg(test)]
#[path = "cidr_tests.rs"]
mod cidr_tests;
