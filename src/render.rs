// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! dnsmasq configuration rendering.
//!
//! A rendered document is the caller-supplied header followed by one line per record.
//! The header passes through byte-for-byte, except that a line reading exactly
//! `port=53` can be rewritten so the served dnsmasq moves off the privileged port.
//!
//! # Line formats
//!
//! | Format | Line | Joining |
//! |---|---|---|
//! | [`LineFormat::PtrRecord`] | `ptr-record=<reverse-name>` | newline-terminated |
//! | [`LineFormat::ReverseName`] | `<reverse-name>` | newline-joined |
//! | [`LineFormat::HostLine`] | `<address> <reverse-name>` | newline-joined |

use crate::constants::{DNSMASQ_ALTERNATE_PORT, DNS_PORT, PTR_RECORD_PREFIX};
use crate::record_set::RecordSet;

/// How each record is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineFormat {
    /// `ptr-record=<reverse-name>` followed by a newline
    PtrRecord,
    /// `<reverse-name>`, lines joined with newlines
    ReverseName,
    /// `<address> <reverse-name>`, lines joined with newlines
    HostLine,
}

/// Rewrite of the `port=` line in the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortRewrite {
    pub from: u16,
    pub to: u16,
}

impl Default for PortRewrite {
    fn default() -> Self {
        Self {
            from: DNS_PORT,
            to: DNSMASQ_ALTERNATE_PORT,
        }
    }
}

/// Rendering choices a sink makes for its documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderProfile {
    pub line_format: LineFormat,
    pub include_header: bool,
    pub port_rewrite: Option<PortRewrite>,
}

impl RenderProfile {
    /// Profile for the served dnsmasq configuration document.
    #[must_use]
    pub fn dnsmasq_config() -> Self {
        Self {
            line_format: LineFormat::PtrRecord,
            include_header: true,
            port_rewrite: Some(PortRewrite::default()),
        }
    }

    /// Profile for the additional-hosts file pushed to a remote DNS host.
    #[must_use]
    pub fn remote_hosts() -> Self {
        Self {
            line_format: LineFormat::HostLine,
            include_header: false,
            port_rewrite: None,
        }
    }
}

/// Render a header and a record set into a document.
///
/// Identical inputs always produce identical output.
#[must_use]
pub fn render(header: &str, records: &RecordSet, profile: &RenderProfile) -> String {
    let mut document = String::new();

    if profile.include_header && !header.is_empty() {
        match profile.port_rewrite {
            Some(rewrite) => document.push_str(&rewrite_port(header, rewrite)),
            None => document.push_str(header),
        }
        if !document.ends_with('\n') && !records.is_empty() {
            document.push('\n');
        }
    }

    match profile.line_format {
        LineFormat::PtrRecord => {
            for record in records {
                document.push_str(PTR_RECORD_PREFIX);
                document.push_str(record.reverse_name());
                document.push('\n');
            }
        }
        LineFormat::ReverseName => {
            let lines: Vec<&str> = records.iter().map(|r| r.reverse_name()).collect();
            document.push_str(&lines.join("\n"));
        }
        LineFormat::HostLine => {
            let lines: Vec<String> = records
                .iter()
                .map(|r| format!("{} {}", r.address(), r.reverse_name()))
                .collect();
            document.push_str(&lines.join("\n"));
        }
    }

    document
}

/// Replace every header line that reads exactly `port=<from>` with `port=<to>`.
///
/// Line terminators and all other bytes are kept as-is.
#[must_use]
pub fn rewrite_port(header: &str, rewrite: PortRewrite) -> String {
    let from = format!("port={}", rewrite.from);
    let to = format!("port={}", rewrite.to);

    let mut out = String::with_capacity(header.len() + 4);
    for line in header.split_inclusive('\n') {
        let body = line
            .strip_suffix("\r\n")
            .or_else(|| line.strip_suffix('\n'))
            .unwrap_or(line);
        if body == from {
            out.push_str(&to);
            out.push_str(&line[body.len()..]);
        } else {
            out.push_str(line);
        }
    }
    out
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod render_tests;
