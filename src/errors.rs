// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the PTR record pipeline.
//!
//! This module provides specialized error types for:
//! - Inventory document decoding and leaf validation
//! - CIDR parsing and expansion
//! - Reverse-lookup name synthesis
//! - Delivery to the ConfigMap and remote-push sinks
//! - Discovered-network enumeration
//!
//! Each stage returns its own error type; [`PipelineError`] composes them for the
//! trigger adapter, which maps them to status reasons and metrics labels.

use thiserror::Error;

/// An address could not be converted to a reverse-lookup name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot build reverse-lookup name for '{address}': not a valid IP address")]
pub struct ReverseNameError {
    /// The address text exactly as it was supplied
    pub address: String,
}

/// Errors raised while decoding the subnet inventory document.
///
/// The parser performs no best-effort recovery: the first malformed leaf aborts
/// the whole parse and is reported with its group and subnet names.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The document is not valid JSON, or its top two levels are not mappings
    #[error("Inventory document is malformed: {reason}")]
    InvalidDocument {
        /// Decoder message, including line and column when available
        reason: String,
    },

    /// The trigger resource does not carry the inventory document at all
    #[error("Inventory key '{key}' not found in {resource}")]
    MissingDocument {
        /// The data key that was expected (e.g. `subnets.json`)
        key: String,
        /// `namespace/name` of the resource that was read
        resource: String,
    },

    /// A subnet leaf lacks `ipAddresses` or carries it with the wrong shape
    #[error("Subnet '{group}/{subnet}' is invalid: {reason}")]
    InvalidSubnet {
        /// Group (first-level key) of the failing leaf
        group: String,
        /// Subnet (second-level key) of the failing leaf
        subnet: String,
        /// What was wrong with the leaf
        reason: String,
    },

    /// A subnet lists an address that cannot be reversed
    #[error("Subnet '{group}/{subnet}' lists an invalid address: {source}")]
    InvalidAddress {
        /// Group (first-level key) of the failing leaf
        group: String,
        /// Subnet (second-level key) of the failing leaf
        subnet: String,
        /// The underlying synthesis failure
        #[source]
        source: ReverseNameError,
    },
}

/// Errors raised while parsing or expanding a CIDR block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidCidrError {
    /// The text is not `address/prefix`
    #[error("Invalid CIDR '{cidr}': {reason}")]
    Malformed {
        /// The CIDR text as supplied
        cidr: String,
        /// Parser message
        reason: String,
    },

    /// The block holds more addresses than the expander will enumerate
    #[error("CIDR '{cidr}' holds 2^{host_bits} addresses, more than the limit of {limit}")]
    TooLarge {
        /// The CIDR text as supplied
        cidr: String,
        /// Number of host bits in the block
        host_bits: u8,
        /// Maximum number of addresses enumerated for a single block
        limit: usize,
    },
}

/// Errors raised while delivering a rendered document to a sink.
///
/// The remote-push kinds are kept separate so the caller can tell a failed copy
/// from a failed reload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The private key could not be read or decoded
    #[error("Cannot load private key from {path}: {reason}")]
    Credential {
        /// Path the key was read from
        path: String,
        /// Read or decode failure
        reason: String,
    },

    /// The secure session could not be established or authenticated
    #[error("Cannot establish SSH session with {host}: {reason}")]
    Connect {
        /// `host:port` that was dialled
        host: String,
        /// Dial, handshake or authentication failure
        reason: String,
    },

    /// The rendered document could not be copied to the remote host
    #[error("Copy of {path} to {host} failed: {reason}")]
    Transfer {
        /// Remote host
        host: String,
        /// Remote destination path
        path: String,
        /// Channel or protocol failure
        reason: String,
    },

    /// The reload command failed or exited non-zero
    #[error("Remote command '{command}' on {host} failed: {reason}")]
    RemoteCommand {
        /// Remote host
        host: String,
        /// Command line that was executed
        command: String,
        /// Exit status or channel failure
        reason: String,
    },

    /// A fetch/create/update of the served document failed
    #[error("Failed to {operation} ConfigMap '{name}': {reason}")]
    SinkAccess {
        /// `fetch`, `create` or `update`
        operation: String,
        /// `namespace/name` of the ConfigMap
        name: String,
        /// API error message
        reason: String,
    },

    /// The sink did not finish within the caller-supplied timeout
    #[error("Delivery to {sink} timed out after {timeout_secs}s")]
    Timeout {
        /// Sink name
        sink: String,
        /// Configured timeout in seconds
        timeout_secs: u64,
    },
}

impl DeliveryError {
    /// Returns true if re-triggering the pipeline could plausibly succeed
    /// without operator intervention.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connect { .. }
            | Self::Transfer { .. }
            | Self::RemoteCommand { .. }
            | Self::SinkAccess { .. }
            | Self::Timeout { .. } => true,
            Self::Credential { .. } => false,
        }
    }

    /// Returns the status reason code for this error.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Credential { .. } => "CredentialError",
            Self::Connect { .. } => "ConnectError",
            Self::Transfer { .. } => "TransferError",
            Self::RemoteCommand { .. } => "RemoteCommandError",
            Self::SinkAccess { .. } => "SinkAccessError",
            Self::Timeout { .. } => "DeliveryTimeout",
        }
    }
}

/// Errors raised while enumerating discovered network ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to list discovered networks in {scope}: {reason}")]
pub struct DiscoveryError {
    /// Where the listing was attempted (namespace or source name)
    pub scope: String,
    /// API error message
    pub reason: String,
}

/// Composite error for one pipeline invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The inventory document could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The rendered document could not be delivered
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// The invocation was cancelled by the trigger context
    #[error("Pipeline run cancelled")]
    Cancelled,

    /// A background expansion task panicked or was aborted
    #[error("CIDR expansion task failed: {0}")]
    Expansion(String),
}

impl PipelineError {
    /// Returns the status reason code for this error.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Parse(ParseError::InvalidDocument { .. }) => "InvalidInventory",
            Self::Parse(ParseError::MissingDocument { .. }) => "InventoryNotFound",
            Self::Parse(ParseError::InvalidSubnet { .. }) => "InvalidSubnet",
            Self::Parse(ParseError::InvalidAddress { .. }) => "ReverseNameError",
            Self::Delivery(e) => e.status_reason(),
            Self::Cancelled => "Cancelled",
            Self::Expansion(_) => "ExpansionFailed",
        }
    }

    /// Returns true if the error came from cancellation rather than a failure.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
