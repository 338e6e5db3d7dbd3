// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the ptrsync operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for the ptrsync CRDs
pub const API_GROUP: &str = "ptrsync.io";

/// API version for the ptrsync CRDs
pub const API_VERSION: &str = "v1alpha1";

/// Kind name for `ReverseNetwork` resource
pub const KIND_REVERSE_NETWORK: &str = "ReverseNetwork";

// ============================================================================
// Reverse DNS Constants
// ============================================================================

/// Reverse-lookup zone suffix for IPv4 addresses
pub const IPV4_REVERSE_ZONE: &str = "in-addr.arpa.";

/// Reverse-lookup zone suffix for IPv6 addresses
pub const IPV6_REVERSE_ZONE: &str = "ip6.arpa.";

/// Largest number of addresses enumerated from a single CIDR block (2^20)
pub const MAX_EXPANSION_ADDRESSES: usize = 1 << 20;

// ============================================================================
// Trigger Constants
// ============================================================================

/// Default namespace holding the inventory Secret
pub const DEFAULT_SECRET_NAMESPACE: &str = "test-credentials";

/// Default name of the inventory Secret
pub const DEFAULT_SECRET_NAME: &str = "vsphere-config";

/// Secret key holding the subnet inventory document
pub const INVENTORY_KEY: &str = "subnets.json";

/// Secret key holding the dnsmasq configuration header
pub const HEADER_KEY: &str = "dnsmasq.cfg";

/// Default additional CIDR expanded alongside the inventory
pub const DEFAULT_ADDITIONAL_CIDR: &str = "192.168.0.0/16";

// ============================================================================
// dnsmasq Rendering Constants
// ============================================================================

/// Standard DNS port dnsmasq listens on by default
pub const DNS_PORT: u16 = 53;

/// Unprivileged port the served dnsmasq configuration is moved to
pub const DNSMASQ_ALTERNATE_PORT: u16 = 25353;

/// Line prefix for dnsmasq PTR records
pub const PTR_RECORD_PREFIX: &str = "ptr-record=";

// ============================================================================
// ConfigMap Sink Constants
// ============================================================================

/// Default namespace for the rendered ConfigMap and `ReverseNetwork` resources
pub const DEFAULT_OPERATOR_NAMESPACE: &str = "vsphere-infra-helpers";

/// Name of the ConfigMap holding the rendered dnsmasq configuration
pub const DNSMASQ_CONFIGMAP_NAME: &str = "dnsmasq-config";

/// ConfigMap data key holding the rendered dnsmasq configuration
pub const DNSMASQ_CONFIGMAP_KEY: &str = "dnsmasq.conf";

// ============================================================================
// Remote Push Sink Constants
// ============================================================================

/// Default DNS host the remote-push sink delivers to
pub const DEFAULT_DNS_SERVER: &str = "10.176.158.144";

/// Standard SSH port
pub const SSH_PORT: u16 = 22;

/// Default SSH user on the DNS host
pub const DEFAULT_SSH_USER: &str = "root";

/// Default path of the SSH private key
pub const DEFAULT_PRIVATE_KEY_PATH: &str = "/ssh-config/private-key";

/// Remote file the host lines are copied to
pub const DEFAULT_REMOTE_HOSTS_PATH: &str = "/opt/ci-dns/additional-hosts";

/// Permission bits of the copied hosts file
pub const DEFAULT_REMOTE_FILE_MODE: u32 = 0o666;

/// Command reloading dnsmasq after the copy
pub const DEFAULT_RELOAD_COMMAND: &str = "sudo systemctl restart dnsmasq";

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Default timeout for a single delivery (seconds)
pub const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics and Health Server Constants
// ============================================================================

/// Bind address for the Prometheus metrics HTTP server
pub const DEFAULT_METRICS_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Bind address for the health probe HTTP server
pub const DEFAULT_HEALTH_PROBE_BIND_ADDRESS: &str = "0.0.0.0:8081";

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Path for the liveness probe
pub const HEALTHZ_PATH: &str = "/healthz";

/// Path for the readiness probe
pub const READYZ_PATH: &str = "/readyz";
