// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator configuration from command-line flags and environment variables.
//!
//! Every flag has a `PTRSYNC_*` environment fallback so the operator can be
//! configured from a Deployment manifest without overriding its arguments.

use crate::constants::{
    DEFAULT_ADDITIONAL_CIDR, DEFAULT_DELIVERY_TIMEOUT_SECS, DEFAULT_DNS_SERVER,
    DEFAULT_HEALTH_PROBE_BIND_ADDRESS, DEFAULT_METRICS_BIND_ADDRESS, DEFAULT_OPERATOR_NAMESPACE,
    DEFAULT_PRIVATE_KEY_PATH, DEFAULT_RELOAD_COMMAND, DEFAULT_REMOTE_HOSTS_PATH,
    DEFAULT_SECRET_NAME, DEFAULT_SECRET_NAMESPACE, DEFAULT_SSH_USER, SSH_PORT,
};
use crate::delivery::RemoteTarget;
use clap::{ArgAction, Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Which sink receives rendered documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    /// Upsert the `dnsmasq-config` ConfigMap in the operator namespace
    Configmap,
    /// Copy a hosts file to the DNS server over SSH and restart dnsmasq
    Remote,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ptrsync",
    version,
    about = "Publishes PTR records for inventoried subnets to dnsmasq"
)]
pub struct Config {
    /// Namespace of the Secret holding the subnet inventory
    #[arg(long, env = "PTRSYNC_SECRET_NAMESPACE", default_value = DEFAULT_SECRET_NAMESPACE)]
    pub secret_namespace: String,

    /// Name of the Secret holding the subnet inventory
    #[arg(long, env = "PTRSYNC_SECRET_NAME", default_value = DEFAULT_SECRET_NAME)]
    pub secret_name: String,

    /// Namespace the operator runs in; the ConfigMap and ReverseNetworks live here
    #[arg(long, env = "PTRSYNC_NAMESPACE", default_value = DEFAULT_OPERATOR_NAMESPACE)]
    pub namespace: String,

    /// Additional CIDR block to publish (repeatable; `--cidr ""` publishes none)
    #[arg(
        long = "cidr",
        env = "PTRSYNC_CIDRS",
        value_delimiter = ',',
        default_value = DEFAULT_ADDITIONAL_CIDR
    )]
    pub cidrs: Vec<String>,

    /// Where rendered documents are delivered
    #[arg(long, env = "PTRSYNC_SINK", value_enum, default_value_t = SinkKind::Configmap)]
    pub sink: SinkKind,

    /// DNS server host for the remote sink
    #[arg(long, env = "PTRSYNC_DNS_SERVER", default_value = DEFAULT_DNS_SERVER)]
    pub dns_server: String,

    /// SSH port of the DNS server
    #[arg(long, env = "PTRSYNC_SSH_PORT", default_value_t = SSH_PORT)]
    pub ssh_port: u16,

    /// Path to the SSH private key for the remote sink
    #[arg(long, env = "PTRSYNC_PRIVATE_KEY", default_value = DEFAULT_PRIVATE_KEY_PATH)]
    pub private_key: PathBuf,

    /// SSH user for the remote sink
    #[arg(long, env = "PTRSYNC_SSH_USER", default_value = DEFAULT_SSH_USER)]
    pub ssh_user: String,

    /// Destination of the hosts file on the DNS server
    #[arg(long, env = "PTRSYNC_REMOTE_PATH", default_value = DEFAULT_REMOTE_HOSTS_PATH)]
    pub remote_path: String,

    /// Command that reloads dnsmasq on the DNS server
    #[arg(long, env = "PTRSYNC_RELOAD_COMMAND", default_value = DEFAULT_RELOAD_COMMAND)]
    pub reload_command: String,

    /// Upper bound on one delivery, in seconds
    #[arg(
        long,
        env = "PTRSYNC_DELIVERY_TIMEOUT_SECS",
        default_value_t = DEFAULT_DELIVERY_TIMEOUT_SECS
    )]
    pub delivery_timeout_secs: u64,

    /// Address the Prometheus metrics endpoint binds to
    #[arg(long, env = "PTRSYNC_METRICS_BIND_ADDRESS", default_value = DEFAULT_METRICS_BIND_ADDRESS)]
    pub metrics_bind_address: SocketAddr,

    /// Address the health and readiness probes bind to
    #[arg(
        long,
        env = "PTRSYNC_HEALTH_PROBE_BIND_ADDRESS",
        default_value = DEFAULT_HEALTH_PROBE_BIND_ADDRESS
    )]
    pub health_probe_bind_address: SocketAddr,

    /// Include ReverseNetwork resources as a record source
    #[arg(
        long,
        env = "PTRSYNC_DISCOVER_NETWORKS",
        action = ArgAction::Set,
        default_value_t = true
    )]
    pub discover_networks: bool,
}

impl Config {
    #[must_use]
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }

    /// Configured CIDR blocks with empty entries removed.
    #[must_use]
    pub fn additional_cidrs(&self) -> Vec<String> {
        self.cidrs
            .iter()
            .map(|cidr| cidr.trim())
            .filter(|cidr| !cidr.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Remote push target built from the SSH flags.
    #[must_use]
    pub fn remote_target(&self) -> RemoteTarget {
        RemoteTarget {
            port: self.ssh_port,
            user: self.ssh_user.clone(),
            private_key_path: self.private_key.clone(),
            remote_path: self.remote_path.clone(),
            reload_command: self.reload_command.clone(),
            ..RemoteTarget::new(self.dns_server.clone())
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
