// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # ptrsync - PTR record operator for dnsmasq on Kubernetes
//!
//! ptrsync turns a subnet inventory into reverse-lookup (PTR) records and publishes
//! them to dnsmasq, either as a served ConfigMap or by pushing a hosts file to a DNS
//! host over SSH.
//!
//! ## Overview
//!
//! One run of the [`pipeline`] goes through these stages:
//!
//! 1. [`inventory`] - decode the subnet inventory and synthesize its records
//! 2. [`cidr`] - expand configured and discovered CIDR blocks
//! 3. [`ptr`] - build reverse-lookup names for every address
//! 4. [`record_set`] - merge sources, dropping duplicate names
//! 5. [`render`] - produce the dnsmasq document
//! 6. [`delivery`] - hand the document to the configured sink
//!
//! ## Modules
//!
//! - [`crd`] - `ReverseNetwork` custom resource for discovered networks
//! - [`discovery`] - discovered-network sources
//! - [`reconcilers`] - inventory Secret reconciliation
//! - [`context`] - shared controller context
//! - [`config`] - command-line and environment configuration
//! - [`metrics`] - Prometheus metrics
//! - [`server`] - metrics and probe endpoints
//! - [`errors`] - error types
//!
//! ## Example
//!
//! ```rust,no_run
//! use ptrsync::inventory::parse;
//! use ptrsync::render::{render, RenderProfile};
//!
//! let records = parse(r#"{"grp":{"sub":{"ipAddresses":["10.0.0.1"]}}}"#).unwrap();
//! let document = render("port=53\n", &records, &RenderProfile::dnsmasq_config());
//! assert_eq!(document, "port=25353\nptr-record=1.0.0.10.in-addr.arpa.\n");
//! ```

pub mod cidr;
pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod delivery;
pub mod discovery;
pub mod errors;
pub mod inventory;
pub mod labels;
pub mod metrics;
pub mod pipeline;
pub mod ptr;
pub mod reconcilers;
pub mod record_set;
pub mod render;
pub mod server;
