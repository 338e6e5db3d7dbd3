// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation for the subnet inventory.
//!
//! # Reconciliation Architecture
//!
//! 1. **Watch** - Monitor the inventory Secret and `ReverseNetwork` resources
//! 2. **Extract** - Read the inventory and configuration header from the Secret
//! 3. **Run** - Execute the pipeline, which renders and delivers the document
//! 4. **Report** - Log the run summary and update metrics
//!
//! # Available Reconcilers
//!
//! - [`reconcile_secret`] - Runs the pipeline for a changed inventory Secret

pub mod secret;

pub use secret::{pipeline_input, reconcile_secret};
