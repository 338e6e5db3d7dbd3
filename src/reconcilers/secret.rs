// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Inventory Secret reconciliation.
//!
//! The Secret carries two documents:
//!
//! | Key | Content | Required |
//! |---|---|---|
//! | `subnets.json` | subnet inventory | yes |
//! | `dnsmasq.cfg` | configuration header | no, empty when absent |

use crate::constants::{HEADER_KEY, INVENTORY_KEY};
use crate::context::Context;
use crate::errors::{ParseError, PipelineError};
use crate::metrics;
use crate::pipeline::{PipelineInput, PipelineReport};
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use std::time::Instant;
use tracing::{debug, info};

/// Read the pipeline input from the inventory Secret.
///
/// # Errors
///
/// Returns [`ParseError::MissingDocument`] if the Secret has no inventory key and
/// [`ParseError::InvalidDocument`] if either document is not UTF-8.
pub fn pipeline_input(secret: &Secret) -> Result<PipelineInput, ParseError> {
    let resource = format!(
        "Secret {}/{}",
        secret.namespace().unwrap_or_default(),
        secret.name_any()
    );
    let data = secret.data.as_ref();

    let inventory = data
        .and_then(|d| d.get(INVENTORY_KEY))
        .ok_or_else(|| ParseError::MissingDocument {
            key: INVENTORY_KEY.to_string(),
            resource: resource.clone(),
        })?;
    let inventory = decode_utf8(INVENTORY_KEY, &inventory.0)?;

    let header = match data.and_then(|d| d.get(HEADER_KEY)) {
        Some(bytes) => decode_utf8(HEADER_KEY, &bytes.0)?,
        None => {
            debug!(secret = %resource, key = HEADER_KEY, "No configuration header, using empty header");
            String::new()
        }
    };

    Ok(PipelineInput { inventory, header })
}

fn decode_utf8(key: &str, bytes: &[u8]) -> Result<String, ParseError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| ParseError::InvalidDocument {
        reason: format!("{key} is not valid UTF-8: {e}"),
    })
}

/// Run the pipeline for the inventory Secret.
///
/// # Errors
///
/// Returns the [`PipelineError`] of the run. Cancellation during shutdown is
/// reported as [`PipelineError::Cancelled`].
pub async fn reconcile_secret(
    ctx: &Context,
    secret: &Secret,
) -> Result<PipelineReport, PipelineError> {
    let name = secret.name_any();
    let namespace = secret.namespace().unwrap_or_default();
    info!(secret = %name, namespace = %namespace, "Reconciling subnet inventory");

    let started = Instant::now();
    let input = match pipeline_input(secret) {
        Ok(input) => input,
        Err(e) => {
            let err = PipelineError::from(e);
            metrics::record_pipeline_error(err.status_reason(), started.elapsed());
            return Err(err);
        }
    };
    let report = ctx.pipeline.run(&input, &ctx.shutdown).await?;

    info!(
        secret = %name,
        namespace = %namespace,
        sink = ctx.pipeline.sink_name(),
        outcome = %report.outcome,
        records = report.total_records,
        skipped = report.skipped.len(),
        "Published PTR records"
    );

    Ok(report)
}

#[cfg(test)]
#[path = "secret_tests.rs"]
mod secret_tests;
