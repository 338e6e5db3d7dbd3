// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! One pipeline invocation: parse, expand, synthesize, aggregate, render, deliver.
//!
//! # Record sources
//!
//! Records are merged in source priority:
//!
//! 1. The inventory document
//! 2. Configured CIDR blocks, in configured order
//! 3. Discovered networks, in name order
//!
//! CIDR blocks are expanded concurrently on blocking tasks and their results are put
//! back into priority order before merging, so the output never depends on which
//! expansion finished first.
//!
//! Cancellation ends the run immediately. Expansions that have not started by then
//! are skipped; one already running is CPU-bound and finishes on the blocking pool,
//! its result discarded.
//!
//! # Error policy
//!
//! - An inventory [`ParseError`](crate::errors::ParseError) aborts the run; nothing is
//!   delivered.
//! - A CIDR source that cannot be expanded is skipped, whether configured or
//!   discovered. The run continues and the source is listed in
//!   [`PipelineReport::skipped`]. A failed discovery listing is skipped the same way.
//! - A [`DeliveryError`](crate::errors::DeliveryError) aborts the run.
//!
//! Nothing is retried here. The caller decides whether to trigger another run.

use crate::cidr;
use crate::delivery::{DeliveryOutcome, Sink};
use crate::discovery::NetworkSource;
use crate::errors::{InvalidCidrError, PipelineError};
use crate::inventory;
use crate::metrics;
use crate::ptr::PtrRecord;
use crate::record_set::{merge, RecordSet};
use crate::render::render;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Documents supplied by the trigger for one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineInput {
    /// Subnet inventory (JSON)
    pub inventory: String,
    /// Configuration header placed before the records
    pub header: String,
}

/// Where a group of records came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// The subnet inventory document
    Inventory,
    /// A configured CIDR block
    Cidr,
    /// A discovered network's CIDR block
    Discovered,
    /// The discovered-network listing itself
    Discovery,
}

impl SourceKind {
    /// Lowercase label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inventory => "inventory",
            Self::Cidr => "cidr",
            Self::Discovered => "discovered",
            Self::Discovery => "discovery",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records contributed by one source, before de-duplication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceCount {
    pub kind: SourceKind,
    pub name: String,
    pub records: usize,
}

/// A source that was left out of the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedSource {
    pub kind: SourceKind,
    pub name: String,
    pub reason: String,
}

/// Summary of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineReport {
    /// Per-source record counts, in priority order
    pub sources: Vec<SourceCount>,
    /// Unique records in the delivered document
    pub total_records: usize,
    /// What the sink did with the document
    pub outcome: DeliveryOutcome,
    /// Sources that could not contribute
    pub skipped: Vec<SkippedSource>,
}

/// A CIDR source waiting to be expanded.
struct CidrSource {
    kind: SourceKind,
    name: String,
    cidr: String,
}

/// The configured pipeline. Holds no state between runs.
pub struct Pipeline {
    sink: Arc<dyn Sink>,
    additional_cidrs: Vec<String>,
    discovery: Option<Arc<dyn NetworkSource>>,
}

impl Pipeline {
    /// Blank entries in `additional_cidrs` are dropped.
    pub fn new(sink: Arc<dyn Sink>, additional_cidrs: Vec<String>) -> Self {
        Self {
            sink,
            additional_cidrs: additional_cidrs
                .into_iter()
                .filter(|cidr| !cidr.trim().is_empty())
                .collect(),
            discovery: None,
        }
    }

    /// Add a discovered-network source, merged with the lowest priority.
    #[must_use]
    pub fn with_discovery(mut self, source: Arc<dyn NetworkSource>) -> Self {
        self.discovery = Some(source);
        self
    }

    /// Name of the configured sink.
    #[must_use]
    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    /// Run the pipeline once.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Parse`] if the inventory is invalid
    /// - [`PipelineError::Delivery`] if the sink fails
    /// - [`PipelineError::Cancelled`] if `cancel` fires before the run completes
    /// - [`PipelineError::Expansion`] if an expansion task panics
    pub async fn run(
        &self,
        input: &PipelineInput,
        cancel: &CancellationToken,
    ) -> Result<PipelineReport, PipelineError> {
        let started = Instant::now();

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(PipelineError::Cancelled),
            result = self.execute(input, cancel) => result,
        };

        let elapsed = started.elapsed();
        match &result {
            Ok(report) => {
                metrics::record_pipeline_success(self.sink.name(), elapsed, report.total_records);
            }
            Err(PipelineError::Cancelled) => {
                warn!(sink = self.sink.name(), "Pipeline run cancelled");
                metrics::record_pipeline_cancelled(elapsed);
            }
            Err(e) => metrics::record_pipeline_error(e.status_reason(), elapsed),
        }
        result
    }

    async fn execute(
        &self,
        input: &PipelineInput,
        cancel: &CancellationToken,
    ) -> Result<PipelineReport, PipelineError> {
        let inventory_records = inventory::parse(&input.inventory)?;
        let mut sources = vec![SourceCount {
            kind: SourceKind::Inventory,
            name: SourceKind::Inventory.to_string(),
            records: inventory_records.len(),
        }];
        let mut skipped = Vec::new();

        let cidr_sources = self.cidr_sources(&mut skipped).await;
        let expanded = expand_all(&cidr_sources, cancel).await?;

        let mut sets = Vec::with_capacity(expanded.len() + 1);
        sets.push(inventory_records);
        for (source, result) in cidr_sources.into_iter().zip(expanded) {
            match result {
                Ok(set) => {
                    sources.push(SourceCount {
                        kind: source.kind,
                        name: source.name,
                        records: set.len(),
                    });
                    sets.push(set);
                }
                Err(e) => {
                    warn!(
                        kind = %source.kind,
                        source = %source.name,
                        error = %e,
                        "Skipping CIDR source"
                    );
                    metrics::record_skipped_source(source.kind.as_str());
                    skipped.push(SkippedSource {
                        kind: source.kind,
                        name: source.name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let records = merge(sets);
        let document = render(&input.header, &records, &self.sink.render_profile());
        debug!(
            sink = self.sink.name(),
            records = records.len(),
            bytes = document.len(),
            "Rendered document"
        );

        let outcome = match self.sink.deliver(&document, records.len()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                metrics::record_delivery(self.sink.name(), "failed");
                return Err(e.into());
            }
        };
        metrics::record_delivery(self.sink.name(), outcome.as_str());

        info!(
            sink = self.sink.name(),
            outcome = %outcome,
            records = records.len(),
            skipped = skipped.len(),
            "Pipeline run complete"
        );

        Ok(PipelineReport {
            sources,
            total_records: records.len(),
            outcome,
            skipped,
        })
    }

    /// Configured blocks followed by discovered ones.
    async fn cidr_sources(&self, skipped: &mut Vec<SkippedSource>) -> Vec<CidrSource> {
        let mut sources: Vec<CidrSource> = self
            .additional_cidrs
            .iter()
            .map(|cidr| CidrSource {
                kind: SourceKind::Cidr,
                name: cidr.clone(),
                cidr: cidr.clone(),
            })
            .collect();

        if let Some(discovery) = &self.discovery {
            match discovery.list_networks().await {
                Ok(networks) => sources.extend(networks.into_iter().map(|n| CidrSource {
                    kind: SourceKind::Discovered,
                    name: n.name,
                    cidr: n.cidr,
                })),
                Err(e) => {
                    warn!(error = %e, "Skipping discovered networks");
                    metrics::record_skipped_source(SourceKind::Discovery.as_str());
                    skipped.push(SkippedSource {
                        kind: SourceKind::Discovery,
                        name: e.scope.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        sources
    }
}

/// Expand every source on the blocking pool; results come back in input order.
///
/// A task that starts after `cancel` fires does no work and the call returns
/// [`PipelineError::Cancelled`].
async fn expand_all(
    sources: &[CidrSource],
    cancel: &CancellationToken,
) -> Result<Vec<Result<RecordSet, InvalidCidrError>>, PipelineError> {
    let tasks = sources.iter().map(|source| {
        let cidr = source.cidr.clone();
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || {
            if cancel.is_cancelled() {
                return None;
            }
            Some(expand_to_records(&cidr))
        })
    });

    futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| match joined {
            Ok(Some(result)) => Ok(result),
            Ok(None) => Err(PipelineError::Cancelled),
            Err(e) => Err(PipelineError::Expansion(e.to_string())),
        })
        .collect()
}

/// Expand one block into its reverse-lookup records.
///
/// # Errors
///
/// Returns [`InvalidCidrError`] if the block is malformed or too large.
pub fn expand_to_records(cidr: &str) -> Result<RecordSet, InvalidCidrError> {
    Ok(cidr::expand(cidr)?
        .into_iter()
        .map(PtrRecord::from_ip)
        .collect())
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod pipeline_tests;
