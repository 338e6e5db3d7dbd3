// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! ConfigMap sink: idempotent upsert of the served dnsmasq configuration.
//!
//! The target ConfigMap is fetched by name. If it is absent it is created; if it holds
//! different content it is replaced; if it already holds the rendered content nothing
//! is written, so repeated deliveries of the same document change nothing.

use super::{with_timeout, DeliveryOutcome, Sink};
use crate::constants::{DNSMASQ_CONFIGMAP_KEY, DNSMASQ_CONFIGMAP_NAME};
use crate::errors::DeliveryError;
use crate::labels::{dns_config_labels, RECORD_COUNT_ANNOTATION};
use crate::render::RenderProfile;
use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::PostParams;
use kube::Api;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

/// Fetch/create/replace access to ConfigMaps in one namespace.
#[async_trait]
pub trait ConfigMapStore: Send + Sync {
    /// Fetch a ConfigMap, `None` if it does not exist.
    async fn get(&self, name: &str) -> Result<Option<ConfigMap>>;

    /// Create a ConfigMap.
    async fn create(&self, config_map: &ConfigMap) -> Result<()>;

    /// Replace an existing ConfigMap.
    async fn replace(&self, name: &str, config_map: &ConfigMap) -> Result<()>;
}

#[async_trait]
impl ConfigMapStore for Api<ConfigMap> {
    async fn get(&self, name: &str) -> Result<Option<ConfigMap>> {
        Ok(self.get_opt(name).await?)
    }

    async fn create(&self, config_map: &ConfigMap) -> Result<()> {
        Api::create(self, &PostParams::default(), config_map).await?;
        Ok(())
    }

    async fn replace(&self, name: &str, config_map: &ConfigMap) -> Result<()> {
        Api::replace(self, name, &PostParams::default(), config_map).await?;
        Ok(())
    }
}

/// Upserts the rendered document into a single ConfigMap data key.
pub struct ConfigMapSink<S> {
    store: S,
    namespace: String,
    name: String,
    key: String,
    timeout: Duration,
}

impl<S: ConfigMapStore> ConfigMapSink<S> {
    /// Create a sink targeting the default `dnsmasq-config` / `dnsmasq.conf`.
    pub fn new(store: S, namespace: impl Into<String>, timeout: Duration) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            name: DNSMASQ_CONFIGMAP_NAME.to_string(),
            key: DNSMASQ_CONFIGMAP_KEY.to_string(),
            timeout,
        }
    }

    /// Override the target ConfigMap name and data key.
    #[must_use]
    pub fn with_target(mut self, name: impl Into<String>, key: impl Into<String>) -> Self {
        self.name = name.into();
        self.key = key.into();
        self
    }

    fn qualified_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    fn access_error(&self, operation: &str, err: &anyhow::Error) -> DeliveryError {
        DeliveryError::SinkAccess {
            operation: operation.to_string(),
            name: self.qualified_name(),
            reason: format!("{err:#}"),
        }
    }

    /// Build the desired object, keeping server-side metadata from `existing`.
    fn desired(&self, existing: Option<ConfigMap>, document: &str, records: usize) -> ConfigMap {
        let mut metadata = existing.map(|cm| cm.metadata).unwrap_or_else(|| ObjectMeta {
            name: Some(self.name.clone()),
            namespace: Some(self.namespace.clone()),
            ..Default::default()
        });

        metadata
            .labels
            .get_or_insert_with(BTreeMap::new)
            .extend(dns_config_labels());

        metadata
            .annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(RECORD_COUNT_ANNOTATION.to_string(), records.to_string());

        ConfigMap {
            metadata,
            data: Some(BTreeMap::from([(self.key.clone(), document.to_string())])),
            ..Default::default()
        }
    }

    async fn upsert(&self, document: &str, records: usize) -> Result<DeliveryOutcome, DeliveryError> {
        let existing = self
            .store
            .get(&self.name)
            .await
            .map_err(|e| self.access_error("fetch", &e))?;

        match existing {
            None => {
                debug!(configmap = %self.qualified_name(), "ConfigMap does not exist, creating");
                let desired = self.desired(None, document, records);
                self.store
                    .create(&desired)
                    .await
                    .map_err(|e| self.access_error("create", &e))?;
                info!(configmap = %self.qualified_name(), "Created dnsmasq ConfigMap");
                Ok(DeliveryOutcome::Created)
            }
            Some(current) => {
                let current_content = current
                    .data
                    .as_ref()
                    .and_then(|data| data.get(&self.key));
                if current_content.map(String::as_str) == Some(document) {
                    debug!(configmap = %self.qualified_name(), "ConfigMap already up to date");
                    return Ok(DeliveryOutcome::Unchanged);
                }

                let desired = self.desired(Some(current), document, records);
                self.store
                    .replace(&self.name, &desired)
                    .await
                    .map_err(|e| self.access_error("update", &e))?;
                info!(configmap = %self.qualified_name(), "Updated dnsmasq ConfigMap");
                Ok(DeliveryOutcome::Updated)
            }
        }
    }
}

#[async_trait]
impl<S: ConfigMapStore> Sink for ConfigMapSink<S> {
    fn name(&self) -> &'static str {
        "configmap"
    }

    fn render_profile(&self) -> RenderProfile {
        RenderProfile::dnsmasq_config()
    }

    async fn deliver(
        &self,
        document: &str,
        records: usize,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        with_timeout(self.name(), self.timeout, self.upsert(document, records)).await
    }
}

#[cfg(test)]
#[path = "configmap_tests.rs"]
mod configmap_tests;
