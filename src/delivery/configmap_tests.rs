// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `configmap.rs`

use super::*;
use std::sync::{Arc, Mutex};

const TEST_NAMESPACE: &str = "vsphere-infra-helpers";
const TIMEOUT: Duration = Duration::from_secs(5);

/// In-memory ConfigMap store that counts writes and can be told to fail.
#[derive(Clone, Default)]
struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    objects: BTreeMap<String, ConfigMap>,
    creates: usize,
    replaces: usize,
    fail_on: Option<&'static str>,
    stall: bool,
}

impl MemoryStore {
    fn content(&self, name: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(name)
            .and_then(|cm| cm.data.as_ref())
            .and_then(|data| data.get(DNSMASQ_CONFIGMAP_KEY).cloned())
    }

    fn writes(&self) -> (usize, usize) {
        let state = self.state.lock().unwrap();
        (state.creates, state.replaces)
    }

    fn fail_on(&self, operation: &'static str) {
        self.state.lock().unwrap().fail_on = Some(operation);
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.state.lock().unwrap().fail_on == Some(operation) {
            anyhow::bail!("simulated {operation} failure");
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigMapStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<ConfigMap>> {
        let stall = self.state.lock().unwrap().stall;
        if stall {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.check("get")?;
        Ok(self.state.lock().unwrap().objects.get(name).cloned())
    }

    async fn create(&self, config_map: &ConfigMap) -> Result<()> {
        self.check("create")?;
        let mut state = self.state.lock().unwrap();
        let name = config_map.metadata.name.clone().unwrap_or_default();
        anyhow::ensure!(!state.objects.contains_key(&name), "AlreadyExists");
        state.objects.insert(name, config_map.clone());
        state.creates += 1;
        Ok(())
    }

    async fn replace(&self, name: &str, config_map: &ConfigMap) -> Result<()> {
        self.check("replace")?;
        let mut state = self.state.lock().unwrap();
        anyhow::ensure!(state.objects.contains_key(name), "NotFound");
        state.objects.insert(name.to_string(), config_map.clone());
        state.replaces += 1;
        Ok(())
    }
}

fn sink(store: &MemoryStore) -> ConfigMapSink<MemoryStore> {
    ConfigMapSink::new(store.clone(), TEST_NAMESPACE, TIMEOUT)
}

#[tokio::test]
async fn test_creates_configmap_when_absent() {
    let store = MemoryStore::default();
    let document = "port=25353\nother=1\nptr-record=1.0.0.10.in-addr.arpa.\n";

    let outcome = sink(&store).deliver(document, 1).await.unwrap();

    assert_eq!(outcome, DeliveryOutcome::Created);
    assert_eq!(store.content(DNSMASQ_CONFIGMAP_NAME).as_deref(), Some(document));
    assert_eq!(store.writes(), (1, 0));

    let state = store.state.lock().unwrap();
    let created = &state.objects[DNSMASQ_CONFIGMAP_NAME];
    assert_eq!(created.metadata.namespace.as_deref(), Some(TEST_NAMESPACE));
    let labels = created.metadata.labels.as_ref().unwrap();
    assert_eq!(
        labels.get(crate::labels::K8S_MANAGED_BY).map(String::as_str),
        Some("ptrsync")
    );
    let annotations = created.metadata.annotations.as_ref().unwrap();
    assert_eq!(
        annotations.get(RECORD_COUNT_ANNOTATION).map(String::as_str),
        Some("1")
    );
}

#[tokio::test]
async fn test_repeated_upsert_is_idempotent() {
    let store = MemoryStore::default();
    let sink = sink(&store);
    let document = "ptr-record=1.0.0.10.in-addr.arpa.\n";

    assert_eq!(sink.deliver(document, 1).await.unwrap(), DeliveryOutcome::Created);
    assert_eq!(sink.deliver(document, 1).await.unwrap(), DeliveryOutcome::Unchanged);
    assert_eq!(sink.deliver(document, 1).await.unwrap(), DeliveryOutcome::Unchanged);

    assert_eq!(store.writes(), (1, 0));
}

#[tokio::test]
async fn test_updates_when_content_differs() {
    let store = MemoryStore::default();
    let sink = sink(&store);

    sink.deliver("ptr-record=1.0.0.10.in-addr.arpa.\n", 1).await.unwrap();
    let outcome = sink
        .deliver("ptr-record=2.0.0.10.in-addr.arpa.\n", 1)
        .await
        .unwrap();

    assert_eq!(outcome, DeliveryOutcome::Updated);
    assert_eq!(
        store.content(DNSMASQ_CONFIGMAP_NAME).as_deref(),
        Some("ptr-record=2.0.0.10.in-addr.arpa.\n")
    );
    assert_eq!(store.writes(), (1, 1));
}

#[tokio::test]
async fn test_update_keeps_existing_metadata() {
    let store = MemoryStore::default();
    {
        let mut state = store.state.lock().unwrap();
        state.objects.insert(
            DNSMASQ_CONFIGMAP_NAME.to_string(),
            ConfigMap {
                metadata: ObjectMeta {
                    name: Some(DNSMASQ_CONFIGMAP_NAME.to_string()),
                    namespace: Some(TEST_NAMESPACE.to_string()),
                    resource_version: Some("42".to_string()),
                    labels: Some(BTreeMap::from([("team".to_string(), "ci".to_string())])),
                    ..Default::default()
                },
                data: Some(BTreeMap::from([
                    (DNSMASQ_CONFIGMAP_KEY.to_string(), "stale".to_string()),
                    ("leftover".to_string(), "x".to_string()),
                ])),
                ..Default::default()
            },
        );
    }

    let outcome = sink(&store).deliver("fresh\n", 0).await.unwrap();
    assert_eq!(outcome, DeliveryOutcome::Updated);

    let state = store.state.lock().unwrap();
    let updated = &state.objects[DNSMASQ_CONFIGMAP_NAME];
    assert_eq!(updated.metadata.resource_version.as_deref(), Some("42"));
    let labels = updated.metadata.labels.as_ref().unwrap();
    assert_eq!(labels.get("team").map(String::as_str), Some("ci"));
    let data = updated.data.as_ref().unwrap();
    assert_eq!(data.len(), 1, "the document holds a single field");
    assert_eq!(data[DNSMASQ_CONFIGMAP_KEY], "fresh\n");
}

#[tokio::test]
async fn test_custom_target() {
    let store = MemoryStore::default();
    let sink = sink(&store).with_target("custom", DNSMASQ_CONFIGMAP_KEY);
    sink.deliver("x", 0).await.unwrap();
    assert_eq!(store.content("custom").as_deref(), Some("x"));
    assert!(store.content(DNSMASQ_CONFIGMAP_NAME).is_none());
}

#[tokio::test]
async fn test_fetch_failure_is_reported() {
    let store = MemoryStore::default();
    store.fail_on("get");

    let err = sink(&store).deliver("x", 0).await.unwrap_err();
    match err {
        DeliveryError::SinkAccess {
            operation,
            name,
            reason,
        } => {
            assert_eq!(operation, "fetch");
            assert_eq!(name, format!("{TEST_NAMESPACE}/{DNSMASQ_CONFIGMAP_NAME}"));
            assert!(reason.contains("simulated get failure"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_create_failure_is_reported_without_retry() {
    let store = MemoryStore::default();
    store.fail_on("create");

    let err = sink(&store).deliver("x", 0).await.unwrap_err();
    assert!(matches!(err, DeliveryError::SinkAccess { ref operation, .. } if operation == "create"));
    assert_eq!(err.status_reason(), "SinkAccessError");
    assert_eq!(store.writes(), (0, 0));
}

#[tokio::test]
async fn test_update_failure_leaves_previous_content() {
    let store = MemoryStore::default();
    let sink = sink(&store);
    sink.deliver("old", 0).await.unwrap();

    store.fail_on("replace");
    let err = sink.deliver("new", 0).await.unwrap_err();

    assert!(matches!(err, DeliveryError::SinkAccess { ref operation, .. } if operation == "update"));
    assert_eq!(store.content(DNSMASQ_CONFIGMAP_NAME).as_deref(), Some("old"));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_store_times_out() {
    let store = MemoryStore::default();
    store.state.lock().unwrap().stall = true;

    let err = sink(&store).deliver("x", 0).await.unwrap_err();
    assert_eq!(
        err,
        DeliveryError::Timeout {
            sink: "configmap".to_string(),
            timeout_secs: 5,
        }
    );
}

#[test]
fn test_render_profile_is_dnsmasq_config() {
    let sink = sink(&MemoryStore::default());
    assert_eq!(sink.render_profile(), RenderProfile::dnsmasq_config());
    assert_eq!(sink.name(), "configmap");
}

#[tokio::test]
async fn test_record_count_ignores_header_entries() {
    let store = MemoryStore::default();
    let document = "ptr-record=static.example.\nport=25353\nptr-record=1.0.0.10.in-addr.arpa.\n";

    sink(&store).deliver(document, 1).await.unwrap();

    let state = store.state.lock().unwrap();
    let annotations = state.objects[DNSMASQ_CONFIGMAP_NAME]
        .metadata
        .annotations
        .as_ref()
        .unwrap();
    assert_eq!(
        annotations.get(RECORD_COUNT_ANNOTATION).map(String::as_str),
        Some("1")
    );
}
