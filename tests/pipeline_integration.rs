// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Integration tests for the ConfigMap sink and discovered networks.
//!
//! These tests need a Kubernetes cluster with the `ReverseNetwork` CRD installed
//! (`cargo run --bin crdgen && kubectl apply -f deploy/crds/`).
//!
//! Run with: cargo test --test pipeline_integration -- --ignored

use k8s_openapi::api::core::v1::{ConfigMap, Namespace};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, PostParams};
use kube::client::Client;
use ptrsync::constants::{DNSMASQ_CONFIGMAP_KEY, DNSMASQ_CONFIGMAP_NAME};
use ptrsync::crd::{ReverseNetwork, ReverseNetworkSpec};
use ptrsync::delivery::{ConfigMapSink, DeliveryOutcome};
use ptrsync::discovery::CrdNetworkSource;
use ptrsync::pipeline::{Pipeline, PipelineInput, SourceKind};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Helper Functions
// ============================================================================

/// Test helper to check if running in a Kubernetes cluster
async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {e}");
            None
        }
    }
}

/// Create a test namespace
async fn create_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let test_ns = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(BTreeMap::from([
                ("test".to_string(), "integration".to_string()),
                ("managed-by".to_string(), "ptrsync-test".to_string()),
            ])),
            ..Default::default()
        },
        ..Default::default()
    };

    match namespaces.create(&PostParams::default(), &test_ns).await {
        Ok(_) => Ok(()),
        Err(kube::Error::Api(ae)) if ae.code == 409 => Ok(()),
        Err(e) => Err(Box::new(e)),
    }
}

/// Delete a test namespace
async fn delete_test_namespace(client: &Client, name: &str) {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    if let Err(e) = namespaces.delete(name, &DeleteParams::default()).await {
        eprintln!("Failed to delete test namespace {name}: {e}");
    }
}

fn input() -> PipelineInput {
    PipelineInput {
        inventory: r#"{"grp":{"sub":{"ipAddresses":["10.0.0.1","10.0.0.2"]}}}"#.to_string(),
        header: "port=53\nother=1".to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires a Kubernetes cluster"]
async fn test_configmap_sink_upserts_idempotently() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };
    let namespace = "ptrsync-test-configmap";
    create_test_namespace(&client, namespace).await.unwrap();

    let api: Api<ConfigMap> = Api::namespaced(client.clone(), namespace);
    let sink = Arc::new(ConfigMapSink::new(
        api.clone(),
        namespace,
        Duration::from_secs(30),
    ));
    let pipeline = Pipeline::new(sink, Vec::new());
    let cancel = CancellationToken::new();

    let first = pipeline.run(&input(), &cancel).await.unwrap();
    assert_eq!(first.outcome, DeliveryOutcome::Created);

    let second = pipeline.run(&input(), &cancel).await.unwrap();
    assert_eq!(second.outcome, DeliveryOutcome::Unchanged);

    let stored = api.get(DNSMASQ_CONFIGMAP_NAME).await.unwrap();
    assert_eq!(
        stored.data.unwrap()[DNSMASQ_CONFIGMAP_KEY],
        "port=25353\nother=1\nptr-record=1.0.0.10.in-addr.arpa.\nptr-record=2.0.0.10.in-addr.arpa.\n"
    );

    delete_test_namespace(&client, namespace).await;
}

#[tokio::test]
#[ignore = "requires a Kubernetes cluster with the ReverseNetwork CRD"]
async fn test_discovered_networks_are_merged() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };
    let namespace = "ptrsync-test-discovery";
    create_test_namespace(&client, namespace).await.unwrap();

    let networks: Api<ReverseNetwork> = Api::namespaced(client.clone(), namespace);
    for (name, cidr) in [("good", "10.0.5.0/31"), ("broken", "10.0.9.0/33")] {
        let network = ReverseNetwork::new(
            name,
            ReverseNetworkSpec {
                cidr: cidr.to_string(),
                description: None,
            },
        );
        networks
            .create(&PostParams::default(), &network)
            .await
            .unwrap();
    }

    let api: Api<ConfigMap> = Api::namespaced(client.clone(), namespace);
    let sink = Arc::new(ConfigMapSink::new(api, namespace, Duration::from_secs(30)));
    let pipeline = Pipeline::new(sink, Vec::new())
        .with_discovery(Arc::new(CrdNetworkSource::new(client.clone(), namespace)));

    let report = pipeline
        .run(&input(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.total_records, 4);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].kind, SourceKind::Discovered);
    assert_eq!(report.skipped[0].name, "broken");

    delete_test_namespace(&client, namespace).await;
}
