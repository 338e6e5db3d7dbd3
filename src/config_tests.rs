// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

use super::*;

#[test]
fn test_defaults() {
    let config = Config::try_parse_from(["ptrsync"]).unwrap();

    assert_eq!(config.secret_namespace, "test-credentials");
    assert_eq!(config.secret_name, "vsphere-config");
    assert_eq!(config.namespace, "vsphere-infra-helpers");
    assert_eq!(config.cidrs, vec!["192.168.0.0/16".to_string()]);
    assert_eq!(config.sink, SinkKind::Configmap);
    assert_eq!(config.dns_server, "10.176.158.144");
    assert_eq!(config.private_key, PathBuf::from("/ssh-config/private-key"));
    assert_eq!(config.delivery_timeout(), Duration::from_secs(60));
    assert_eq!(config.metrics_bind_address.port(), 8080);
    assert_eq!(config.health_probe_bind_address.port(), 8081);
    assert!(config.discover_networks);
}

#[test]
fn test_repeated_cidr_flags_keep_order() {
    let config = Config::try_parse_from([
        "ptrsync",
        "--cidr",
        "10.1.0.0/24",
        "--cidr",
        "10.0.0.0/24,fd00::/120",
    ])
    .unwrap();

    assert_eq!(
        config.cidrs,
        vec![
            "10.1.0.0/24".to_string(),
            "10.0.0.0/24".to_string(),
            "fd00::/120".to_string(),
        ]
    );
}

#[test]
fn test_empty_cidr_disables_additional_blocks() {
    for args in [&["ptrsync", "--cidr", ""][..], &["ptrsync", "--cidr="][..]] {
        let config = Config::try_parse_from(args).unwrap();
        assert!(config.additional_cidrs().is_empty(), "args: {args:?}");
    }
}

#[test]
fn test_additional_cidrs_drop_blank_entries() {
    let config =
        Config::try_parse_from(["ptrsync", "--cidr", " 10.1.0.0/24 ,, ,fd00::/120"]).unwrap();

    assert_eq!(
        config.additional_cidrs(),
        vec!["10.1.0.0/24".to_string(), "fd00::/120".to_string()]
    );
}

#[test]
fn test_remote_sink_flags() {
    let config = Config::try_parse_from([
        "ptrsync",
        "--sink",
        "remote",
        "--dns-server",
        "dns.ci.internal",
        "--ssh-user",
        "dnsadmin",
        "--private-key",
        "/keys/id_ed25519",
        "--discover-networks",
        "false",
    ])
    .unwrap();

    assert_eq!(config.sink, SinkKind::Remote);
    assert!(!config.discover_networks);

    let target = config.remote_target();
    assert_eq!(target.host, "dns.ci.internal");
    assert_eq!(target.port, 22);
    assert_eq!(target.user, "dnsadmin");
    assert_eq!(target.private_key_path, PathBuf::from("/keys/id_ed25519"));
    assert_eq!(target.remote_path, "/opt/ci-dns/additional-hosts");
    assert_eq!(target.file_mode, 0o666);
    assert_eq!(target.reload_command, "sudo systemctl restart dnsmasq");
}

#[test]
fn test_unknown_sink_is_rejected() {
    assert!(Config::try_parse_from(["ptrsync", "--sink", "ftp"]).is_err());
}

#[test]
fn test_invalid_bind_address_is_rejected() {
    assert!(Config::try_parse_from(["ptrsync", "--metrics-bind-address", ":8080"]).is_err());
}
