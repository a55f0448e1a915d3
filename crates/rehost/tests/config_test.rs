//! Tests for layered configuration loading.

use rehost::{RehostConfig, StoreBackend};
use std::io::Write;

#[test]
fn partial_sections_keep_remaining_defaults() {
    let config = RehostConfig::from_toml_str(
        r#"
        [cache.retry]
        max_fetch_attempts = 2

        [store]
        backend = "filesystem"
        root = "/srv/media"
        "#,
    )
    .unwrap();

    assert_eq!(config.cache.retry.max_fetch_attempts, 2);
    assert_eq!(config.cache.retry.max_upload_attempts, 4);
    assert_eq!(config.cache.retry.backoff_cap_seconds, 15.0);
    assert_eq!(config.cache.path_prefix, "assets");

    assert_eq!(config.store.backend, StoreBackend::Filesystem);
    assert_eq!(config.store.root.to_str(), Some("/srv/media"));
    assert_eq!(config.store.mirror_host, "blob.vercel-storage.com");

    assert_eq!(config.vendor.domain, "rescuegroups.org");
    assert_eq!(config.batch.concurrency, 3);
    assert_eq!(config.batch.repair_concurrency, 6);
}

#[test]
fn wrong_types_are_rejected() {
    let err = RehostConfig::from_toml_str(
        r#"
        [batch]
        concurrency = "lots"
        "#,
    )
    .unwrap_err();
    assert!(err.diagnostic().contains("Failed to parse configuration"));
}

#[test]
fn unknown_backend_is_rejected() {
    let result = RehostConfig::from_toml_str(
        r#"
        [store]
        backend = "ftp"
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn explicit_file_is_layered_over_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
        [vendor]
        user_agent = "Tester/2.0"

        [database]
        pool_size = 2
        "#
    )
    .unwrap();

    let config = RehostConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.vendor.user_agent, "Tester/2.0");
    assert_eq!(config.database.pool_size, 2);
    assert_eq!(config.cache.source, "RG");
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = RehostConfig::load(Some(&dir.path().join("absent.toml")));
    assert!(result.is_err());
}
