use serial_test::serial;
use temp_env::with_vars;

use super::*;
use crate::Error;

fn cleanup_all_sync_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("SYNC__") || key == "CONFIG_PATH" {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_config_should_initialize_with_hardcoded_values() {
    let config = SyncConfig::default();

    assert_eq!(config.queue.max_pending, 1024);
    assert_eq!(config.queue.batch_size, 128);
    assert_eq!(config.queue.timeout_ms, 50);
    assert_eq!(config.pool.max_capacity, 8);
    assert_eq!(config.retry.cas.retry_interval_ms, 100);
    assert_eq!(config.retry.pool.max_retries, 3);
}

#[test]
#[serial]
fn new_should_merge_environment_overrides() {
    cleanup_all_sync_env_vars();
    with_vars(
        vec![
            ("SYNC__QUEUE__BATCH_SIZE", Some("7")),
            ("SYNC__POOL__MAX_CAPACITY", Some("3")),
        ],
        || {
            let config = SyncConfig::new().unwrap();

            assert_eq!(config.queue.batch_size, 7);
            assert_eq!(config.pool.max_capacity, 3);
            // Untouched values keep defaults
            assert_eq!(config.queue.max_pending, 1024);
        },
    );
}

#[test]
#[serial]
fn new_should_load_config_path_file() {
    cleanup_all_sync_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("sync.toml");
    std::fs::write(
        &config_path,
        r#"
        [queue]
        timeout_ms = 250
        "#,
    )
    .unwrap();

    with_vars(vec![("CONFIG_PATH", Some(config_path.to_str().unwrap()))], || {
        let config = SyncConfig::new().unwrap();
        assert_eq!(config.queue.timeout_ms, 250);
    });
}

#[test]
#[serial]
fn with_override_config_should_merge_file_settings() {
    cleanup_all_sync_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("dynamic_config.toml");

    std::fs::write(
        &config_path,
        r#"
        [queue]
        batch_size = 3 # Override default value

        [retry.cas]
        timeout_ms = 1000
        "#,
    )
    .unwrap();

    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let base_config = SyncConfig::new().expect("success");
        let config = base_config
            .with_override_config(config_path.to_str().unwrap())
            .unwrap();

        assert_eq!(config.queue.batch_size, 3);
        assert_eq!(config.retry.cas.timeout_ms, 1000);
        assert_eq!(config.retry.cas.retry_interval_ms, 100);
    });
}

#[test]
#[serial]
fn environment_should_win_over_override_file() {
    cleanup_all_sync_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("override.toml");
    std::fs::write(&config_path, "[pool]\nmax_capacity = 2\n").unwrap();

    with_vars(vec![("SYNC__POOL__MAX_CAPACITY", Some("5"))], || {
        let config = SyncConfig::default()
            .with_override_config(config_path.to_str().unwrap())
            .unwrap();
        assert_eq!(config.pool.max_capacity, 5);
    });
}

#[test]
fn validation_should_accept_defaults() {
    assert!(SyncConfig::default().validate().is_ok());
}

#[test]
fn validation_should_fail_with_zero_batch_size() {
    let mut config = SyncConfig::default();
    config.queue.batch_size = 0;
    assert!(matches!(config.validate(), Err(Error::Config(_))));
}

#[test]
fn validation_should_fail_with_zero_pool_capacity() {
    let mut config = SyncConfig::default();
    config.pool.max_capacity = 0;
    assert!(matches!(config.validate(), Err(Error::Config(_))));
}

#[test]
fn validation_should_fail_with_inverted_backoff() {
    let mut config = SyncConfig::default();
    config.retry.pool.base_delay_ms = 5000;
    config.retry.pool.max_delay_ms = 10;
    assert!(matches!(config.validate(), Err(Error::Config(_))));
}

#[test]
fn validation_should_fail_with_zero_cas_interval() {
    let mut config = SyncConfig::default();
    config.retry.cas.retry_interval_ms = 0;
    assert!(matches!(config.validate(), Err(Error::Config(_))));
}
