use apidb_bulk::config::{WriteMode, WriterConfig};

#[test]
fn defaults_are_offline_with_an_unset_user() {
    let config = WriterConfig::default();
    assert_eq!(config.mode, WriteMode::Offline);
    assert_eq!(config.user_id, -1);
    assert_eq!(config.max_changes_per_changeset, 50_000);
    assert!(config.sql_file_copy_location.is_none());
    assert!(!config.execute_sql);
}

#[test]
fn config_deserializes_with_partial_keys() {
    let config: WriterConfig =
        serde_json::from_str(r#"{"mode": "online", "user_id": 42, "execute_sql": true}"#).unwrap();
    assert_eq!(config.mode, WriteMode::Online);
    assert_eq!(config.user_id, 42);
    assert!(config.execute_sql);
    // untouched keys keep their defaults
    assert_eq!(config.status_update_interval, 10_000);
    assert_eq!(config.file_output_line_buffer_size, 500);
}

#[test]
fn copy_location_deserializes_as_a_path() {
    let config: WriterConfig =
        serde_json::from_str(r#"{"user_id": 1, "sql_file_copy_location": "/tmp/out.sql"}"#)
            .unwrap();
    assert_eq!(
        config.sql_file_copy_location.as_deref(),
        Some(std::path::Path::new("/tmp/out.sql"))
    );
}
