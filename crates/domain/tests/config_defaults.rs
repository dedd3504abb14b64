use sg_domain::config::{Config, StorageKind};

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
fn empty_document_uses_original_service_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.schedule.max_rows, 500);
    assert!(config.schedule.include_project_row);
    assert_eq!(config.artifacts.ttl_minutes, 30);
    assert_eq!(config.artifacts.storage, StorageKind::Disk);
    assert!(config.artifacts.inline_base64);
    assert_eq!(config.server.public_base_url, "http://localhost:8000");
}

#[test]
fn sections_parse_independently() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 9100
public_base_url = "https://schedules.example.com"

[schedule]
max_rows = 120
sheet_name = "Plan"

[artifacts]
ttl_minutes = 5
sweep_interval_secs = 0
storage = "memory"
"#;
    let config = Config::from_toml_str(toml_str).unwrap();
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.schedule.max_rows, 120);
    assert_eq!(config.schedule.sheet_name, "Plan");
    assert_eq!(config.schedule.format_version, "1.0.0");
    assert_eq!(config.artifacts.ttl_minutes, 5);
    assert_eq!(config.artifacts.sweep_interval_secs, 0);
    assert_eq!(config.artifacts.storage, StorageKind::Memory);
}

#[test]
fn default_cors_allows_only_localhost() {
    let config = Config::default();
    assert!(config.server.cors.allowed_origins.contains(&"http://localhost:*".to_string()));
    assert!(config.server.cors.allowed_origins.contains(&"http://127.0.0.1:*".to_string()));
}

#[test]
fn show_roundtrips_through_toml() {
    let config = Config::default();
    let rendered = toml::to_string_pretty(&config).unwrap();
    let reparsed = Config::from_toml_str(&rendered).unwrap();
    assert_eq!(reparsed.schedule.max_rows, config.schedule.max_rows);
    assert_eq!(reparsed.artifacts.output_dir, config.artifacts.output_dir);
}
