// Config loading and validation tests

use opendata_gateway::config::AppConfig;
use std::collections::HashMap;
use std::time::Duration;

const VALID_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[broker]
url = "http://context-broker:8080"
tenant = "default"
page_size = 50
request_timeout_secs = 15

[refresh]
success_interval_secs = 300
failure_interval_secs = 10

[beaches]
max_water_quality_distance_m = 500
water_quality_max_age_hours = 12
"#;

const MINIMAL_CONFIG: &str = r#"
[server]
port = 8080
host = "127.0.0.1"

[broker]
url = "https://broker.example.org"
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.broker.url, "http://context-broker:8080");
    assert_eq!(config.broker.page_size, 50);
    assert_eq!(config.broker.request_timeout_secs, 15);
    assert_eq!(config.beaches.max_water_quality_distance_m, 500);
    assert_eq!(config.beaches.water_quality_max_age_hours, 12);
}

#[test]
fn test_config_defaults_when_omitted() {
    let config = AppConfig::load_from_str(MINIMAL_CONFIG).expect("valid");
    assert_eq!(config.broker.tenant, "default");
    assert_eq!(config.broker.page_size, 100);
    assert_eq!(config.broker.request_timeout_secs, 30);
    assert_eq!(config.refresh.success_interval_secs, 300);
    assert_eq!(config.refresh.failure_interval_secs, 10);
    assert_eq!(config.beaches.max_water_quality_distance_m, 1000);
    assert_eq!(config.beaches.water_quality_max_age_hours, 24);

    let policy = config.refresh.policy();
    assert_eq!(policy.success_interval, Duration::from_secs(300));
    assert_eq!(policy.failure_interval, Duration::from_secs(10));
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8081", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_empty_broker_url() {
    let bad = VALID_CONFIG.replace("url = \"http://context-broker:8080\"", "url = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("broker.url"));
}

#[test]
fn test_config_validation_rejects_non_http_broker_url() {
    let bad = VALID_CONFIG.replace("http://context-broker:8080", "ftp://context-broker");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("broker.url"));
}

#[test]
fn test_config_validation_rejects_page_size_zero() {
    let bad = VALID_CONFIG.replace("page_size = 50", "page_size = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("broker.page_size"));
}

#[test]
fn test_config_validation_rejects_zero_intervals() {
    let bad = VALID_CONFIG.replace("success_interval_secs = 300", "success_interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("refresh.success_interval_secs"));

    let bad = VALID_CONFIG.replace("failure_interval_secs = 10", "failure_interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("refresh.failure_interval_secs"));
}

#[test]
fn test_config_validation_rejects_zero_beach_limits() {
    let bad = VALID_CONFIG.replace(
        "max_water_quality_distance_m = 500",
        "max_water_quality_distance_m = 0",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("max_water_quality_distance_m"));
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_overrides_replace_broker_settings() {
    let mut config = AppConfig::load_from_str(VALID_CONFIG).unwrap();
    let env: HashMap<&str, &str> = HashMap::from([
        ("CONTEXT_BROKER_URL", "http://orion-ld:1026"),
        ("CONTEXT_BROKER_TENANT", "sundsvall"),
    ]);
    config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
    assert_eq!(config.broker.url, "http://orion-ld:1026");
    assert_eq!(config.broker.tenant, "sundsvall");
}

#[test]
fn test_config_empty_overrides_are_ignored() {
    let mut config = AppConfig::load_from_str(VALID_CONFIG).unwrap();
    config.apply_overrides(|_| Some(String::new()));
    assert_eq!(config.broker.url, "http://context-broker:8080");
    assert_eq!(config.broker.tenant, "default");
}

#[test]
fn test_config_load_from_file_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.broker.page_size, 50);
}
