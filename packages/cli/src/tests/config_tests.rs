use std::collections::HashMap;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::config::{Config, ConfigError};

fn config_with(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| map.get(key).cloned())
}

#[test]
fn test_config_defaults() {
    let config = config_with(&[]).unwrap();

    assert_eq!(config.port, 4010);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.cors_origin, "http://localhost:5173");
    assert_eq!(config.default_tier, "free");
    assert_eq!(config.default_credits, 1);
    assert_eq!(config.share_link_ttl_days, 7);
    assert_eq!(config.generation_lease_secs, 300);
    assert!(config.webhook_secret.is_none());
    assert!(config.database_path.ends_with("juststart.db"));
}

#[test]
fn test_config_custom_values() {
    let config = config_with(&[
        ("PORT", "8080"),
        ("HOST", "0.0.0.0"),
        ("DATABASE_PATH", "/tmp/js.db"),
        ("CORS_ORIGIN", "https://app.example.com"),
        ("IDENTITY_WEBHOOK_SECRET", "whsec_c2VjcmV0"),
        ("DEFAULT_SUBSCRIPTION_TIER", "pro"),
        ("DEFAULT_CREDITS", "10"),
        ("SHARE_LINK_TTL_DAYS", "30"),
        ("GENERATION_LEASE_SECS", "60"),
    ])
    .unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.database_path, PathBuf::from("/tmp/js.db"));
    assert_eq!(config.cors_origin, "https://app.example.com");
    assert_eq!(config.webhook_secret.as_deref(), Some("whsec_c2VjcmV0"));

    let settings = config.api_settings();
    assert_eq!(settings.subscription_defaults.tier, "pro");
    assert_eq!(settings.subscription_defaults.credits, 10);
    assert_eq!(settings.share_link_ttl, chrono::Duration::days(30));
    assert_eq!(settings.generation_lease_ttl.as_secs(), 60);
}

#[test]
fn test_blank_values_fall_back_to_defaults() {
    let config = config_with(&[("PORT", "  "), ("IDENTITY_WEBHOOK_SECRET", "")]).unwrap();
    assert_eq!(config.port, 4010);
    assert!(config.webhook_secret.is_none());
}

#[test]
fn test_config_invalid_port() {
    let result = config_with(&[("PORT", "not-a-number")]);
    assert!(matches!(result.unwrap_err(), ConfigError::InvalidPort(_)));
}

#[test]
fn test_config_port_zero() {
    let result = config_with(&[("PORT", "0")]);
    assert!(matches!(result.unwrap_err(), ConfigError::PortOutOfRange(0)));
}

#[rstest]
#[case("DEFAULT_CREDITS", "lots")]
#[case("DEFAULT_CREDITS", "-1")]
#[case("SHARE_LINK_TTL_DAYS", "a week")]
#[case("GENERATION_LEASE_SECS", "-5")]
fn test_invalid_numbers_are_rejected(#[case] name: &str, #[case] value: &str) {
    let result = config_with(&[(name, value)]);
    assert!(matches!(result.unwrap_err(), ConfigError::InvalidNumber { .. }));
}

#[rstest]
#[case("SHARE_LINK_TTL_DAYS")]
#[case("GENERATION_LEASE_SECS")]
fn test_zero_durations_are_rejected(#[case] name: &str) {
    let result = config_with(&[(name, "0")]);
    assert!(matches!(result.unwrap_err(), ConfigError::NotPositive { .. }));
}
