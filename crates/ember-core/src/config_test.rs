use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid values.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("EMBER_SEARCH_BASE_URL", "https://places.example.test");
    m
}

#[test]
fn parse_environment_variants() {
    assert_eq!(parse_environment("development"), Environment::Development);
    assert_eq!(parse_environment("test"), Environment::Test);
    assert_eq!(parse_environment("production"), Environment::Production);
}

#[test]
fn parse_environment_unknown_defaults_to_development() {
    assert_eq!(parse_environment("staging"), Environment::Development);
}

#[test]
fn build_app_config_fails_without_search_base_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "EMBER_SEARCH_BASE_URL"),
        "expected MissingEnvVar(EMBER_SEARCH_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_base_url_as_missing() {
    let mut map = HashMap::new();
    map.insert("EMBER_SEARCH_BASE_URL", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_applies_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.search_base_url, "https://places.example.test");
    assert!(cfg.search_api_key.is_none());
    assert!(cfg.enrichment_base_url.is_none());
    assert!((cfg.search_radius_meters - 9_000.0).abs() < f64::EPSILON);
    assert_eq!(cfg.fallback_query, "news");
    assert_eq!(cfg.max_items, 8);
    assert_eq!(cfg.stale_after_secs, 45);
    assert!((cfg.stale_distance_meters - 800.0).abs() < f64::EPSILON);
    assert_eq!(cfg.http_timeout_secs, 15);
    assert_eq!(cfg.user_agent, "ember/0.1 (map-news)");
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = full_env();
    map.insert("EMBER_ENV", "production");
    map.insert("EMBER_SEARCH_API_KEY", "secret");
    map.insert("EMBER_ENRICHMENT_BASE_URL", "https://scenes.example.test");
    map.insert("EMBER_SEARCH_RADIUS_METERS", "4500.5");
    map.insert("EMBER_FALLBACK_QUERY", "events");
    map.insert("EMBER_MAX_ITEMS", "12");
    map.insert("EMBER_STALE_AFTER_SECS", "90");
    map.insert("EMBER_STALE_DISTANCE_METERS", "250");
    let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.search_api_key.as_deref(), Some("secret"));
    assert_eq!(
        cfg.enrichment_base_url.as_deref(),
        Some("https://scenes.example.test")
    );
    assert!((cfg.search_radius_meters - 4_500.5).abs() < f64::EPSILON);
    assert_eq!(cfg.fallback_query, "events");
    assert_eq!(cfg.max_items, 12);
    assert_eq!(cfg.stale_after_secs, 90);
    assert!((cfg.stale_distance_meters - 250.0).abs() < f64::EPSILON);
}

#[test]
fn build_app_config_rejects_non_numeric_radius() {
    let mut map = full_env();
    map.insert("EMBER_SEARCH_RADIUS_METERS", "far");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "EMBER_SEARCH_RADIUS_METERS"),
        "expected InvalidEnvVar(EMBER_SEARCH_RADIUS_METERS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_positive_distance() {
    let mut map = full_env();
    map.insert("EMBER_STALE_DISTANCE_METERS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "EMBER_STALE_DISTANCE_METERS"),
        "expected InvalidEnvVar(EMBER_STALE_DISTANCE_METERS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_max_items() {
    let mut map = full_env();
    map.insert("EMBER_MAX_ITEMS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "EMBER_MAX_ITEMS"),
        "expected InvalidEnvVar(EMBER_MAX_ITEMS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_invalid_timeout() {
    let mut map = full_env();
    map.insert("EMBER_HTTP_TIMEOUT_SECS", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "EMBER_HTTP_TIMEOUT_SECS"),
        "expected InvalidEnvVar(EMBER_HTTP_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_timeout() {
    let mut map = full_env();
    map.insert("EMBER_HTTP_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "EMBER_HTTP_TIMEOUT_SECS"),
        "expected InvalidEnvVar(EMBER_HTTP_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_blank_fallback_query() {
    let mut map = full_env();
    map.insert("EMBER_FALLBACK_QUERY", "  ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "EMBER_FALLBACK_QUERY"
    ));
}

#[test]
fn debug_output_redacts_api_key() {
    let mut map = full_env();
    map.insert("EMBER_SEARCH_API_KEY", "super-secret-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret-key"));
    assert!(rendered.contains("[redacted]"));
}
