use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_meters = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(invalid(var, format!("must be a positive distance, got {value}")))
        }
    };

    let search_base_url = require("EMBER_SEARCH_BASE_URL")?;
    let search_api_key = lookup("EMBER_SEARCH_API_KEY")
        .ok()
        .filter(|v| !v.is_empty());
    let enrichment_base_url = lookup("EMBER_ENRICHMENT_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());

    let env = parse_environment(&or_default("EMBER_ENV", "development"));
    let log_level = or_default("EMBER_LOG_LEVEL", "info");

    let search_radius_meters = parse_meters("EMBER_SEARCH_RADIUS_METERS", "9000")?;
    let fallback_query = or_default("EMBER_FALLBACK_QUERY", "news");
    if fallback_query.trim().is_empty() {
        return Err(invalid("EMBER_FALLBACK_QUERY", "must not be empty".into()));
    }

    let max_items = parse_usize("EMBER_MAX_ITEMS", "8")?;
    if max_items == 0 {
        return Err(invalid("EMBER_MAX_ITEMS", "must be at least 1".into()));
    }

    let stale_after_secs = parse_u64("EMBER_STALE_AFTER_SECS", "45")?;
    let stale_distance_meters = parse_meters("EMBER_STALE_DISTANCE_METERS", "800")?;
    let http_timeout_secs = parse_u64("EMBER_HTTP_TIMEOUT_SECS", "15")?;
    if http_timeout_secs == 0 {
        return Err(invalid("EMBER_HTTP_TIMEOUT_SECS", "must be at least 1".into()));
    }
    let user_agent = or_default("EMBER_USER_AGENT", "ember/0.1 (map-news)");

    Ok(AppConfig {
        env,
        log_level,
        search_base_url,
        search_api_key,
        enrichment_base_url,
        search_radius_meters,
        fallback_query,
        max_items,
        stale_after_secs,
        stale_distance_meters,
        http_timeout_secs,
        user_agent,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
