use thiserror::Error;

use crate::app_config::{AppConfig, Environment};

const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can feed a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
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

    let env = parse_environment(&or_default("HEALTHNAV_ENV", "development"))?;

    let bind_addr = or_default("HEALTHNAV_BIND_ADDR", "0.0.0.0:5000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("HEALTHNAV_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("HEALTHNAV_LOG_LEVEL", "info");

    // An empty key in `.env` is as good as no key.
    let places_api_key = lookup("GOOGLE_PLACES_API_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());

    let places_base_url = or_default("HEALTHNAV_PLACES_BASE_URL", DEFAULT_PLACES_BASE_URL);
    if !places_base_url.starts_with("http://") && !places_base_url.starts_with("https://") {
        return Err(invalid(
            "HEALTHNAV_PLACES_BASE_URL",
            format!("expected an http(s) URL, got '{places_base_url}'"),
        ));
    }

    let places_timeout_secs = parse_u64("HEALTHNAV_PLACES_TIMEOUT_SECS", "30")?;
    if places_timeout_secs == 0 {
        return Err(invalid(
            "HEALTHNAV_PLACES_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let places_max_retries = parse_u32("HEALTHNAV_PLACES_MAX_RETRIES", "0")?;
    let places_retry_backoff_ms = parse_u64("HEALTHNAV_PLACES_RETRY_BACKOFF_MS", "500")?;
    let details_concurrency = parse_usize("HEALTHNAV_DETAILS_CONCURRENCY", "4")?.max(1);
    let rate_limit_per_minute = parse_usize("HEALTHNAV_RATE_LIMIT_PER_MINUTE", "120")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        places_api_key,
        places_base_url,
        places_timeout_secs,
        places_max_retries,
        places_retry_backoff_ms,
        details_concurrency,
        rate_limit_per_minute,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "HEALTHNAV_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
