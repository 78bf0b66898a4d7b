use std::collections::HashMap;

use crate::app_config::{AggregatorConfig, AppConfig, Environment};
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

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> { lookup(var).ok().filter(|v| !v.is_empty()) };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "value must be finite".to_string(),
            })
        }
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("TF_ENV", "development"));
    let bind_addr = parse_addr("TF_BIND_ADDR", "127.0.0.1:8000")?;
    let database_url = or_default("DATABASE_URL", "sqlite://data/trendforge.db?mode=rwc");
    let log_level = or_default("TF_LOG_LEVEL", "info");
    let keywords_path = PathBuf::from(or_default("TF_KEYWORDS_PATH", "./config/keywords.yaml"));

    let aggregator = AggregatorConfig {
        source_weights: parse_weights("TF_SOURCE_WEIGHTS", &or_default("TF_SOURCE_WEIGHTS", ""))?,
        velocity_spike_pct: parse_f64("TF_VELOCITY_SPIKE_PCT", "30.0")?,
        velocity_collapse_pct: parse_f64("TF_VELOCITY_COLLAPSE_PCT", "-30.0")?,
        collapse_score_floor: parse_f64("TF_COLLAPSE_SCORE_FLOOR", "40.0")?,
        confidence_high: parse_f64("TF_CONFIDENCE_HIGH", "0.75")?,
        confidence_medium: parse_f64("TF_CONFIDENCE_MEDIUM", "0.45")?,
    };

    let source_timeout_secs = parse_u64("TF_SOURCE_TIMEOUT_SECS", "10")?;
    let collaborator_max_retries = parse_u32("TF_COLLABORATOR_MAX_RETRIES", "3")?;
    let collaborator_backoff_base_ms = parse_u64("TF_COLLABORATOR_BACKOFF_BASE_MS", "500")?;

    let search_interest_url = optional("TF_SEARCH_INTEREST_URL");
    let sheets_bridge_url = optional("TF_SHEETS_BRIDGE_URL");
    let artifact_base_url = or_default("TF_ARTIFACT_BASE_URL", "https://sheets.local/artifacts");

    let etsy_api_key = optional("TF_ETSY_API_KEY");
    let etsy_access_token = optional("TF_ETSY_ACCESS_TOKEN");
    let etsy_shop_id = optional("TF_ETSY_SHOP_ID");
    let etsy_price_cents = parse_i64("TF_ETSY_PRICE_CENTS", "999")?;
    let pinterest_access_token = optional("TF_PINTEREST_ACCESS_TOKEN");
    let pinterest_board_id = optional("TF_PINTEREST_BOARD_ID");

    let publish_max_concurrency = parse_usize("TF_PUBLISH_MAX_CONCURRENCY", "4")?.max(1);
    let research_schedule = optional("TF_RESEARCH_SCHEDULE");

    Ok(AppConfig {
        env,
        bind_addr,
        database_url,
        log_level,
        keywords_path,
        aggregator,
        source_timeout_secs,
        collaborator_max_retries,
        collaborator_backoff_base_ms,
        search_interest_url,
        sheets_bridge_url,
        artifact_base_url,
        etsy_api_key,
        etsy_access_token,
        etsy_shop_id,
        etsy_price_cents,
        pinterest_access_token,
        pinterest_board_id,
        publish_max_concurrency,
        research_schedule,
    })
}

/// Parse a `name=weight,name=weight` source-weight list.
///
/// Empty input yields an empty map (every source weighs 1.0).
fn parse_weights(var: &str, raw: &str) -> Result<HashMap<String, f64>, ConfigError> {
    let mut weights = HashMap::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((name, value)) = pair.split_once('=') else {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected name=weight, got '{pair}'"),
            });
        };
        let weight = value
            .trim()
            .parse::<f64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("weight for '{name}': {e}"),
            })?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("weight for '{name}' must be finite and non-negative"),
            });
        }
        weights.insert(name.trim().to_string(), weight);
    }
    Ok(weights)
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
