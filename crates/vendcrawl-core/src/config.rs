use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::error::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse. Every variable has a
/// default, so a bare environment is valid.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_config_from_env() -> Result<AppConfig, ConfigError> {
    build_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing logic, decoupled from the actual environment so
/// it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var`
/// needed.
fn build_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
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

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let data_dir = PathBuf::from(or_default("VENDCRAWL_DATA_DIR", "./data"));
    let output_dir = PathBuf::from(or_default("VENDCRAWL_OUTPUT_DIR", "./output"));
    let regions_path = PathBuf::from(or_default("VENDCRAWL_REGIONS_PATH", "./config/regions.yaml"));
    let base_url = or_default("VENDCRAWL_BASE_URL", "https://www.talabat.com");
    let log_level = or_default("VENDCRAWL_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("VENDCRAWL_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("VENDCRAWL_USER_AGENT", "vendcrawl/0.1 (catalog-crawler)");
    let inter_request_delay_ms = parse_u64("VENDCRAWL_INTER_REQUEST_DELAY_MS", "2000")?;
    let inter_page_delay_ms = parse_u64("VENDCRAWL_INTER_PAGE_DELAY_MS", "5000")?;

    let retry_max_attempts = parse_u32("VENDCRAWL_RETRY_MAX_ATTEMPTS", "3")?;
    if retry_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VENDCRAWL_RETRY_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let retry_initial_delay_ms = parse_u64("VENDCRAWL_RETRY_INITIAL_DELAY_MS", "1000")?;
    let retry_backoff_factor = parse_f64("VENDCRAWL_RETRY_BACKOFF_FACTOR", "2.0")?;
    if retry_backoff_factor < 1.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VENDCRAWL_RETRY_BACKOFF_FACTOR".to_string(),
            reason: "must be >= 1.0".to_string(),
        });
    }
    let retry_max_delay_ms = parse_u64("VENDCRAWL_RETRY_MAX_DELAY_MS", "60000")?;

    let backup_base_url = lookup("VENDCRAWL_BACKUP_URL").ok().filter(|s| !s.is_empty());
    let upload_destinations = lookup("VENDCRAWL_UPLOAD_URLS")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    Ok(AppConfig {
        data_dir,
        output_dir,
        regions_path,
        base_url,
        log_level,
        request_timeout_secs,
        user_agent,
        inter_request_delay_ms,
        inter_page_delay_ms,
        retry_max_attempts,
        retry_initial_delay_ms,
        retry_backoff_factor,
        retry_max_delay_ms,
        backup_base_url,
        upload_destinations,
    })
}

#[cfg(test)]
mod tests {
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

    #[test]
    fn empty_env_uses_defaults() {
        let map: HashMap<&str, &str> = HashMap::new();
        let config = build_config(lookup_from_map(&map)).expect("defaults should be valid");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.retry_max_attempts, 3);
        assert_eq!(config.inter_request_delay_ms, 2000);
        assert!(config.backup_base_url.is_none());
        assert!(config.upload_destinations.is_empty());
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let mut map = HashMap::new();
        map.insert("VENDCRAWL_REQUEST_TIMEOUT_SECS", "not-a-number");
        let result = build_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. })
                if var == "VENDCRAWL_REQUEST_TIMEOUT_SECS"),
            "expected InvalidEnvVar, got: {result:?}"
        );
    }

    #[test]
    fn zero_retry_attempts_is_rejected() {
        let mut map = HashMap::new();
        map.insert("VENDCRAWL_RETRY_MAX_ATTEMPTS", "0");
        let result = build_config(lookup_from_map(&map));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn backoff_factor_below_one_is_rejected() {
        let mut map = HashMap::new();
        map.insert("VENDCRAWL_RETRY_BACKOFF_FACTOR", "0.5");
        let result = build_config(lookup_from_map(&map));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn upload_urls_are_split_and_trimmed() {
        let mut map = HashMap::new();
        map.insert(
            "VENDCRAWL_UPLOAD_URLS",
            "https://store-a.example/up, https://store-b.example/up ,",
        );
        let config = build_config(lookup_from_map(&map)).unwrap();
        assert_eq!(
            config.upload_destinations,
            vec![
                "https://store-a.example/up".to_string(),
                "https://store-b.example/up".to_string(),
            ]
        );
    }

    #[test]
    fn empty_backup_url_is_treated_as_unset() {
        let mut map = HashMap::new();
        map.insert("VENDCRAWL_BACKUP_URL", "");
        let config = build_config(lookup_from_map(&map)).unwrap();
        assert!(config.backup_base_url.is_none());
    }
}
