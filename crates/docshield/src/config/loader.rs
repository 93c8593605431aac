use std::path::Path;

use crate::config::schema::ClientConfig;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/client-config-v1.json");

/// Environment variable overriding `baseUrl`.
pub const BASE_URL_ENV: &str = "DOCSHIELD_BASE_URL";

/// Environment variable overriding `logging.level`.
pub const LOG_LEVEL_ENV: &str = "DOCSHIELD_LOG";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ClientConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<ClientConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: ClientConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Applies `DOCSHIELD_BASE_URL` and `DOCSHIELD_LOG` on top of a loaded config.
pub fn apply_env_overrides(mut config: ClientConfig) -> Result<ClientConfig, ConfigError> {
    if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
        if !base_url.trim().is_empty() {
            log::debug!("Overriding base URL from {}", BASE_URL_ENV);
            config.base_url = base_url.trim().to_string();
        }
    }
    if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
        if !level.trim().is_empty() {
            config.logging.level = level.trim().to_lowercase();
        }
    }

    validate_config(&config)?;
    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let base_url = reqwest::Url::parse(&config.base_url).map_err(|e| ConfigError::Validation {
        message: format!("Invalid base URL '{}': {}", config.base_url, e),
    })?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            message: format!("Base URL must use http or https, got '{}'", base_url.scheme()),
        });
    }

    if config.connect_timeout_secs == 0 || config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "Timeouts must be at least one second".to_string(),
        });
    }

    if !matches!(
        config.logging.level.as_str(),
        "error" | "warn" | "info" | "debug" | "trace"
    ) {
        return Err(ConfigError::Validation {
            message: format!("Unknown log level: {}", config.logging.level),
        });
    }

    Ok(())
}
