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
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let data_path = PathBuf::from(require("SALESDESK_DATA_PATH")?);
    let env = parse_environment(&or_default("SALESDESK_ENV", "development"))?;
    let log_level = or_default("SALESDESK_LOG_LEVEL", "info");

    let openai_api_key = lookup("OPENAI_API_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    let openai_model = or_default("OPENAI_MODEL", "gpt-4o-mini");
    let openai_base_url = or_default("OPENAI_BASE_URL", "https://api.openai.com/v1");

    let llm_timeout_secs = parse_u64("SALESDESK_LLM_TIMEOUT_SECS", "10")?;
    let llm_long_timeout_secs = parse_u64("SALESDESK_LLM_LONG_TIMEOUT_SECS", "15")?;
    if llm_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SALESDESK_LLM_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    if llm_long_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SALESDESK_LLM_LONG_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let sender_name = or_default("SALESDESK_SENDER_NAME", "The Sales Team");

    Ok(AppConfig {
        env,
        log_level,
        data_path,
        openai_api_key,
        openai_model,
        openai_base_url,
        llm_timeout_secs,
        llm_long_timeout_secs,
        sender_name,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "development" | "dev" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" | "prod" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SALESDESK_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
