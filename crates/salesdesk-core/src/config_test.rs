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

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("SALESDESK_DATA_PATH", "./fixtures/sales.json");
    m
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production_is_case_insensitive() {
    assert_eq!(
        parse_environment("PRODUCTION").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_is_rejected() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "SALESDESK_ENV"));
}

#[test]
fn build_app_config_fails_without_data_path() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SALESDESK_DATA_PATH"),
        "expected MissingEnvVar(SALESDESK_DATA_PATH), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_data_path_as_missing() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("SALESDESK_DATA_PATH", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.data_path.to_string_lossy(), "./fixtures/sales.json");
    assert!(cfg.openai_api_key.is_none());
    assert_eq!(cfg.openai_model, "gpt-4o-mini");
    assert_eq!(cfg.openai_base_url, "https://api.openai.com/v1");
    assert_eq!(cfg.llm_timeout_secs, 10);
    assert_eq!(cfg.llm_long_timeout_secs, 15);
    assert_eq!(cfg.sender_name, "The Sales Team");
}

#[test]
fn build_app_config_reads_openai_settings() {
    let mut map = full_env();
    map.insert("OPENAI_API_KEY", " sk-test-123 ");
    map.insert("OPENAI_MODEL", "gpt-4o");
    map.insert("OPENAI_BASE_URL", "http://localhost:9999/v1");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.openai_api_key.as_deref(), Some("sk-test-123"));
    assert_eq!(cfg.openai_model, "gpt-4o");
    assert_eq!(cfg.openai_base_url, "http://localhost:9999/v1");
}

#[test]
fn build_app_config_empty_api_key_is_none() {
    let mut map = full_env();
    map.insert("OPENAI_API_KEY", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.openai_api_key.is_none());
}

#[test]
fn build_app_config_timeout_override() {
    let mut map = full_env();
    map.insert("SALESDESK_LLM_TIMEOUT_SECS", "4");
    map.insert("SALESDESK_LLM_LONG_TIMEOUT_SECS", "30");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.llm_timeout_secs, 4);
    assert_eq!(cfg.llm_long_timeout_secs, 30);
}

#[test]
fn build_app_config_timeout_invalid() {
    let mut map = full_env();
    map.insert("SALESDESK_LLM_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SALESDESK_LLM_TIMEOUT_SECS"),
        "expected InvalidEnvVar(SALESDESK_LLM_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_zero_timeout_rejected() {
    let mut map = full_env();
    map.insert("SALESDESK_LLM_LONG_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SALESDESK_LLM_LONG_TIMEOUT_SECS"),
        "expected InvalidEnvVar(SALESDESK_LLM_LONG_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_api_key() {
    let mut map = full_env();
    map.insert("OPENAI_API_KEY", "sk-very-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("sk-very-secret"));
    assert!(rendered.contains("[redacted]"));
}
