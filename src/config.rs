use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::services::ai_service::ApiKey;
use crate::services::openai::{OpenAiConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Seeds the settings store on startup when it holds no key
    pub openai_api_key: Option<ApiKey>,
    pub openai: OpenAiConfig,
    pub settings_path: PathBuf,
    #[cfg(feature = "http-server")]
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Build from an explicit variable map (used by tests).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let get = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

        let defaults = OpenAiConfig::default();
        let openai = OpenAiConfig {
            endpoint: get("OPENAI_ENDPOINT").unwrap_or(DEFAULT_ENDPOINT).to_string(),
            model: get("OPENAI_MODEL").unwrap_or(DEFAULT_MODEL).to_string(),
            temperature: parse_or(
                get("OPENAI_TEMPERATURE"),
                "OPENAI_TEMPERATURE",
                defaults.temperature,
            )?,
            max_tokens: parse_or(
                get("OPENAI_MAX_TOKENS"),
                "OPENAI_MAX_TOKENS",
                defaults.max_tokens,
            )?,
            timeout: Duration::from_secs(parse_or(
                get("OPENAI_TIMEOUT_SECS"),
                "OPENAI_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
        };

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY").and_then(ApiKey::new),
            openai,
            settings_path: PathBuf::from(get("SETTINGS_PATH").unwrap_or("settings.json")),
            #[cfg(feature = "http-server")]
            bind_addr: get("BIND_ADDR").unwrap_or("0.0.0.0:8080").to_string(),
        })
    }
}

fn parse_or<T>(raw: Option<&str>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", name, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_vars(&HashMap::new()).unwrap();

        assert!(config.openai_api_key.is_none());
        assert_eq!(config.openai.endpoint, "https://api.openai.com/v1/chat/completions");
        assert_eq!(config.openai.model, "gpt-3.5-turbo");
        assert_eq!(config.openai.max_tokens, 1500);
        assert_eq!(config.openai.timeout, Duration::from_secs(20));
        assert_eq!(config.settings_path, PathBuf::from("settings.json"));
        #[cfg(feature = "http-server")]
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_vars(&vars(&[
            ("OPENAI_API_KEY", "sk-env"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("OPENAI_TEMPERATURE", "0.2"),
            ("OPENAI_TIMEOUT_SECS", "10"),
            ("SETTINGS_PATH", "/var/lib/grocery/settings.json"),
        ]))
        .unwrap();

        assert_eq!(config.openai_api_key.unwrap().expose(), "sk-env");
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert!((config.openai.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.openai.timeout, Duration::from_secs(10));
        assert_eq!(config.settings_path, PathBuf::from("/var/lib/grocery/settings.json"));
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = AppConfig::from_vars(&vars(&[("OPENAI_API_KEY", "  ")])).unwrap();
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_invalid_number_is_error() {
        let err = AppConfig::from_vars(&vars(&[("OPENAI_MAX_TOKENS", "lots")])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_MAX_TOKENS"));
    }
}
