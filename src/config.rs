use crate::transport::http::DEFAULT_API_URL;
use anyhow::{Context as _, Result};

pub const API_KEY_VAR: &str = "WAKATIME_API_KEY";
pub const API_URL_VAR: &str = "WAKATIME_API_URL";
pub const ENABLED_VAR: &str = "WAKATIME_ENABLED";
pub const DEBUG_VAR: &str = "WAKATIME_DEBUG";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_url: String,
    pub enabled: bool,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: None,
            api_url: DEFAULT_API_URL.to_owned(),
            enabled: true,
            debug: false,
        }
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        Config {
            api_key: get(API_KEY_VAR),
            api_url: get(API_URL_VAR).unwrap_or(defaults.api_url),
            enabled: get(ENABLED_VAR).map_or(defaults.enabled, |v| flag(ENABLED_VAR, &v, defaults.enabled)),
            debug: get(DEBUG_VAR).map_or(defaults.debug, |v| flag(DEBUG_VAR, &v, defaults.debug)),
        }
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .with_context(|| format!("no api key configured, set \"{}\"", API_KEY_VAR))
    }
}

fn flag(key: &str, value: &str, default: bool) -> bool {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            tracing::warn!("ignoring \"{}\"={:?}, expected a boolean", key, value);
            default
        }
    }
}
