//! Runtime configuration.
//!
//! Values come from `CHARCARD_*` variables (or the matching command-line
//! flags, which clap resolves against the same variables) and fall back to
//! defaults when unset.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use share::DEFAULT_MAX_LINK_LEN;

pub const BASE_URL_VAR: &str = "CHARCARD_BASE_URL";
pub const MAX_LINK_LEN_VAR: &str = "CHARCARD_MAX_LINK_LEN";
pub const ID_SEED_VAR: &str = "CHARCARD_ID_SEED";

/// Where share links point when no base URL is configured: the editor's dev server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5173/";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?} is not {expected}")]
    Invalid { var: &'static str, value: String, expected: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Editor URL that share links are built on.
    pub base_url: String,
    /// Longest share link to produce, in characters.
    pub max_link_len: usize,
    /// Seed for deterministic entity ids; random ids when unset.
    pub id_seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_owned(), max_link_len: DEFAULT_MAX_LINK_LEN, id_seed: None }
    }
}

impl AppConfig {
    /// Build configuration from a key lookup. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when a value is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get(BASE_URL_VAR) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid { var: BASE_URL_VAR, value: url, expected: "an http(s) URL" });
            }
            config.base_url = url;
        }
        if let Some(raw) = get(MAX_LINK_LEN_VAR) {
            config.max_link_len = match raw.parse::<usize>() {
                Ok(len) if len > 0 => len,
                _ => {
                    return Err(ConfigError::Invalid { var: MAX_LINK_LEN_VAR, value: raw, expected: "a positive integer" });
                }
            };
        }
        if let Some(raw) = get(ID_SEED_VAR) {
            let Ok(seed) = raw.parse::<u64>() else {
                return Err(ConfigError::Invalid { var: ID_SEED_VAR, value: raw, expected: "an unsigned integer" });
            };
            config.id_seed = Some(seed);
        }
        Ok(config)
    }
}
