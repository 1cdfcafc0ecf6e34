//! Connection settings shared by every API handle.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.sparkpost.com";
pub const DEFAULT_API_VERSION: u32 = 1;

/// Everything needed to address and authenticate against the API.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_api_version")]
    pub api_version: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_version() -> u32 {
    DEFAULT_API_VERSION
}

impl Config {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            api_version: DEFAULT_API_VERSION,
        }
    }

    /// Build a config from string keys `baseurl`, `apikey` and `apiver`.
    /// All three are required; `apiver` must be an unsigned integer.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ApiError> {
        let base_url = map
            .get("baseurl")
            .ok_or_else(|| ApiError::Config("baseurl is required".to_string()))?;
        let api_key = map
            .get("apikey")
            .ok_or_else(|| ApiError::Config("apikey is required".to_string()))?;
        let api_version = map
            .get("apiver")
            .ok_or_else(|| ApiError::Config("apiver is required".to_string()))?;
        let api_version = api_version
            .trim()
            .parse()
            .map_err(|e| ApiError::Config(format!("apiver [{api_version}]: {e}")))?;

        Ok(Self {
            base_url: base_url.clone(),
            api_key: api_key.clone(),
            api_version,
        })
    }
}

// The key never ends up in logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}
