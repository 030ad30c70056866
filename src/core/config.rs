use std::env;

use crate::core::errors::ApiError;

const DEFAULT_PORT: u16 = 8000;

/// Runtime settings, read once from the process environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API key for the generative-model API.
    pub gemini_api_key: String,
    /// API key for the web-search API. Only required when the search
    /// action is actually invoked.
    pub serpapi_key: Option<String>,
    /// Override for the Gemini API base URL (proxies, tests).
    pub gemini_base_url: Option<String>,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> Result<Self, ApiError> {
        let gemini_api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| ApiError::Internal("GEMINI_API_KEY is not set".to_string()))?;

        let serpapi_key = env::var("SERPAPI_KEY").ok().filter(|v| !v.is_empty());
        let gemini_base_url = env::var("GEMINI_BASE_URL").ok().filter(|v| !v.is_empty());

        let port = env::var("PORT")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Settings {
            gemini_api_key,
            serpapi_key,
            gemini_base_url,
            port,
        })
    }
}
