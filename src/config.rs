//! Configuration, loaded from the environment.
//!
//! Both remote providers are optional: without chart-provider credentials
//! the deterministic fallback computes every chart, and without an LLM key
//! the templated fallbacks answer everything. Geocoding has a keyless
//! default endpoint.

use secrecy::SecretString;

use crate::error::ConfigError;

const DEFAULT_GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Geocoding endpoints.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    pub search_url: String,
    /// Optional reverse timezone endpoint; absent means the longitude
    /// estimate is the only fallback after the candidate's own timezone.
    pub timezone_url: Option<String>,
}

/// OAuth2 chart provider credentials and endpoints.
#[derive(Debug, Clone)]
pub struct ChartProviderConfig {
    pub token_url: String,
    pub chart_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

/// LLM provider settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: SecretString,
    pub model: String,
}

/// Full process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub geocode: GeocodeConfig,
    pub chart_provider: Option<ChartProviderConfig>,
    pub llm: Option<LlmConfig>,
}

impl Config {
    /// Load from environment variables, applying defaults where sensible.
    pub fn from_env() -> Result<Self, ConfigError> {
        let geocode = GeocodeConfig {
            search_url: env_or("GEOCODE_SEARCH_URL", DEFAULT_GEOCODE_URL),
            timezone_url: std::env::var("GEOCODE_TIMEZONE_URL").ok(),
        };

        let chart_provider = match (
            std::env::var("ASTRO_CLIENT_ID").ok(),
            std::env::var("ASTRO_CLIENT_SECRET").ok(),
        ) {
            (Some(client_id), Some(secret)) => {
                let token_url = std::env::var("ASTRO_TOKEN_URL")
                    .map_err(|_| ConfigError::MissingEnvVar("ASTRO_TOKEN_URL".to_string()))?;
                let chart_url = std::env::var("ASTRO_CHART_URL")
                    .map_err(|_| ConfigError::MissingEnvVar("ASTRO_CHART_URL".to_string()))?;
                Some(ChartProviderConfig {
                    token_url,
                    chart_url,
                    client_id,
                    client_secret: SecretString::from(secret),
                })
            }
            (None, None) => None,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: "ASTRO_CLIENT_ID/ASTRO_CLIENT_SECRET".to_string(),
                    message: "both must be set together".to_string(),
                });
            }
        };

        let llm = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .map(|key| LlmConfig {
                api_url: env_or("LLM_API_URL", DEFAULT_LLM_API_URL),
                api_key: SecretString::from(key),
                model: env_or("LLM_MODEL", DEFAULT_LLM_MODEL),
            });

        Ok(Self {
            geocode,
            chart_provider,
            llm,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
