//! Error types for Astro Guide.

/// Top-level error type for the conversation core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Geocoding error: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("Chart provider error: {0}")]
    ChartProvider(#[from] ChartProviderError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Repository errors. `NotFound` during a turn is an integrity failure and
/// propagates to the caller; it is never absorbed by a fallback.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Storage failed: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Geocoding provider errors.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("No location found for {place:?}")]
    LocationNotFound { place: String },

    #[error("Geocoding request failed: {0}")]
    Http(String),

    #[error("Invalid geocoding response: {0}")]
    InvalidResponse(String),
}

/// Chart computation provider errors. All of these are absorbed by the
/// deterministic fallback in `ChartResolver::generate_chart`.
#[derive(Debug, thiserror::Error)]
pub enum ChartProviderError {
    #[error("Chart provider is not configured")]
    NotConfigured,

    #[error("Chart provider authentication failed: {reason}")]
    AuthFailed { reason: String },

    #[error("Chart provider request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Invalid chart provider response: {reason}")]
    InvalidResponse { reason: String },
}

/// LLM provider errors. Absorbed by templated fallbacks in the advice layer.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM provider is not configured")]
    NotConfigured,

    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
