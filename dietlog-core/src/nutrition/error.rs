//! Nutrition lookup error types.

/// Errors that can occur while talking to the nutrition service.
#[derive(Debug, thiserror::Error)]
pub enum NutritionError {
    /// No API key configured
    #[error("Nutrition lookup not configured. Set nutrition.api_key or DIETLOG_API_KEY.")]
    NotConfigured,
    /// Request could not be sent or the connection failed
    #[error("HTTP error: {0}")]
    Http(String),
    /// Service answered with a non-success status
    #[error("Nutrition service returned status {0}")]
    Status(u16),
    /// Response body did not have the expected shape
    #[error("Unexpected response from nutrition service: {0}")]
    Decode(String),
}
