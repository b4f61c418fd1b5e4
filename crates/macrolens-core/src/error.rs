//! Error types for macrolens.

use thiserror::Error;

/// Result type alias using macrolens's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for macrolens operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Image-label detection failed
    #[error("Detection error: {0}")]
    Detection(String),

    /// Vision LLM call or response handling failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Nutrition database lookup failed
    #[error("Nutrition lookup error: {0}")]
    NutritionLookup(String),

    /// Configuration error (missing or invalid credentials)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True when the error stems from missing or rejected credentials.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_detection() {
        let err = Error::Detection("no labels".to_string());
        assert_eq!(err.to_string(), "Detection error: no labels");
    }

    #[test]
    fn test_error_display_inference() {
        let err = Error::Inference("model timeout".to_string());
        assert_eq!(err.to_string(), "Inference error: model timeout");
    }

    #[test]
    fn test_error_display_nutrition_lookup() {
        let err = Error::NutritionLookup("HTTP 503".to_string());
        assert_eq!(err.to_string(), "Nutrition lookup error: HTTP 503");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing API key");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("empty image".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty image");
    }

    #[test]
    fn test_is_config() {
        assert!(Error::Config("x".into()).is_config());
        assert!(!Error::Detection("x".into()).is_config());
        assert!(!Error::InvalidInput("x".into()).is_config());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
