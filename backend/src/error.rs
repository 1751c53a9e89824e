//! Error types for the SylvaScan knowledge backend.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`StoreError`] - Knowledge store (SQLite) errors
//! - [`ValidationError`] - Analysis result validation errors
//! - [`AiError`] - AI client errors
//! - [`UpdateError`] - Top-level knowledge update errors
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Knowledge Store Errors
// =============================================================================

/// Errors from the knowledge store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to create or access the database directory.
    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors during analysis result validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema validation failed.
    #[error("Validation failed: {errors:?}")]
    SchemaError { errors: Vec<String> },

    /// Input was not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// AI Client Errors
// =============================================================================

/// Errors from the AI client.
#[derive(Debug, Error)]
pub enum AiError {
    /// Missing API key.
    #[error("Missing ANTHROPIC_API_KEY environment variable")]
    MissingApiKey,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// API returned an error status.
    #[error("API error: {0}")]
    ApiError(String),

    /// Response body could not be interpreted.
    #[error("Invalid AI response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// Update Errors (top-level)
// =============================================================================

/// Top-level knowledge update errors.
///
/// This is the main error type returned by
/// [`crate::updater::KnowledgeUpdater::process`]. It wraps all lower-level
/// errors so a whole update run reports one failure type.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Knowledge store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// AI client error.
    #[error("AI error: {0}")]
    Ai(#[from] AiError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Update error.
    #[error("Update error: {0}")]
    Update(#[from] UpdateError),

    /// Requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        ServerError::Update(UpdateError::Store(err))
    }
}

impl From<ValidationError> for ServerError {
    fn from(err: ValidationError) -> Self {
        ServerError::Update(UpdateError::Validation(err))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for AI operations.
pub type AiResult<T> = Result<T, AiError>;

/// Result type for update operations.
pub type UpdateResult<T> = Result<T, UpdateError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ValidationError -> UpdateError
        let validation_err = ValidationError::SchemaError {
            errors: vec!["detectedEntities is required".into()],
        };
        let update_err: UpdateError = validation_err.into();
        assert!(update_err.to_string().contains("detectedEntities"));

        // AiError -> UpdateError -> ServerError
        let ai_err = AiError::MissingApiKey;
        let update_err: UpdateError = ai_err.into();
        let server_err: ServerError = update_err.into();
        assert!(server_err.to_string().contains("ANTHROPIC_API_KEY"));

        // StoreError jumps straight to ServerError
        let store_err =
            StoreError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        let server_err: ServerError = store_err.into();
        assert!(server_err.to_string().contains("missing"));
    }

    #[test]
    fn test_json_error_wraps_into_validation() {
        let bad = serde_json::from_str::<serde_json::Value>("not json");
        let err: ValidationError = bad.unwrap_err().into();
        assert!(err.to_string().contains("Invalid JSON"));
    }
}
