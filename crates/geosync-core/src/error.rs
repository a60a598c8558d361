use thiserror::Error;

/// Application-wide error types.
///
/// This enum represents all possible errors that can occur in Geosync.
/// It uses the `thiserror` crate for ergonomic error handling and automatic conversion
/// from underlying library errors.
///
/// # Error Conversion
///
/// - `sqlx::Error` → `AppError::DatabaseError`
/// - `serde_json::Error` → `AppError::SerializationError`
///
/// Errors are terminal for the request that triggered them: nothing in
/// Geosync retries.
///
/// # Examples
///
/// ```no_run
/// use geosync_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::NotFound("ARG".to_string()))
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database operation failed.
    ///
    /// Wraps all errors from SQLx, including connection failures, query errors,
    /// and constraint violations. A failure inside a batch upsert rolls back
    /// the whole batch.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// A candidate record or query parameter failed validation.
    ///
    /// Raised for country codes that do not normalize to exactly three
    /// characters, blank names, negative population or area, and out of range
    /// pagination values.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The upstream countries API could not be used.
    ///
    /// Covers connection failures, timeouts, non-2xx responses, and bodies that
    /// cannot be decoded.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// No country is stored under the requested code.
    #[error("Country not found: {0}")]
    NotFound(String),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// URL parsing failed.
    ///
    /// This error occurs when the configured upstream URL is malformed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Generic application error for cases not covered by specific variants.
    #[error("Error: {0}")]
    Generic(String),
}

impl AppError {
    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::DatabaseError(e) => {
                if e.to_string().contains("connection") {
                    "Cannot connect to database. Is PostgreSQL running?\n   Try: docker-compose up -d".to_string()
                } else {
                    format!("Database error: {}", e)
                }
            }
            AppError::ExternalService(msg) => {
                if msg.contains("timeout") || msg.contains("timed out") {
                    "The countries API did not answer in time.\n   Try again later or raise REST_COUNTRIES_TIMEOUT.".to_string()
                } else {
                    format!(
                        "Countries API error: {}\n   Check your internet connection and REST_COUNTRIES_URL.",
                        msg
                    )
                }
            }
            AppError::NotFound(code) => {
                format!("No country stored with code '{}'.", code)
            }
            AppError::InvalidUrl(url) => {
                format!(
                    "Invalid upstream URL: {}\n   Example: https://restcountries.com/v3.1/all",
                    url
                )
            }
            _ => self.to_string(),
        }
    }

    /// Shorthand for [`AppError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
