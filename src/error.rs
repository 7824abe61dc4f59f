//! Construction-time errors.
//!
//! Validation outcomes (bad pattern, missing servers, DNS timeouts) are never
//! reported through these types; they are encoded in return values instead.

use thiserror::Error;

/// Result alias for fallible constructors.
pub type Result<T> = std::result::Result<T, Error>;

/// Misconfiguration detected while building a [`Domain`](crate::validation::domain::Domain),
/// an [`EmailAddress`](crate::validation::email_address::EmailAddress) or the service settings.
#[derive(Debug, Error)]
pub enum Error {
    /// The DNS timeout must be a positive duration.
    #[error("invalid timeout: must be greater than zero")]
    InvalidTimeout,

    /// An environment setting could not be parsed.
    #[error("invalid config: {key}={value}")]
    Config {
        /// The environment variable name.
        key: String,
        /// The raw value that failed to parse.
        value: String,
    },
}

impl Error {
    pub(crate) fn config(key: &str, value: impl Into<String>) -> Self {
        Self::Config {
            key: key.to_string(),
            value: value.into(),
        }
    }
}
