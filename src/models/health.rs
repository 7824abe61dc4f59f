use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Liveness payload for `GET /api/v1/health`.
///
/// ```json
/// {
///   "status": "UP",
///   "version": "0.3.0",
///   "timestamp": "2024-03-10T15:30:45.123456789+00:00"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, PartialEq, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// RFC 3339 time the response was produced.
    pub timestamp: String,
}

impl HealthResponse {
    pub fn up() -> Self {
        Self {
            status: "UP".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
