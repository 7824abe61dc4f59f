/// Liveness response.
pub mod health;

/// Request and response bodies for the validation endpoints.
pub mod email;

pub use email::{BulkEmailRequest, BulkValidationResponse, EmailRequest, ValidationReport};
pub use health::HealthResponse;
