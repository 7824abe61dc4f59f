use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::{EmailAddress, Verdict};

/// Verdict code of a report whose check could not be run.
pub const FAILED_VERDICT: &str = "ERROR";

#[derive(Deserialize, ToSchema)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct BulkEmailRequest {
    pub emails: Vec<String>,
}

/// Outcome of validating one address.
#[derive(Serialize, Deserialize, Debug, PartialEq, ToSchema)]
pub struct ValidationReport {
    pub email: String,
    pub is_valid: bool,
    /// Machine readable verdict, e.g. `VALID`, `INVALID_SYNTAX`, `UNKNOWN`.
    pub verdict: String,
    pub message: String,
    pub local_part: String,
    pub domain: String,
    /// `null` when no address was given.
    pub pattern_valid: Option<bool>,
    pub local_part_valid: bool,
    pub invalid_domain: bool,
}

impl ValidationReport {
    pub fn new(email: &EmailAddress, verdict: Verdict) -> Self {
        Self {
            email: email.address().to_string(),
            is_valid: verdict.is_valid(),
            verdict: verdict.code().to_string(),
            message: verdict.message().to_string(),
            local_part: email.local_part().to_string(),
            domain: email.domain().name().to_string(),
            pattern_valid: email.pattern_is_valid(),
            local_part_valid: email.local_part_is_valid(),
            invalid_domain: email.has_invalid_domain(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.verdict == Verdict::Unknown.code()
    }

    pub fn is_failed(&self) -> bool {
        self.verdict == FAILED_VERDICT
    }

    /// Report for an address whose check could not be run at all.
    pub fn failed(email: &str, message: impl Into<String>) -> Self {
        Self {
            email: email.to_string(),
            is_valid: false,
            verdict: FAILED_VERDICT.to_string(),
            message: message.into(),
            local_part: String::new(),
            domain: String::new(),
            pattern_valid: None,
            local_part_valid: false,
            invalid_domain: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct BulkValidationResponse {
    pub results: Vec<ValidationReport>,
    pub valid_count: usize,
    pub invalid_count: usize,
    /// Addresses whose domain could not be checked in time.
    pub unknown_count: usize,
}

impl BulkValidationResponse {
    pub fn from_reports(results: Vec<ValidationReport>) -> Self {
        let valid_count = results.iter().filter(|r| r.is_valid).count();
        let unknown_count = results.iter().filter(|r| r.is_unknown()).count();

        Self {
            invalid_count: results.len() - valid_count - unknown_count,
            valid_count,
            unknown_count,
            results,
        }
    }
}
