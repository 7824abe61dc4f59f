use std::sync::Arc;

use actix_web::web;

use crate::config::Settings;
use crate::models::ValidationReport;
use crate::validation::{DnsLookup, EmailAddress, SystemResolver};

/// # Health Check Endpoint
///
/// `GET /api/v1/health` returns `status`, `version` and an RFC 3339 `timestamp`.
pub mod health;

/// # Email Validation Endpoints
///
/// - `POST /api/v1/validate-email`: one address
/// - `POST /api/v1/validate-emails-bulk`: many addresses, checked concurrently
///
/// Each address is checked for pattern, local part, invalid domain list and,
/// unless disabled, MX/A records.
pub mod email;

/// Shared handler state, registered as `web::Data<AppState>`: settings plus
/// an optional `Arc<dyn DnsLookup>` backend injected with [`AppState::with_lookup`].
///
/// Without an injected backend every check builds its own [`SystemResolver`],
/// so nothing is shared or cached between requests.
pub struct AppState {
    pub settings: Settings,
    lookup: Option<Arc<dyn DnsLookup>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            lookup: None,
        }
    }

    pub fn with_lookup(settings: Settings, lookup: Arc<dyn DnsLookup>) -> Self {
        Self {
            settings,
            lookup: Some(lookup),
        }
    }

    /// Validates `address`. Blocks on DNS; call from `web::block`.
    pub fn check(&self, address: &str) -> ValidationReport {
        let lookup: Arc<dyn DnsLookup> = match &self.lookup {
            Some(lookup) => Arc::clone(lookup),
            None => Arc::new(SystemResolver::new()),
        };

        match EmailAddress::with_lookup(address, &self.settings.email, lookup) {
            Ok(email) => {
                let verdict = email.verdict(&self.settings.checks);
                ValidationReport::new(&email, verdict)
            }
            Err(e) => ValidationReport::failed(address, e.to_string()),
        }
    }
}

/// # API Route Configuration
///
/// Mounts every endpoint under `/api/v1`:
///
/// ```text
/// GET  /api/v1/health
/// POST /api/v1/validate-email
/// POST /api/v1/validate-emails-bulk
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure_routes)
            .configure(email::configure_routes),
    );
}
