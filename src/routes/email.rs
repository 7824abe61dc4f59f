use crate::models::{BulkEmailRequest, BulkValidationResponse, EmailRequest, ValidationReport};
use crate::routes::AppState;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, post, web};
use futures::future::join_all;
use serde_json::json;
use tracing::info;

/// Largest batch accepted by the bulk endpoint.
pub const MAX_BULK_EMAILS: usize = 100;

/// # Email Validation Endpoint
///
/// Checks, in order:
/// 1. Address pattern
/// 2. Local part
/// 3. Invalid domain list
/// 4. MX records, then A records (unless domain checks are disabled)
///
/// ## Responses
/// - **200 OK**: `VALID`, or `UNKNOWN` when DNS timed out and timeouts fail
/// - **400 Bad Request**: any rejection, or an empty address
/// - **500 Internal Server Error**: the DNS backend could not be started
#[utoipa::path(
    post,
    path = "/api/v1/validate-email",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Email is valid or could not be checked in time", body = ValidationReport),
        (status = 400, description = "Invalid email", body = ValidationReport),
        (status = 500, description = "Server error", body = ValidationReport)
    ),
    tag = "Email Validation"
)]
#[post("/validate-email")]
pub async fn validate_email(
    req: web::Json<EmailRequest>,
    state: web::Data<AppState>,
) -> Result<impl Responder, actix_web::Error> {
    let email = req.into_inner().email.trim().to_string();
    let report = check_blocking(state.into_inner(), email).await?;

    info!(verdict = %report.verdict, "validated email");
    Ok(HttpResponse::build(status_for(&report)).json(report))
}

/// # Bulk Email Validation Endpoint
///
/// Validates up to [`MAX_BULK_EMAILS`] addresses concurrently and returns one
/// report per address together with valid, invalid and unknown counts.
#[utoipa::path(
    post,
    path = "/api/v1/validate-emails-bulk",
    request_body = BulkEmailRequest,
    responses(
        (status = 200, description = "Bulk validation results", body = BulkValidationResponse),
        (status = 400, description = "Too many addresses")
    ),
    tag = "Email Validation"
)]
#[post("/validate-emails-bulk")]
pub async fn validate_emails_bulk(
    req: web::Json<BulkEmailRequest>,
    state: web::Data<AppState>,
) -> Result<impl Responder, actix_web::Error> {
    let emails = req.into_inner().emails;
    if emails.len() > MAX_BULK_EMAILS {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "TOO_MANY_EMAILS",
            "message": format!("At most {MAX_BULK_EMAILS} addresses per request")
        })));
    }

    let state = state.into_inner();
    let checks = emails.into_iter().map(|email| {
        let state = state.clone();
        async move {
            let email = email.trim().to_string();
            check_blocking(state, email.clone())
                .await
                .unwrap_or_else(|e| ValidationReport::failed(&email, e.to_string()))
        }
    });

    let response = BulkValidationResponse::from_reports(join_all(checks).await);
    info!(
        valid = response.valid_count,
        invalid = response.invalid_count,
        unknown = response.unknown_count,
        "validated email batch"
    );
    Ok(HttpResponse::Ok().json(response))
}

async fn check_blocking(
    state: std::sync::Arc<AppState>,
    email: String,
) -> Result<ValidationReport, actix_web::Error> {
    web::block(move || state.check(&email)).await.map_err(|e| {
        actix_web::error::ErrorInternalServerError(format!("DNS validation error: {e}"))
    })
}

fn status_for(report: &ValidationReport) -> StatusCode {
    if report.is_valid || report.is_unknown() {
        StatusCode::OK
    } else if report.is_failed() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    }
}

/// Configures email validation routes under /api/v1
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(validate_email).service(validate_emails_bulk);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::validation::Verdict;
    use crate::validation::resolver::{LookupError, MockDnsLookup, MxServer};
    use actix_web::{App, test};
    use serde_json::{Value, json};
    use std::net::Ipv4Addr;
    use std::sync::Arc;

    /// `example.com` has MX records, `slow.example` times out, anything else does not exist.
    fn dns() -> MockDnsLookup {
        let mut lookup = MockDnsLookup::new();
        lookup.expect_mx().returning(|name, _| match name {
            "example.com" => Ok(vec![MxServer {
                preference: 10,
                exchange: "mx.example.com.".to_string(),
            }]),
            "slow.example" => Err(LookupError::TimedOut),
            _ => Err(LookupError::NotFound("NXDOMAIN".to_string())),
        });
        lookup.expect_a().returning(|name, _| match name {
            "slow.example" => Err(LookupError::TimedOut),
            _ => Ok(Vec::<Ipv4Addr>::new()),
        });
        lookup
    }

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    async fn create_test_app(
        settings: Settings,
    ) -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    > {
        let state = AppState::with_lookup(settings, Arc::new(dns()));
        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await
    }

    async fn post_email(settings: Settings, email: &str) -> (u16, Value) {
        let app = create_test_app(settings).await;
        let req = test::TestRequest::post()
            .uri("/validate-email")
            .set_json(json!({ "email": email }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        let status = resp.status().as_u16();
        (status, test::read_body_json(resp).await)
    }

    #[actix_web::test]
    async fn test_valid_email() {
        let (status, body) = post_email(settings(&[]), "test@example.com").await;
        assert_eq!(status, 200);
        assert_eq!(body["verdict"], "VALID");
        assert_eq!(body["is_valid"], true);
        assert_eq!(body["domain"], "example.com");
    }

    #[actix_web::test]
    async fn test_email_is_trimmed() {
        let (status, body) = post_email(settings(&[]), "  test@example.com  ").await;
        assert_eq!(status, 200);
        assert_eq!(body["email"], "test@example.com");
    }

    #[actix_web::test]
    async fn test_invalid_syntax() {
        let (status, body) = post_email(settings(&[]), "invalid-email").await;
        assert_eq!(status, 400);
        assert_eq!(body["verdict"], "INVALID_SYNTAX");
        assert_eq!(body["message"], "Email address has invalid syntax");
    }

    #[actix_web::test]
    async fn test_empty_email() {
        let (status, body) = post_email(settings(&[]), "").await;
        assert_eq!(status, 400);
        assert_eq!(body["verdict"], "NOT_APPLICABLE");
        assert!(body["pattern_valid"].is_null());
    }

    #[actix_web::test]
    async fn test_domain_without_servers() {
        let (status, body) = post_email(settings(&[]), "test@nonexistent.invalid").await;
        assert_eq!(status, 400);
        assert_eq!(body["verdict"], "NO_MAIL_SERVERS");
    }

    #[actix_web::test]
    async fn test_invalid_domain_list() {
        let settings = settings(&[("EMAIL_VERACITY_INVALID_DOMAINS", "example.com")]);
        let (status, body) = post_email(settings, "user@example.com").await;
        assert_eq!(status, 400);
        assert_eq!(body["verdict"], "INVALID_DOMAIN");
        assert_eq!(body["invalid_domain"], true);
    }

    #[actix_web::test]
    async fn test_timeout_without_fail_on_timeout() {
        let (status, body) = post_email(settings(&[]), "user@slow.example").await;
        assert_eq!(status, 400);
        assert_eq!(body["verdict"], "NO_MAIL_SERVERS");
    }

    #[actix_web::test]
    async fn test_timeout_with_fail_on_timeout() {
        let settings = settings(&[("EMAIL_VERACITY_FAIL_ON_TIMEOUT", "true")]);
        let (status, body) = post_email(settings, "user@slow.example").await;
        assert_eq!(status, 200);
        assert_eq!(body["verdict"], "UNKNOWN");
        assert_eq!(body["is_valid"], false);
    }

    #[actix_web::test]
    async fn test_domain_check_disabled() {
        let settings = settings(&[("EMAIL_VERACITY_DOMAIN_CHECK", "false")]);
        let (status, body) = post_email(settings, "user@nonexistent.invalid").await;
        assert_eq!(status, 200);
        assert_eq!(body["verdict"], "VALID");
    }

    #[actix_web::test]
    async fn test_missing_email_field() {
        let app = create_test_app(settings(&[])).await;
        let req = test::TestRequest::post()
            .uri("/validate-email")
            .set_json(json!({}))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);
    }

    #[actix_web::test]
    async fn test_bulk_validation() {
        let app = create_test_app(settings(&[("EMAIL_VERACITY_FAIL_ON_TIMEOUT", "true")])).await;
        let req = test::TestRequest::post()
            .uri("/validate-emails-bulk")
            .set_json(json!({
                "emails": [
                    "a@example.com",
                    "b@example.com",
                    "carsten,comma@example.com",
                    "c@slow.example",
                    "d@nowhere.invalid"
                ]
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);

        let body: BulkValidationResponse = test::read_body_json(resp).await;
        assert_eq!(body.results.len(), 5);
        assert_eq!(body.valid_count, 2);
        assert_eq!(body.invalid_count, 2);
        assert_eq!(body.unknown_count, 1);
        assert_eq!(body.results[2].local_part, "carsten,comma");
    }

    #[::core::prelude::v1::test]
    fn test_status_for_each_outcome() {
        let mut report = ValidationReport::failed("a@example.com", "dns thread: no threads");
        assert_eq!(status_for(&report), StatusCode::INTERNAL_SERVER_ERROR);

        report.verdict = Verdict::Unknown.code().to_string();
        assert_eq!(status_for(&report), StatusCode::OK);

        report.verdict = Verdict::NoServers.code().to_string();
        assert_eq!(status_for(&report), StatusCode::BAD_REQUEST);

        report.verdict = Verdict::Valid.code().to_string();
        report.is_valid = true;
        assert_eq!(status_for(&report), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_bulk_validation_limit() {
        let app = create_test_app(settings(&[])).await;
        let emails = vec!["a@example.com"; MAX_BULK_EMAILS + 1];
        let req = test::TestRequest::post()
            .uri("/validate-emails-bulk")
            .set_json(json!({ "emails": emails }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "TOO_MANY_EMAILS");
    }
}
