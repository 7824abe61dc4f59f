use utoipa::OpenApi;

/// OpenAPI document for the REST surface, served at `/api-docs/openapi.json`
/// and browsable through Swagger UI at `/swagger-ui/`.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::email::validate_email,
        crate::routes::email::validate_emails_bulk,
    ),
    components(
        schemas(
            crate::models::health::HealthResponse,
            crate::models::email::EmailRequest,
            crate::models::email::BulkEmailRequest,
            crate::models::email::ValidationReport,
            crate::models::email::BulkValidationResponse
        )
    ),
    tags(
        (name = "Health Check", description = "Service health monitoring endpoints"),
        (name = "Email Validation", description = "Pattern and DNS checks for email addresses")
    ),
    info(
        description = "Decides whether an email address is plausibly deliverable without sending mail",
        title = "Email Veracity API",
        version = "0.3.0",
    )
)]
pub struct ApiDoc;
