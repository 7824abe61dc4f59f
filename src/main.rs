use actix_web::{App, HttpServer, web::Data};
use email_veracity::config::Settings;
use email_veracity::openapi::ApiDoc;
use email_veracity::routes::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Email Veracity Service Entry Point
///
/// - REST endpoints under `/api/v1` (see `routes`)
/// - Swagger UI at `/swagger-ui/`, OpenAPI spec at `/api-docs/openapi.json`
/// - Settings from the environment, with `.env` loaded first if present
/// - Log filtering through `RUST_LOG` (default `info`)
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let bind = (settings.host.clone(), settings.port);
    info!(
        host = %bind.0,
        port = bind.1,
        timeout_ms = settings.email.domain.timeout().as_millis() as u64,
        "starting email veracity service"
    );

    let state = Data::new(AppState::new(settings));

    HttpServer::new(move || {
        let openapi = ApiDoc::openapi();

        App::new()
            .app_data(state.clone())
            .configure(email_veracity::routes::configure)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
    })
    .bind(bind)?
    .run()
    .await
}
