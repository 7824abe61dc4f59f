use crate::models::HealthResponse;
use actix_web::{HttpResponse, Responder, get};

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "Health Check"
)]
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse::up())
}

pub fn configure_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(health);
}
