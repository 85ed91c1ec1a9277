use crate::models::HealthResponse;
use actix_web::{HttpResponse, Responder, get};

/// # Health Check Endpoint
///
/// Returns the current health status of the service along with a timestamp.
/// It never touches DNS, so it stays fast when resolvers are slow.
///
/// ## Response
///
/// - **200 OK**: Service is healthy
///   - Body: JSON object with `status` ("UP"), `version` and `timestamp`
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

/// Registers the health endpoint
pub fn configure_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(health);
}
