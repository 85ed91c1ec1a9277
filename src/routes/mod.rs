use actix_web::web;

/// # Health Check Endpoint
///
/// `GET /api/v1/health` returns the service status, version and a timestamp.
pub mod health;

/// # Email Validation Endpoints
///
/// - `POST /api/v1/validate-email`: validates a single address
/// - `POST /api/v1/validate-emails-bulk`: validates a batch of addresses
///
/// Both run the syntax check and, when configured, the MX/A record check.
pub mod email;

/// # API Route Configuration
///
/// Sets up versioned API endpoints under the `/api/v1` base path.
///
/// The email routes expect a `web::Data<EmailValidator>` in the app data.
///
/// ```text
/// GET  /api/v1/health
/// POST /api/v1/validate-email
/// POST /api/v1/validate-emails-bulk
/// ```
///
/// [`EmailValidator`]: crate::validation::EmailValidator
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure_routes)
            .configure(email::configure_routes),
    );
}
