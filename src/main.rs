use actix_web::{App, HttpServer, web::Data};
use email_verifier::config::AppConfig;
use email_verifier::openapi::ApiDoc;
use email_verifier::validation::{EmailValidator, TrustDnsResolver};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Email Verifier Service Entry Point
///
/// Configures and launches the Actix-web HTTP server with:
/// - Email validation endpoints under `/api/v1`
/// - Swagger UI for API documentation
/// - Environment configuration via `.env` file
///
/// # Endpoints
/// - REST: `/api/v1/validate-email`, `/api/v1/validate-emails-bulk`, `/api/v1/health`
/// - Swagger UI: `/swagger-ui/`
/// - OpenAPI spec: `/api-docs/openapi.json`
///
/// # Configuration
/// See [`AppConfig::from_env`]. Log verbosity follows `RUST_LOG`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let settings = &config.validation;
    let resolver = TrustDnsResolver::new(settings.dns_timeout, settings.dns_attempts);
    let validator = EmailValidator::new(settings.validation_config(), Arc::new(resolver));

    info!(
        host = %config.host,
        port = config.port,
        use_mx = settings.use_mx,
        fallback_to_a = settings.use_mx_with_fallback_to_a,
        "starting email verifier v{}",
        env!("CARGO_PKG_VERSION")
    );

    HttpServer::new(move || {
        let openapi = ApiDoc::openapi();

        App::new()
            .app_data(Data::new(validator.clone()))
            .configure(email_verifier::routes::configure)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
