use utoipa::OpenApi;

/// OpenAPI Specification Documentation
///
/// Generated at compile time from the `utoipa` annotations on the route
/// handlers and models.
///
/// # Endpoints
/// - Health Check: `GET /api/v1/health`
/// - Email Validation: `POST /api/v1/validate-email`
/// - Bulk Email Validation: `POST /api/v1/validate-emails-bulk`
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
            crate::models::email::EmailValidationError,
            crate::models::email::EmailValidationResponse,
            crate::models::email::BulkEmailValidationResult,
            crate::models::email::BulkEmailValidationResponse
        )
    ),
    tags(
        (name = "Health Check", description = "Service health monitoring endpoints"),
        (name = "Email Validation", description = "Email syntax and MX record validation endpoints")
    ),
    info(
        description = "Email address syntax validation with optional MX/A record checks",
        title = "Email Verifier API",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_all_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/v1/health"));
        assert!(paths.contains_key("/api/v1/validate-email"));
        assert!(paths.contains_key("/api/v1/validate-emails-bulk"));
    }
}
