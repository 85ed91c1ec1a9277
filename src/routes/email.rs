use crate::models::email::{
    BulkEmailRequest, BulkEmailValidationResponse, BulkEmailValidationResult, EmailRequest,
    EmailValidationError, EmailValidationResponse,
};
use crate::validation::EmailValidator;
use actix_web::{HttpResponse, Responder, post, web};

/// Largest batch accepted by the bulk endpoint
pub const MAX_BULK_EMAILS: usize = 100;

/// # Email Validation Endpoint
///
/// Validates an email address:
/// 1. Syntax check (quoted local parts and escapes supported)
/// 2. MX / A record check, when the service is configured for it
///
/// ## Request
/// - Method: POST
/// - Body: JSON object with `email` field
///
/// ## Responses
/// - **200 OK**: Email is valid
/// - **400 Bad Request**:
///   - `INVALID_SYNTAX`: address is malformed
///   - `INVALID_DOMAIN`: domain has no usable MX/A records
///
/// ## Example Request
/// ```json
/// { "email": "user@example.com" }
/// ```
#[utoipa::path(
    post,
    path = "/api/v1/validate-email",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Email is valid", body = EmailValidationResponse),
        (status = 400, description = "Invalid email", body = EmailValidationResponse)
    ),
    tag = "Email Validation"
)]
#[post("/validate-email")]
pub async fn validate_email(
    req: web::Json<EmailRequest>,
    validator: web::Data<EmailValidator>,
) -> impl Responder {
    let response = EmailValidationResponse::from(validator.validate(req.email.trim()).await);

    if response.is_valid {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::BadRequest().json(response)
    }
}

/// # Bulk Email Validation Endpoint
///
/// Validates up to [`MAX_BULK_EMAILS`] addresses concurrently. Results keep
/// the order of the request.
///
/// ## Responses
/// - **200 OK**: Per-email results with valid/invalid counts
/// - **400 Bad Request**: `TOO_MANY_EMAILS`
///
/// ## Example Request
/// ```json
/// { "emails": ["user1@example.com", "user2@example.com"] }
/// ```
#[utoipa::path(
    post,
    path = "/api/v1/validate-emails-bulk",
    request_body = BulkEmailRequest,
    responses(
        (status = 200, description = "Bulk validation results", body = BulkEmailValidationResponse),
        (status = 400, description = "Batch too large", body = EmailValidationError)
    ),
    tag = "Email Validation"
)]
#[post("/validate-emails-bulk")]
pub async fn validate_emails_bulk(
    req: web::Json<BulkEmailRequest>,
    validator: web::Data<EmailValidator>,
) -> impl Responder {
    if req.emails.len() > MAX_BULK_EMAILS {
        return HttpResponse::BadRequest().json(EmailValidationError {
            code: "TOO_MANY_EMAILS".to_string(),
            message: format!("At most {} emails per request", MAX_BULK_EMAILS),
        });
    }

    let emails: Vec<&str> = req.emails.iter().map(|email| email.trim()).collect();
    let verdicts = validator.validate_many(&emails).await;

    let mut results = Vec::with_capacity(verdicts.len());
    let mut valid_count = 0;
    let mut invalid_count = 0;

    for (email, verdict) in req.emails.iter().zip(verdicts) {
        if verdict.valid {
            valid_count += 1;
        } else {
            invalid_count += 1;
        }
        results.push(BulkEmailValidationResult {
            email: email.clone(),
            validation: verdict.into(),
        });
    }

    HttpResponse::Ok().json(BulkEmailValidationResponse {
        results,
        valid_count,
        invalid_count,
    })
}

/// Configures email validation routes under /api/v1
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(validate_email).service(validate_emails_bulk);
}
