use crate::validation::ValidationResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct BulkEmailRequest {
    pub emails: Vec<String>,
}

#[derive(Serialize, Debug, PartialEq, ToSchema)]
pub struct EmailValidationError {
    pub code: String,
    pub message: String,
}

#[derive(Serialize, Debug, PartialEq, ToSchema)]
pub struct EmailValidationResponse {
    pub is_valid: bool,
    pub status: Option<String>,
    pub error: Option<EmailValidationError>,
}

impl From<ValidationResult> for EmailValidationResponse {
    fn from(result: ValidationResult) -> Self {
        if result.valid {
            return Self {
                is_valid: true,
                status: Some("VALID".to_string()),
                error: None,
            };
        }

        Self {
            is_valid: false,
            status: None,
            error: Some(EmailValidationError {
                code: result
                    .failure_reason
                    .map(|reason| reason.code())
                    .unwrap_or("INVALID")
                    .to_string(),
                message: result.message.unwrap_or_default(),
            }),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct BulkEmailValidationResult {
    pub email: String,
    pub validation: EmailValidationResponse,
}

#[derive(Serialize, ToSchema)]
pub struct BulkEmailValidationResponse {
    pub results: Vec<BulkEmailValidationResult>,
    pub valid_count: usize,
    pub invalid_count: usize,
}
