use crate::validation::config::ValidationConfig;
use crate::validation::dnsmx::{MailResolver, check_domain};
use crate::validation::syntax::{self, SyntaxError};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_MESSAGE: &str = "is invalid";
pub const DEFAULT_MX_MESSAGE: &str = "has no mail server records";

/// Why an address was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    SyntaxInvalid,
    DomainUnreachable,
}

impl FailureReason {
    /// Stable error code exposed to API clients
    pub fn code(self) -> &'static str {
        match self {
            FailureReason::SyntaxInvalid => "INVALID_SYNTAX",
            FailureReason::DomainUnreachable => "INVALID_DOMAIN",
        }
    }
}

/// Verdict of one validation call. Built fresh every time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub failure_reason: Option<FailureReason>,
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            failure_reason: None,
            message: None,
        }
    }

    pub fn invalid(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            failure_reason: Some(reason),
            message: Some(message.into()),
        }
    }
}

/// Validates `candidate` against `config`.
///
/// 1. The grammar check runs first. On failure DNS is never consulted.
/// 2. The activation policy is evaluated for this call.
/// 3. When active, the domain is checked with the configured MX/A policy.
///
/// Resolver failures surface as `DomainUnreachable`, never as errors.
pub async fn validate(
    candidate: &str,
    config: &ValidationConfig,
    resolver: &dyn MailResolver,
) -> ValidationResult {
    let parsed = match syntax::parse_email(candidate) {
        Ok(parsed) => parsed,
        Err(err) => return syntax_failure(config, &err),
    };

    if !config.dns_check_enabled() {
        return ValidationResult::valid();
    }

    let reachability =
        check_domain(resolver, parsed.domain, config.dns_policy(), config.dns_timeout).await;
    if reachability.is_reachable() {
        ValidationResult::valid()
    } else {
        debug!(domain = parsed.domain, "domain failed DNS check");
        ValidationResult::invalid(
            FailureReason::DomainUnreachable,
            config.mx_message.as_deref().unwrap_or(DEFAULT_MX_MESSAGE),
        )
    }
}

fn syntax_failure(config: &ValidationConfig, err: &SyntaxError) -> ValidationResult {
    debug!(reason = %err, "email failed syntax check");
    ValidationResult::invalid(
        FailureReason::SyntaxInvalid,
        config.message.as_deref().unwrap_or(DEFAULT_MESSAGE),
    )
}

/// A configured validator with an injected DNS resolver.
///
/// Cheap to clone and safe to share between concurrent requests.
#[derive(Clone)]
pub struct EmailValidator {
    config: Arc<ValidationConfig>,
    resolver: Arc<dyn MailResolver>,
}

impl EmailValidator {
    pub fn new(config: ValidationConfig, resolver: Arc<dyn MailResolver>) -> Self {
        Self {
            config: Arc::new(config),
            resolver,
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub async fn validate(&self, candidate: &str) -> ValidationResult {
        validate(candidate, &self.config, self.resolver.as_ref()).await
    }

    /// Validates raw bytes; anything that is not UTF-8 is a syntax failure
    pub async fn validate_bytes(&self, candidate: &[u8]) -> ValidationResult {
        match std::str::from_utf8(candidate) {
            Ok(candidate) => self.validate(candidate).await,
            Err(_) => syntax_failure(&self.config, &SyntaxError::InvalidUtf8),
        }
    }

    /// Validates every candidate concurrently, keeping input order
    pub async fn validate_many<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<ValidationResult> {
        join_all(
            candidates
                .iter()
                .map(|candidate| self.validate(candidate.as_ref())),
        )
        .await
    }
}
