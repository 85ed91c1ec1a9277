/// # Health Status Response
///
/// Payload of the liveness endpoint: service status, version and an
/// RFC 3339 timestamp.
pub mod health;

/// Request and response bodies of the email validation endpoints
pub mod email;

pub use health::HealthResponse;
