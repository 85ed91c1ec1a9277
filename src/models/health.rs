use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// # Health Status Response
///
/// Represents the operational status of the service with a timestamp.
///
/// ## Fields
/// - `status`: String indicating service availability ("UP")
/// - `version`: Crate version of the running service
/// - `timestamp`: RFC 3339 timestamp of the status check
///
/// ## Example JSON
/// ```json
/// {
///   "status": "UP",
///   "version": "0.1.0",
///   "timestamp": "2024-03-10T15:30:45.123456789Z"
/// }
/// ```
#[derive(Serialize, Debug, PartialEq, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn up() -> Self {
        Self {
            status: "UP".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
