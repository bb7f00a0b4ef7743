//! Types shared by all endpoints

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "Deep research API is running")]
    pub message: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error payload returned with every non-2xx response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Query cannot be empty")]
    pub error: String,
}
