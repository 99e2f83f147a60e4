use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetails {
    pub timestamp: DateTime<Utc>,
    pub candidates_count: i64,
}

/// Payload of `GET /api/test-db`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConnectionProbeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ConnectionDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionProbeResponse {
    pub fn connected(details: ConnectionDetails) -> Self {
        Self {
            success: true,
            details: Some(details),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            details: None,
            error: Some(error.into()),
        }
    }
}
