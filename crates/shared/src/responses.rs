//! Response bodies for the engine HTTP API

use serde::{Deserialize, Serialize};

use sessioncraft_domain::{FlexibleSessionOutline, Provenance, Topic};

/// Result of `POST /api/outlines/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOutlineResponse {
    pub outline: FlexibleSessionOutline,
    #[serde(default)]
    pub relevant_topics: Vec<Topic>,
    pub rag_available: bool,
    pub rag_queried: bool,
    pub fallback_used: bool,
}

impl GenerateOutlineResponse {
    pub fn provenance(&self) -> Provenance {
        Provenance {
            rag_available: self.rag_available,
            rag_queried: self.rag_queried,
            fallback_used: self.fallback_used,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Error classification code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    InternalError,
    /// Unknown code for forward compatibility
    #[serde(other)]
    Unknown,
}

/// JSON body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
