//! Outbound ports of the authoring client.
//!
//! The engine is reached through [`DraftStore`] and [`OutlineGenerator`];
//! [`SnapshotStore`] is the local copy used when the engine is unreachable.

use async_trait::async_trait;

use sessioncraft_domain::{DraftPayload, SessionId};
use sessioncraft_shared::{GenerateOutlineRequest, GenerateOutlineResponse};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Engine returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Invalid response: {0}")]
    Decode(String),
    #[error("Snapshot I/O failed: {0}")]
    Io(String),
}

/// Remote draft persistence. Last write wins per session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn save(&self, session_id: SessionId, payload: &DraftPayload) -> Result<(), ClientError>;

    /// `None` when the session has never been saved.
    async fn load(&self, session_id: SessionId) -> Result<Option<DraftPayload>, ClientError>;
}

/// Local fallback persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, session_id: SessionId, payload: &DraftPayload) -> Result<(), ClientError>;

    async fn load(&self, session_id: SessionId) -> Result<Option<DraftPayload>, ClientError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutlineGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerateOutlineRequest,
    ) -> Result<GenerateOutlineResponse, ClientError>;
}
