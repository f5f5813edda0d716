//! Repository port traits for database access.

use async_trait::async_trait;
use sessioncraft_domain::{DraftPayload, SessionId, Topic};

use super::error::RepoError;

// =============================================================================
// Topic Store (read-only to generation)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TopicRepo: Send + Sync {
    /// Topics in `category` matching any keyword, best matches first.
    async fn find_by_category_and_keywords(
        &self,
        category: &str,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<Topic>, RepoError>;

    async fn find_by_category(&self, category: &str, limit: usize) -> Result<Vec<Topic>, RepoError>;
}

// =============================================================================
// Draft Persistence
// =============================================================================

/// Last write wins per session id; there is no conflict detection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DraftRepo: Send + Sync {
    async fn save(&self, session_id: SessionId, payload: &DraftPayload) -> Result<(), RepoError>;
    async fn load(&self, session_id: SessionId) -> Result<Option<DraftPayload>, RepoError>;
}
