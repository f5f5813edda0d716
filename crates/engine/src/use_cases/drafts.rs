//! Draft persistence use cases.
//!
//! One draft per authoring session. Saves are last-write-wins; concurrent
//! saves for the same session are not reconciled.

use std::sync::Arc;

use sessioncraft_domain::{DraftPayload, SessionId};

use crate::infrastructure::ports::{ClockPort, DraftRepo, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("Draft not found: {0}")]
    NotFound(SessionId),
    #[error("Invalid draft: {0}")]
    Invalid(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct DraftOps {
    repo: Arc<dyn DraftRepo>,
    clock: Arc<dyn ClockPort>,
}

impl DraftOps {
    pub fn new(repo: Arc<dyn DraftRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { repo, clock }
    }

    /// Persist `payload`, stamping `updated_at`. Returns what was stored.
    pub async fn save(
        &self,
        session_id: SessionId,
        mut payload: DraftPayload,
    ) -> Result<DraftPayload, DraftError> {
        check_version_indices(&payload)?;
        payload.updated_at = Some(self.clock.now());
        self.repo.save(session_id, &payload).await?;

        tracing::debug!(
            session_id = %session_id,
            versions = payload.version_history.len(),
            has_outline = payload.outline_draft.is_some(),
            "Saved draft"
        );
        Ok(payload)
    }

    pub async fn load(&self, session_id: SessionId) -> Result<DraftPayload, DraftError> {
        self.repo
            .load(session_id)
            .await?
            .ok_or(DraftError::NotFound(session_id))
    }
}

fn check_version_indices(payload: &DraftPayload) -> Result<(), DraftError> {
    let len = payload.version_history.len();
    for (field, index) in [
        ("selectedVersionIndex", payload.selected_version_index),
        ("acceptedVersionIndex", payload.accepted_version_index),
    ] {
        if let Some(index) = index.filter(|i| *i >= len) {
            return Err(DraftError::Invalid(format!(
                "{} {} is out of range for {} versions",
                field, index, len
            )));
        }
    }
    Ok(())
}
