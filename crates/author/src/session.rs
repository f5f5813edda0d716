//! The authoring session: one author editing one draft.
//!
//! Every mutation goes through the [`DraftSession`] state machine under a
//! short-lived lock and then hands the new revision to the autosave worker.
//! Network calls (generation, hydration) happen with the lock released.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};

use sessioncraft_domain::{
    AutosaveStatus, DraftMetadata, DraftPayload, DraftSession, DraftStateError,
    FlexibleSessionOutline, OutlineBrief, OutlineEditError, SessionId, TemplateId,
};
use sessioncraft_shared::GenerateOutlineRequest;

use crate::autosave::{AutosaveHandle, AutosaveWorker, SharedDraft};
use crate::config::AuthorConfig;
use crate::infrastructure::{EngineClient, FileSnapshotStore};
use crate::ports::{ClientError, DraftStore, OutlineGenerator, SnapshotStore};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    State(#[from] DraftStateError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

pub struct AuthoringSession {
    session_id: SessionId,
    draft: SharedDraft,
    generator: Arc<dyn OutlineGenerator>,
    autosave: AutosaveHandle,
}

impl AuthoringSession {
    /// Open a session against the configured engine, with local snapshots
    /// under the configured directory.
    pub async fn connect(session_id: SessionId, config: &AuthorConfig) -> Result<Self, SessionError> {
        let engine = Arc::new(EngineClient::new(&config.engine_url, config.request_timeout)?);
        let snapshots = Arc::new(FileSnapshotStore::new(config.snapshot_dir.clone()));

        Ok(Self::open(
            session_id,
            engine.clone(),
            snapshots,
            engine,
            config.autosave_debounce,
        )
        .await)
    }

    /// Hydrate the draft from the last save, if any, and start autosaving.
    pub async fn open(
        session_id: SessionId,
        remote: Arc<dyn DraftStore>,
        local: Arc<dyn SnapshotStore>,
        generator: Arc<dyn OutlineGenerator>,
        debounce: Duration,
    ) -> Self {
        let mut draft = DraftSession::new(session_id, Utc::now());
        // A fresh draft is always Empty, so hydration cannot be refused.
        let _ = draft.begin_hydration();
        let saved = load_saved(session_id, remote.as_ref(), local.as_ref()).await;
        let restored = saved.payload.is_some();
        let _ = draft.finish_hydration(saved.payload, Utc::now());

        tracing::info!(session_id = %session_id, restored, "Authoring session opened");

        let resync = saved.remote_is_stale.then(|| (draft.revision(), draft.to_payload()));
        let draft = Arc::new(Mutex::new(draft));
        let autosave =
            AutosaveWorker::new(session_id, draft.clone(), remote, local, debounce).spawn();
        if let Some((revision, payload)) = resync {
            // The engine holds an older copy than the local snapshot.
            autosave.schedule(revision, payload);
            autosave.save_now();
        }

        Self {
            session_id,
            draft,
            generator,
            autosave,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// A copy of the current draft state.
    pub async fn snapshot(&self) -> DraftSession {
        self.draft.lock().await.clone()
    }

    pub async fn readiness_score(&self) -> u8 {
        self.draft.lock().await.readiness_score()
    }

    pub fn autosave_status(&self) -> AutosaveStatus {
        self.autosave.status()
    }

    pub fn subscribe_autosave(&self) -> watch::Receiver<AutosaveStatus> {
        self.autosave.subscribe()
    }

    // =========================================================================
    // Edits
    // =========================================================================

    pub async fn update_metadata(
        &self,
        edit: impl FnOnce(&mut DraftMetadata),
    ) -> Result<(), SessionError> {
        self.mutate(|draft, now| draft.update_metadata(edit, now)).await
    }

    pub async fn set_ai_prompt_text(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.mutate(|draft, now| draft.set_ai_prompt_text(text, now))
            .await
    }

    pub async fn replace_outline(&self, outline: FlexibleSessionOutline) -> Result<(), SessionError> {
        self.mutate(|draft, now| draft.replace_outline(outline, now))
            .await
    }

    /// Apply a section editor operation to the working outline.
    pub async fn edit_outline(
        &self,
        edit: impl FnOnce(&FlexibleSessionOutline) -> Result<FlexibleSessionOutline, OutlineEditError>,
    ) -> Result<(), SessionError> {
        self.mutate(|draft, now| draft.edit_outline(edit, now)).await
    }

    // =========================================================================
    // Generation
    // =========================================================================

    /// Ask the engine for an outline and record it as a new selected version.
    ///
    /// The engine never fails for soft-dependency outages, so an error here is
    /// a transport or request problem; the draft returns to editing without a
    /// new version.
    pub async fn generate(
        &self,
        brief: OutlineBrief,
        template_id: Option<TemplateId>,
    ) -> Result<usize, SessionError> {
        self.draft.lock().await.begin_generation()?;
        let guard = GenerationGuard::new(self.draft.clone());

        let mut request = GenerateOutlineRequest::new(brief);
        request.template_id = template_id.map(TemplateId::to_uuid);

        match self.generator.generate(&request).await {
            Ok(response) => {
                let provenance = response.provenance();
                let index = self
                    .mutate(|draft, now| draft.complete_generation(response.outline, provenance, now))
                    .await?;
                guard.disarm();
                tracing::info!(
                    session_id = %self.session_id,
                    version = index,
                    rag_available = provenance.rag_available,
                    rag_queried = provenance.rag_queried,
                    fallback_used = provenance.fallback_used,
                    "Outline version added"
                );
                Ok(index)
            }
            Err(e) => {
                tracing::warn!(session_id = %self.session_id, error = %e, "Outline generation failed");
                self.draft.lock().await.cancel_generation()?;
                guard.disarm();
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Versions and undo
    // =========================================================================

    pub async fn select_version(&self, index: usize) -> Result<(), SessionError> {
        self.mutate(|draft, now| draft.select_version(index, now))
            .await
    }

    pub async fn accept_version(&self, index: usize) -> Result<(), SessionError> {
        self.mutate(|draft, now| draft.accept_version(index, now))
            .await
    }

    pub async fn clear_acceptance(&self) -> Result<(), SessionError> {
        self.mutate(|draft, now| draft.clear_acceptance(now)).await
    }

    /// Revert metadata and outline to the last saved state.
    pub async fn undo(&self) -> Result<(), SessionError> {
        self.mutate(|draft, now| draft.undo(now)).await
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    pub fn save_now(&self) {
        self.autosave.save_now();
    }

    /// Stop autosaving. An edit still inside the debounce window is not saved;
    /// call [`save_now`](Self::save_now) first to keep it.
    pub async fn shutdown(self) {
        tracing::info!(session_id = %self.session_id, "Authoring session closed");
        self.autosave.shutdown().await;
    }

    async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut DraftSession, DateTime<Utc>) -> Result<T, DraftStateError>,
    ) -> Result<T, SessionError> {
        let mut draft = self.draft.lock().await;
        let before = draft.revision();
        let result = apply(&mut draft, Utc::now())?;
        if draft.revision() != before {
            self.autosave.schedule(draft.revision(), draft.to_payload());
        }
        Ok(result)
    }
}

struct SavedDraft {
    payload: Option<DraftPayload>,
    /// The engine has a copy, but the local snapshot is newer.
    remote_is_stale: bool,
}

/// Returns the draft to editing if a generation ends without completing,
/// including when the caller drops the `generate` future mid-request.
struct GenerationGuard {
    draft: Option<SharedDraft>,
}

impl GenerationGuard {
    fn new(draft: SharedDraft) -> Self {
        Self { draft: Some(draft) }
    }

    fn disarm(mut self) {
        self.draft = None;
    }
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        let Some(draft) = self.draft.take() else {
            return;
        };
        tracing::debug!("Generation abandoned, returning draft to editing");

        // The lock is never held across the request, so this normally succeeds.
        if let Ok(mut draft) = draft.try_lock() {
            let _ = draft.cancel_generation();
            return;
        }
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = draft.lock().await.cancel_generation();
            });
        }
    }
}

/// The newer of the engine copy and the local snapshot. Local snapshots are
/// only written when a remote save fails, so a newer one holds edits the
/// engine never received. Ties go to the engine.
async fn load_saved(
    session_id: SessionId,
    remote: &dyn DraftStore,
    local: &dyn SnapshotStore,
) -> SavedDraft {
    let (remote_copy, local_copy) = tokio::join!(remote.load(session_id), local.load(session_id));

    let remote_copy = remote_copy.unwrap_or_else(|e| {
        tracing::warn!(session_id = %session_id, error = %e, "Remote draft unavailable");
        None
    });
    let local_copy = local_copy.unwrap_or_else(|e| {
        tracing::warn!(session_id = %session_id, error = %e, "Local snapshot unreadable");
        None
    });

    match (remote_copy, local_copy) {
        (Some(remote), Some(local)) if local.updated_at > remote.updated_at => {
            tracing::info!(
                session_id = %session_id,
                "Local snapshot is newer than the engine copy, restoring it"
            );
            SavedDraft {
                payload: Some(local),
                remote_is_stale: true,
            }
        }
        (Some(remote), _) => SavedDraft {
            payload: Some(remote),
            remote_is_stale: false,
        },
        (None, local) => SavedDraft {
            payload: local,
            remote_is_stale: false,
        },
    }
}
