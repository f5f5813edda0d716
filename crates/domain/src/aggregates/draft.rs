//! Draft session aggregate - the authoring lifecycle of one session outline
//!
//! # Lifecycle
//!
//! ```text
//! Empty -> Hydrating -> Editing <-> Generating
//! ```
//!
//! While editing, `AutosaveStatus` tracks persistence. Every mutation bumps the
//! draft revision and sets the status to `Pending`. The autosave worker reports
//! back with the revision it persisted, so a save that finishes after a newer
//! edit leaves the draft `Pending` instead of claiming it is saved.
//!
//! # Invariants
//!
//! - The accepted version index, if set, refers to an entry in the version history
//! - Version history is append-only for the lifetime of the draft
//! - Undo restores the last persisted snapshot, never a history entry

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregates::{FlexibleSessionOutline, OutlineEditError};
use crate::ids::SessionId;
use crate::value_objects::{
    DraftMetadata, DraftPayload, DraftSnapshot, OutlineVersion, Provenance, ValidationReport,
    VersionHistory,
};

const READINESS_TITLE: u8 = 20;
const READINESS_CATEGORY: u8 = 15;
const READINESS_OUTLINE: u8 = 20;
const READINESS_VALID_OUTLINE: u8 = 25;
const READINESS_ACCEPTED: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftPhase {
    Empty,
    Hydrating,
    Editing,
    Generating,
}

impl fmt::Display for DraftPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Empty => "empty",
            Self::Hydrating => "hydrating",
            Self::Editing => "editing",
            Self::Generating => "generating",
        };
        f.write_str(s)
    }
}

/// Persistence state surfaced to the author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutosaveStatus {
    #[default]
    Idle,
    /// Edited since the last save; a save is scheduled.
    Pending,
    Saving,
    /// Persisted remotely.
    Saved,
    /// Remote save failed but the edit is safe in the local snapshot.
    SavedLocally,
    /// Neither remote nor local save succeeded.
    Error,
}

/// Where a completed autosave landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveLocation {
    Remote,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftStateError {
    #[error("Cannot {action} while the draft is {from}")]
    InvalidTransition {
        from: DraftPhase,
        action: &'static str,
    },
    #[error("Draft has no outline")]
    NoOutline,
    #[error("No outline version at index {0}")]
    UnknownVersion(usize),
    #[error("Nothing has been saved yet")]
    NothingToUndo,
    #[error(transparent)]
    Edit(#[from] OutlineEditError),
}

/// The author's working copy of a session.
#[derive(Debug, Clone)]
pub struct DraftSession {
    session_id: SessionId,
    phase: DraftPhase,

    // Content
    metadata: DraftMetadata,
    outline_draft: Option<FlexibleSessionOutline>,
    ai_prompt_text: String,
    versions: VersionHistory,

    // Persistence
    autosave_status: AutosaveStatus,
    last_persisted: Option<DraftSnapshot>,
    revision: u64,
    updated_at: DateTime<Utc>,
}

impl DraftSession {
    // =========================================================================
    // Constructor
    // =========================================================================

    pub fn new(session_id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            phase: DraftPhase::Empty,
            metadata: DraftMetadata::default(),
            outline_draft: None,
            ai_prompt_text: String::new(),
            versions: VersionHistory::new(),
            autosave_status: AutosaveStatus::Idle,
            last_persisted: None,
            revision: 0,
            updated_at: now,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[inline]
    pub fn phase(&self) -> DraftPhase {
        self.phase
    }

    #[inline]
    pub fn metadata(&self) -> &DraftMetadata {
        &self.metadata
    }

    #[inline]
    pub fn outline_draft(&self) -> Option<&FlexibleSessionOutline> {
        self.outline_draft.as_ref()
    }

    #[inline]
    pub fn ai_prompt_text(&self) -> &str {
        &self.ai_prompt_text
    }

    #[inline]
    pub fn versions(&self) -> &VersionHistory {
        &self.versions
    }

    #[inline]
    pub fn autosave_status(&self) -> AutosaveStatus {
        self.autosave_status
    }

    #[inline]
    pub fn last_persisted(&self) -> Option<&DraftSnapshot> {
        self.last_persisted.as_ref()
    }

    /// Monotonic edit counter. Compared against saved revisions by autosave.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn validate_outline(&self) -> Option<ValidationReport> {
        self.outline_draft.as_ref().map(FlexibleSessionOutline::validate)
    }

    /// 0-100 measure of how close the draft is to publishable.
    pub fn readiness_score(&self) -> u8 {
        let mut score = 0;
        if !self.metadata.title.trim().is_empty() {
            score += READINESS_TITLE;
        }
        if self
            .metadata
            .category
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
        {
            score += READINESS_CATEGORY;
        }
        if let Some(outline) = &self.outline_draft {
            score += READINESS_OUTLINE;
            if outline.validate().is_valid {
                score += READINESS_VALID_OUTLINE;
            }
        }
        if self.versions.accepted_index().is_some() {
            score += READINESS_ACCEPTED;
        }
        score
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    pub fn begin_hydration(&mut self) -> Result<(), DraftStateError> {
        self.require(&[DraftPhase::Empty], "hydrate")?;
        self.phase = DraftPhase::Hydrating;
        Ok(())
    }

    /// Load a previously saved draft, if any, and start editing.
    ///
    /// A hydrated payload becomes the undo snapshot since it is already persisted.
    pub fn finish_hydration(
        &mut self,
        payload: Option<DraftPayload>,
        now: DateTime<Utc>,
    ) -> Result<(), DraftStateError> {
        self.require(&[DraftPhase::Hydrating], "finish hydration")?;

        if let Some(payload) = payload {
            self.last_persisted = Some(payload.snapshot());
            self.versions = VersionHistory::from_parts(
                payload.version_history,
                payload.selected_version_index,
                payload.accepted_version_index,
            );
            self.metadata = payload.metadata;
            self.outline_draft = payload.outline_draft;
            self.ai_prompt_text = payload.ai_prompt_text;
            self.updated_at = payload.updated_at.unwrap_or(now);
        }

        self.phase = DraftPhase::Editing;
        self.autosave_status = AutosaveStatus::Idle;
        Ok(())
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Metadata stays editable while a generation is running.
    pub fn update_metadata(
        &mut self,
        edit: impl FnOnce(&mut DraftMetadata),
        now: DateTime<Utc>,
    ) -> Result<(), DraftStateError> {
        self.require(&[DraftPhase::Editing, DraftPhase::Generating], "edit metadata")?;
        edit(&mut self.metadata);
        self.mark_pending(now);
        Ok(())
    }

    pub fn set_ai_prompt_text(
        &mut self,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DraftStateError> {
        self.require(&[DraftPhase::Editing, DraftPhase::Generating], "edit the prompt")?;
        self.ai_prompt_text = text.into();
        self.mark_pending(now);
        Ok(())
    }

    pub fn replace_outline(
        &mut self,
        outline: FlexibleSessionOutline,
        now: DateTime<Utc>,
    ) -> Result<(), DraftStateError> {
        self.require(&[DraftPhase::Editing], "replace the outline")?;
        self.outline_draft = Some(outline);
        self.mark_pending(now);
        Ok(())
    }

    /// Apply an editor operation to the working outline.
    ///
    /// A rejected operation leaves the draft untouched.
    pub fn edit_outline(
        &mut self,
        edit: impl FnOnce(&FlexibleSessionOutline) -> Result<FlexibleSessionOutline, OutlineEditError>,
        now: DateTime<Utc>,
    ) -> Result<(), DraftStateError> {
        self.require(&[DraftPhase::Editing], "edit the outline")?;
        let current = self.outline_draft.as_ref().ok_or(DraftStateError::NoOutline)?;
        let updated = edit(current)?;
        self.outline_draft = Some(updated);
        self.mark_pending(now);
        Ok(())
    }

    // =========================================================================
    // Generation
    // =========================================================================

    pub fn begin_generation(&mut self) -> Result<(), DraftStateError> {
        self.require(&[DraftPhase::Editing], "start generation")?;
        self.phase = DraftPhase::Generating;
        Ok(())
    }

    /// Record a generated outline as a new selected version and make it the
    /// working draft. Returns the version index.
    pub fn complete_generation(
        &mut self,
        outline: FlexibleSessionOutline,
        provenance: Provenance,
        now: DateTime<Utc>,
    ) -> Result<usize, DraftStateError> {
        self.require(&[DraftPhase::Generating], "complete generation")?;
        let index = self.versions.push(OutlineVersion {
            outline: outline.clone(),
            provenance,
            generated_at: outline.generated_at(),
        });
        self.outline_draft = Some(outline);
        self.phase = DraftPhase::Editing;
        self.mark_pending(now);
        Ok(index)
    }

    /// Abandon a generation that never produced an outline.
    pub fn cancel_generation(&mut self) -> Result<(), DraftStateError> {
        self.require(&[DraftPhase::Generating], "cancel generation")?;
        self.phase = DraftPhase::Editing;
        Ok(())
    }

    // =========================================================================
    // Versions
    // =========================================================================

    /// Select a version and load a copy of it as the working draft.
    pub fn select_version(&mut self, index: usize, now: DateTime<Utc>) -> Result<(), DraftStateError> {
        self.require(&[DraftPhase::Editing], "select a version")?;
        if !self.versions.select(index) {
            return Err(DraftStateError::UnknownVersion(index));
        }
        self.outline_draft = self.versions.get(index).map(|v| v.outline.clone());
        self.mark_pending(now);
        Ok(())
    }

    pub fn accept_version(&mut self, index: usize, now: DateTime<Utc>) -> Result<(), DraftStateError> {
        self.require(&[DraftPhase::Editing], "accept a version")?;
        if !self.versions.accept(index) {
            return Err(DraftStateError::UnknownVersion(index));
        }
        self.mark_pending(now);
        Ok(())
    }

    pub fn clear_acceptance(&mut self, now: DateTime<Utc>) -> Result<(), DraftStateError> {
        self.require(&[DraftPhase::Editing], "clear acceptance")?;
        self.versions.clear_acceptance();
        self.mark_pending(now);
        Ok(())
    }

    // =========================================================================
    // Undo
    // =========================================================================

    /// Revert metadata and outline to the last persisted snapshot.
    pub fn undo(&mut self, now: DateTime<Utc>) -> Result<(), DraftStateError> {
        self.require(&[DraftPhase::Editing], "undo")?;
        let snapshot = self
            .last_persisted
            .clone()
            .ok_or(DraftStateError::NothingToUndo)?;
        self.metadata = snapshot.metadata;
        self.outline_draft = snapshot.outline_draft;
        self.mark_pending(now);
        Ok(())
    }

    // =========================================================================
    // Autosave
    // =========================================================================

    pub fn to_payload(&self) -> DraftPayload {
        DraftPayload {
            metadata: self.metadata.clone(),
            outline_draft: self.outline_draft.clone(),
            ai_prompt_text: self.ai_prompt_text.clone(),
            version_history: self.versions.versions().to_vec(),
            selected_version_index: self.versions.selected_index(),
            accepted_version_index: self.versions.accepted_index(),
            updated_at: Some(self.updated_at),
        }
    }

    pub fn mark_saving(&mut self, revision: u64) {
        if revision == self.revision {
            self.autosave_status = AutosaveStatus::Saving;
        }
    }

    /// Record a finished save of `revision`. The snapshot always becomes the
    /// undo target; the status only settles if no newer edit exists.
    pub fn mark_saved(&mut self, revision: u64, snapshot: DraftSnapshot, location: SaveLocation) {
        self.last_persisted = Some(snapshot);
        if revision == self.revision {
            self.autosave_status = match location {
                SaveLocation::Remote => AutosaveStatus::Saved,
                SaveLocation::Local => AutosaveStatus::SavedLocally,
            };
        } else {
            self.autosave_status = AutosaveStatus::Pending;
        }
    }

    pub fn mark_save_failed(&mut self, revision: u64) {
        self.autosave_status = if revision == self.revision {
            AutosaveStatus::Error
        } else {
            AutosaveStatus::Pending
        };
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn mark_pending(&mut self, now: DateTime<Utc>) {
        self.revision += 1;
        self.autosave_status = AutosaveStatus::Pending;
        self.updated_at = now;
    }

    fn require(&self, allowed: &[DraftPhase], action: &'static str) -> Result<(), DraftStateError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(DraftStateError::InvalidTransition {
                from: self.phase,
                action,
            })
        }
    }
}
