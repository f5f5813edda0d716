//! Append-only history of generated outlines
//!
//! Versions are never edited or removed once pushed. Selection and acceptance
//! are plain indexes into the list, so editing the working outline can never
//! alias a historical version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregates::FlexibleSessionOutline;
use crate::value_objects::Provenance;

/// One generated outline as it came back from generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineVersion {
    pub outline: FlexibleSessionOutline,
    #[serde(default)]
    pub provenance: Provenance,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionHistory {
    versions: Vec<OutlineVersion>,
    selected: Option<usize>,
    accepted: Option<usize>,
}

impl VersionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts. Indexes that do not point at an existing
    /// version are dropped.
    pub fn from_parts(
        versions: Vec<OutlineVersion>,
        selected: Option<usize>,
        accepted: Option<usize>,
    ) -> Self {
        let len = versions.len();
        Self {
            versions,
            selected: selected.filter(|i| *i < len),
            accepted: accepted.filter(|i| *i < len),
        }
    }

    pub fn versions(&self) -> &[OutlineVersion] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&OutlineVersion> {
        self.versions.get(index)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn accepted_index(&self) -> Option<usize> {
        self.accepted
    }

    pub fn selected(&self) -> Option<&OutlineVersion> {
        self.selected.and_then(|i| self.versions.get(i))
    }

    pub fn accepted(&self) -> Option<&OutlineVersion> {
        self.accepted.and_then(|i| self.versions.get(i))
    }

    /// Append a version and select it. Returns its index.
    pub fn push(&mut self, version: OutlineVersion) -> usize {
        self.versions.push(version);
        let index = self.versions.len() - 1;
        self.selected = Some(index);
        index
    }

    /// Returns false when `index` is out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.versions.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    /// Returns false when `index` is out of range.
    pub fn accept(&mut self, index: usize) -> bool {
        if index < self.versions.len() {
            self.accepted = Some(index);
            true
        } else {
            false
        }
    }

    pub fn clear_acceptance(&mut self) {
        self.accepted = None;
    }
}
