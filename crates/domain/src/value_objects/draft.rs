//! Draft metadata and the persisted draft payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregates::FlexibleSessionOutline;
use crate::value_objects::OutlineVersion;

/// Session details the author fills in alongside the outline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audience_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tone_ids: Vec<String>,
}

/// What undo restores: the draft as it was last persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftSnapshot {
    pub metadata: DraftMetadata,
    pub outline_draft: Option<FlexibleSessionOutline>,
}

/// JSON shape of a persisted draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPayload {
    #[serde(default)]
    pub metadata: DraftMetadata,
    #[serde(default)]
    pub outline_draft: Option<FlexibleSessionOutline>,
    #[serde(default)]
    pub ai_prompt_text: String,
    #[serde(default)]
    pub version_history: Vec<OutlineVersion>,
    #[serde(default)]
    pub selected_version_index: Option<usize>,
    #[serde(default)]
    pub accepted_version_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DraftPayload {
    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            metadata: self.metadata.clone(),
            outline_draft: self.outline_draft.clone(),
        }
    }
}
