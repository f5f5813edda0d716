//! Request bodies for the engine HTTP API

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sessioncraft_domain::{FlexibleSessionOutline, OutlineBrief, Section, SectionPatch, SectionType};

// =============================================================================
// Generation
// =============================================================================

/// `POST /api/outlines/generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOutlineRequest {
    #[serde(flatten)]
    pub brief: OutlineBrief,
    /// Template to seed from. Unknown ids fall back to the built-in default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Uuid>,
    /// Use the fixed four-slot generator and convert its result.
    #[serde(default)]
    pub legacy: bool,
}

impl GenerateOutlineRequest {
    pub fn new(brief: OutlineBrief) -> Self {
        Self {
            brief,
            template_id: None,
            legacy: false,
        }
    }
}

// =============================================================================
// Outline editing
// =============================================================================

/// `POST /api/outlines/validate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateOutlineRequest {
    pub outline: FlexibleSessionOutline,
}

/// `POST /api/outlines/sections/add`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSectionRequest {
    pub outline: FlexibleSessionOutline,
    pub section_type: SectionType,
    /// Fields to use instead of the type's placeholders.
    #[serde(default)]
    pub section: SectionPatch,
    /// 1-based; omitted appends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

/// `POST /api/outlines/sections/remove`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveSectionRequest {
    pub outline: FlexibleSessionOutline,
    pub section_id: Uuid,
}

/// `POST /api/outlines/sections/update`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSectionRequest {
    pub outline: FlexibleSessionOutline,
    pub section_id: Uuid,
    pub updates: SectionPatch,
}

/// `POST /api/outlines/sections/reorder`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderSectionsRequest {
    pub outline: FlexibleSessionOutline,
    pub section_ids: Vec<Uuid>,
}

/// `POST /api/outlines/sections/duplicate`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateSectionRequest {
    pub outline: FlexibleSessionOutline,
    pub section_id: Uuid,
}

// =============================================================================
// Templates
// =============================================================================

/// `POST /api/templates`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}
