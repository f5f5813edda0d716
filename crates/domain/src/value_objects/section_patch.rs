//! Partial section updates

use serde::{Deserialize, Serialize};

use crate::entities::{Section, SectionType};

/// Fields to overwrite on a section. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPatch {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub section_type: Option<SectionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_objectives: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_activities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials_needed: Option<Vec<String>>,
}

impl SectionPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn duration(minutes: u32) -> Self {
        Self {
            duration_minutes: Some(minutes),
            ..Default::default()
        }
    }

    /// Merge into `section`. Ids, positions and timestamps are never patched.
    pub fn apply_to(&self, section: &mut Section) {
        if let Some(section_type) = self.section_type {
            section.section_type = section_type;
        }
        if let Some(title) = &self.title {
            section.title = title.clone();
        }
        if let Some(description) = &self.description {
            section.description = description.clone();
        }
        if let Some(duration) = self.duration_minutes {
            section.duration_minutes = duration;
        }
        if let Some(objectives) = &self.learning_objectives {
            section.learning_objectives = objectives.clone();
        }
        if let Some(activities) = &self.suggested_activities {
            section.suggested_activities = activities.clone();
        }
        if let Some(materials) = &self.materials_needed {
            section.materials_needed = materials.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn only_present_fields_are_applied() {
        let mut section = Section::new(SectionType::Content, "Old", 30, Utc::now())
            .with_description("keep me");
        let patch = SectionPatch {
            title: Some("New".into()),
            duration_minutes: Some(45),
            ..Default::default()
        };

        patch.apply_to(&mut section);

        assert_eq!(section.title, "New");
        assert_eq!(section.duration_minutes, 45);
        assert_eq!(section.description, "keep me");
        assert_eq!(section.section_type, SectionType::Content);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(SectionPatch::default().is_empty());
        assert!(!SectionPatch::title("x").is_empty());
    }
}
