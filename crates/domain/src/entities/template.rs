//! Session templates - reusable starting structures for outlines
//!
//! Templates are immutable once created. A custom template is a copy of an
//! outline's sections under a fresh [`TemplateId`]; editing the outline
//! afterwards never touches the template.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::section::{Section, SectionType};
use crate::ids::TemplateId;
use crate::sections::renumber_positions;
use crate::value_objects::Difficulty;

/// A section as stored in a template: no id, no timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSection {
    #[serde(rename = "type")]
    pub section_type: SectionType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: u32,
    pub position: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub learning_objectives: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_activities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials_needed: Vec<String>,
}

impl TemplateSection {
    fn new(
        section_type: SectionType,
        title: &str,
        description: &str,
        duration_minutes: u32,
        position: u32,
    ) -> Self {
        Self {
            section_type,
            title: title.to_string(),
            description: description.to_string(),
            duration_minutes,
            position,
            learning_objectives: Vec::new(),
            suggested_activities: Vec::new(),
            materials_needed: Vec::new(),
        }
    }

    fn from_section(section: &Section) -> Self {
        Self {
            section_type: section.section_type,
            title: section.title.clone(),
            description: section.description.clone(),
            duration_minutes: section.duration_minutes,
            position: section.position,
            learning_objectives: section.learning_objectives.clone(),
            suggested_activities: section.suggested_activities.clone(),
            materials_needed: section.materials_needed.clone(),
        }
    }

    /// Materialize as an outline section with a fresh id.
    pub fn to_section(&self, now: DateTime<Utc>) -> Section {
        Section::new(self.section_type, self.title.clone(), self.duration_minutes, now)
            .with_description(self.description.clone())
            .with_position(self.position)
            .with_learning_objectives(self.learning_objectives.clone())
            .with_suggested_activities(self.suggested_activities.clone())
            .with_materials_needed(self.materials_needed.clone())
    }
}

/// A named, reusable outline structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTemplate {
    pub id: TemplateId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub sections: Vec<TemplateSection>,
    pub total_duration: u32,
    pub difficulty: Difficulty,
    pub recommended_audience_size: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_default: bool,
    pub is_public: bool,
}

impl SessionTemplate {
    /// The built-in template used as generation seed and last-resort fallback.
    pub fn builtin_default() -> Self {
        let sections = vec![
            TemplateSection::new(
                SectionType::Opener,
                "Welcome & Objectives",
                "Introduce the facilitator, connect participants and share what the session will achieve.",
                10,
                1,
            ),
            TemplateSection::new(
                SectionType::Content,
                "Core Concepts",
                "Present the key ideas, frameworks and examples participants need.",
                30,
                2,
            ),
            TemplateSection::new(
                SectionType::Activity,
                "Guided Practice",
                "Small-group exercise applying the core concepts to realistic scenarios.",
                25,
                3,
            ),
            TemplateSection::new(
                SectionType::Break,
                "Break",
                "Short break to rest and recharge.",
                10,
                4,
            ),
            TemplateSection::new(
                SectionType::Content,
                "Application & Discussion",
                "Debrief the practice, discuss challenges and adapt the ideas to the participants' context.",
                20,
                5,
            ),
            TemplateSection::new(
                SectionType::Closing,
                "Reflection & Next Steps",
                "Summarize takeaways, capture personal commitments and answer open questions.",
                15,
                6,
            ),
        ];
        let total_duration = sections.iter().map(|s| s.duration_minutes).sum();

        Self {
            id: TemplateId::builtin_default(),
            name: "Standard Training Session".to_string(),
            description: "Balanced structure of instruction, practice and reflection.".to_string(),
            category: None,
            sections,
            total_duration,
            difficulty: Difficulty::Intermediate,
            recommended_audience_size: "8-20".to_string(),
            tags: vec!["default".to_string(), "general".to_string()],
            is_default: true,
            is_public: true,
        }
    }

    /// Build a custom template by copying an outline's sections.
    pub fn custom(
        name: impl Into<String>,
        description: impl Into<String>,
        sections: &[Section],
        category: Option<String>,
    ) -> Self {
        let mut ordered: Vec<Section> = sections.to_vec();
        renumber_positions(&mut ordered);
        let sections: Vec<TemplateSection> = ordered.iter().map(TemplateSection::from_section).collect();
        let total_duration = sections.iter().map(|s| s.duration_minutes).sum();

        Self {
            id: TemplateId::new(),
            name: name.into(),
            description: description.into(),
            category,
            sections,
            total_duration,
            difficulty: Difficulty::Intermediate,
            recommended_audience_size: "8-20".to_string(),
            tags: Vec::new(),
            is_default: false,
            is_public: false,
        }
    }

    /// Fresh outline sections for this template, in position order.
    pub fn instantiate(&self, now: DateTime<Utc>) -> Vec<Section> {
        let mut sections: Vec<Section> = self.sections.iter().map(|s| s.to_section(now)).collect();
        sections.sort_by_key(|s| s.position);
        renumber_positions(&mut sections);
        sections
    }
}
