//! Section entity - one timed block of a session outline
//!
//! Sections are plain data. Ordering and the position invariant are owned by
//! the [`FlexibleSessionOutline`](crate::aggregates::FlexibleSessionOutline)
//! aggregate; a section on its own only knows its own position.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::SectionId;

/// Shortest duration a section may have.
pub const MIN_SECTION_DURATION_MINUTES: u32 = 5;

/// The closed set of section kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Opener,
    Content,
    Activity,
    Break,
    Closing,
    Custom,
    /// Anything outside the closed set. Kept so that malformed input can be
    /// reported by validation instead of failing deserialization.
    #[serde(other)]
    Unknown,
}

impl SectionType {
    /// All known section types, in typical session order.
    pub const KNOWN: [SectionType; 6] = [
        Self::Opener,
        Self::Content,
        Self::Activity,
        Self::Break,
        Self::Closing,
        Self::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opener => "opener",
            Self::Content => "content",
            Self::Activity => "activity",
            Self::Break => "break",
            Self::Closing => "closing",
            Self::Custom => "custom",
            Self::Unknown => "unknown",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Opener => "Opener",
            Self::Content => "Content",
            Self::Activity => "Activity",
            Self::Break => "Break",
            Self::Closing => "Closing",
            Self::Custom => "Custom",
            Self::Unknown => "Unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn default_duration_minutes(&self) -> u32 {
        match self {
            Self::Opener => 10,
            Self::Content => 30,
            Self::Activity => 20,
            Self::Break => 10,
            Self::Closing => 10,
            Self::Custom | Self::Unknown => 15,
        }
    }

    pub fn placeholder_title(&self) -> &'static str {
        match self {
            Self::Opener => "Welcome & Introductions",
            Self::Content => "Main Content",
            Self::Activity => "Interactive Activity",
            Self::Break => "Break",
            Self::Closing => "Wrap-up & Next Steps",
            Self::Custom | Self::Unknown => "Custom Section",
        }
    }

    pub fn placeholder_description(&self) -> &'static str {
        match self {
            Self::Opener => "Set the tone, introduce the facilitator and share the session objectives.",
            Self::Content => "Present the core concepts of the session.",
            Self::Activity => "Participants apply the concepts in a hands-on exercise.",
            Self::Break => "Short break to rest and recharge.",
            Self::Closing => "Summarize key takeaways, answer questions and agree on next steps.",
            Self::Custom | Self::Unknown => "Describe what happens in this section.",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "opener" | "opening" | "intro" | "introduction" => Ok(Self::Opener),
            "content" | "main" | "main_content" => Ok(Self::Content),
            "activity" | "exercise" => Ok(Self::Activity),
            "break" => Ok(Self::Break),
            "closing" | "close" | "wrap_up" | "wrapup" => Ok(Self::Closing),
            "custom" => Ok(Self::Custom),
            _ => Err(DomainError::parse(format!("Unknown section type: {}", s))),
        }
    }
}

/// One block of a session outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    #[serde(rename = "type")]
    pub section_type: SectionType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Missing durations deserialize as 0 and are reported by validation.
    #[serde(default)]
    pub duration_minutes: u32,
    /// 1-based; assigned by the owning outline.
    #[serde(default)]
    pub position: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub learning_objectives: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_activities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials_needed: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Section {
    pub fn new(
        section_type: SectionType,
        title: impl Into<String>,
        duration_minutes: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SectionId::new(),
            section_type,
            title: title.into(),
            description: String::new(),
            duration_minutes,
            position: 0,
            learning_objectives: Vec::new(),
            suggested_activities: Vec::new(),
            materials_needed: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }

    pub fn with_learning_objectives(mut self, objectives: Vec<String>) -> Self {
        self.learning_objectives = objectives;
        self
    }

    pub fn with_suggested_activities(mut self, activities: Vec<String>) -> Self {
        self.suggested_activities = activities;
        self
    }

    pub fn with_materials_needed(mut self, materials: Vec<String>) -> Self {
        self.materials_needed = materials;
        self
    }

    /// Copy of this section under a fresh id, titled "<title> (Copy)".
    pub fn duplicate(&self, now: DateTime<Utc>) -> Self {
        Self {
            id: SectionId::new(),
            title: format!("{} (Copy)", self.title),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }
}
