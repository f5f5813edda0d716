//! Legacy fixed-structure outline
//!
//! Outlines created before the flexible section model had exactly four slots.
//! They are only ever read and converted forward via
//! [`convert_legacy_to_flexible`](crate::sections::convert_legacy_to_flexible).

use serde::{Deserialize, Serialize};

use crate::value_objects::Difficulty;

/// One slot of a legacy outline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacySlot {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub suggested_activities: Vec<String>,
    #[serde(default)]
    pub materials_needed: Vec<String>,
}

impl LegacySlot {
    pub fn new(title: impl Into<String>, description: impl Into<String>, duration: u32) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            duration,
            ..Default::default()
        }
    }
}

/// The four-slot outline shape: opener, main topic, activity, closing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyOutline {
    #[serde(default)]
    pub opener: LegacySlot,
    #[serde(default, alias = "mainContent")]
    pub main_topic: LegacySlot,
    #[serde(default)]
    pub activity: LegacySlot,
    #[serde(default)]
    pub closing: LegacySlot,
    #[serde(default)]
    pub suggested_session_title: String,
    #[serde(default)]
    pub suggested_description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub recommended_audience_size: String,
}

impl LegacyOutline {
    /// Slots in session order.
    pub fn slots(&self) -> [&LegacySlot; 4] {
        [&self.opener, &self.main_topic, &self.activity, &self.closing]
    }

    pub fn total_duration(&self) -> u32 {
        self.slots().iter().map(|slot| slot.duration).sum()
    }
}
