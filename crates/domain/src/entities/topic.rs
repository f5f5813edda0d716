//! Topic entity - read-only view of a stored training topic

use serde::{Deserialize, Serialize};

use crate::ids::TopicId;

/// A stored topic that generation can draw on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    /// Richer description text produced by an earlier enhancement pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_enhanced_content: Option<String>,
}

impl Topic {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: TopicId::new(),
            name: name.into(),
            description: String::new(),
            category: category.into(),
            ai_enhanced_content: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_ai_enhanced_content(mut self, content: impl Into<String>) -> Self {
        self.ai_enhanced_content = Some(content.into());
        self
    }

    /// Text used when describing the topic to a reader or a model.
    pub fn display_description(&self) -> &str {
        match self.ai_enhanced_content.as_deref() {
            Some(content) if !content.trim().is_empty() => content,
            _ => &self.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_enhanced_content_when_present() {
        let topic = Topic::new("Feedback", "Leadership")
            .with_description("Giving feedback")
            .with_ai_enhanced_content("Structured feedback using the SBI model");
        assert_eq!(topic.display_description(), "Structured feedback using the SBI model");
    }

    #[test]
    fn falls_back_to_description_for_blank_enhanced_content() {
        let topic = Topic::new("Feedback", "Leadership")
            .with_description("Giving feedback")
            .with_ai_enhanced_content("   ");
        assert_eq!(topic.display_description(), "Giving feedback");
    }
}
