//! The author's generation brief

use serde::{Deserialize, Serialize};

/// What the author asked for: category, desired outcome, duration and audience.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineBrief {
    pub category: String,
    #[serde(default)]
    pub session_type: String,
    #[serde(default)]
    pub desired_outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_problem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_topics: Option<String>,
    /// Requested length in minutes.
    #[serde(default, alias = "duration")]
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_size: Option<String>,
}

impl OutlineBrief {
    pub fn new(category: impl Into<String>, session_type: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            session_type: session_type.into(),
            ..Default::default()
        }
    }

    pub fn with_desired_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.desired_outcome = outcome.into();
        self
    }

    pub fn with_current_problem(mut self, problem: impl Into<String>) -> Self {
        self.current_problem = Some(problem.into());
        self
    }

    pub fn with_specific_topics(mut self, topics: impl Into<String>) -> Self {
        self.specific_topics = Some(topics.into());
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Desired outcome, current problem and specific topics joined for
    /// keyword extraction.
    pub fn keyword_source_text(&self) -> String {
        [
            Some(self.desired_outcome.as_str()),
            self.current_problem.as_deref(),
            self.specific_topics.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_text_skips_missing_parts() {
        let brief = OutlineBrief::new("Leadership", "workshop")
            .with_desired_outcome("build trust")
            .with_specific_topics("delegation");
        assert_eq!(brief.keyword_source_text(), "build trust delegation");
    }

    #[test]
    fn duration_alias_is_accepted() {
        let brief: OutlineBrief =
            serde_json::from_str(r#"{"category": "Sales", "duration": 60}"#).unwrap();
        assert_eq!(brief.duration_minutes, 60);
    }
}
