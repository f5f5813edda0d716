//! LLM-backed outline synthesis.
//!
//! Builds the prompt from the brief, topic matches, retrieval excerpts and the
//! selected template, then maps the model's JSON reply onto sections. Any
//! failure here is reported as an [`LlmError`]; the caller decides what to
//! fall back to.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use sessioncraft_domain::{
    Difficulty, FlexibleSessionOutline, LegacyOutline, LegacySlot, OutlineBrief, Section,
    SectionType, SessionTemplate, Topic,
};

use crate::infrastructure::ports::{ChatMessage, LlmError, LlmPort, LlmRequest, RagResult};

const MAX_RAG_EXCERPTS: usize = 5;
const MAX_EXCERPT_CHARS: usize = 800;
const OUTLINE_TEMPERATURE: f32 = 0.7;
const OUTLINE_MAX_TOKENS: u32 = 3000;

const FLEXIBLE_SYSTEM_PROMPT: &str = "You are an experienced instructional designer who plans \
    live training sessions. Respond with a single JSON object only, no prose. The object has \
    'suggestedSessionTitle', 'suggestedDescription', 'difficulty' (beginner, intermediate or \
    advanced), 'recommendedAudienceSize' and 'sections'. Each section has 'type' (one of opener, \
    content, activity, break, closing, custom), 'title', 'description', 'durationMinutes', \
    'learningObjectives', 'suggestedActivities' and 'materialsNeeded'. Start with an opener and \
    end with a closing section.";

const LEGACY_SYSTEM_PROMPT: &str = "You are an experienced instructional designer who plans \
    live training sessions. Respond with a single JSON object only, no prose. The object has \
    'opener', 'mainTopic', 'activity' and 'closing', each with 'title', 'description', \
    'duration' (minutes), 'learningObjectives', 'suggestedActivities' and 'materialsNeeded'; \
    plus 'suggestedSessionTitle', 'suggestedDescription', 'difficulty' and \
    'recommendedAudienceSize'.";

/// Model reply for the flexible shape. Every field is optional so partial
/// replies still parse; usability is checked after mapping.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LlmOutline {
    suggested_session_title: String,
    suggested_description: String,
    difficulty: Option<String>,
    recommended_audience_size: String,
    sections: Vec<LlmSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LlmSection {
    #[serde(rename = "type")]
    section_type: String,
    title: String,
    description: String,
    #[serde(alias = "duration")]
    duration_minutes: u32,
    learning_objectives: Vec<String>,
    suggested_activities: Vec<String>,
    materials_needed: Vec<String>,
}

/// Turns generation inputs into outlines through the LLM port.
pub struct OutlineSynthesizer {
    llm: Arc<dyn LlmPort>,
}

impl OutlineSynthesizer {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }

    pub async fn generate_flexible(
        &self,
        brief: &OutlineBrief,
        topics: &[Topic],
        rag: Option<&RagResult>,
        template: &SessionTemplate,
        now: DateTime<Utc>,
    ) -> Result<FlexibleSessionOutline, LlmError> {
        let prompt = format!(
            "{}\n\nUse this structure as a starting point and adapt it to the brief:\n{}\n\n\
             Respond with JSON only.",
            context_block(brief, topics, rag),
            template_block(template)
        );

        let content = self.complete(FLEXIBLE_SYSTEM_PROMPT, prompt).await?;
        parse_flexible_outline(&content, now)
    }

    pub async fn generate_legacy(
        &self,
        brief: &OutlineBrief,
        topics: &[Topic],
        rag: Option<&RagResult>,
    ) -> Result<LegacyOutline, LlmError> {
        let prompt = format!(
            "{}\n\nPlan an opener, one main topic, one activity and a closing. Respond with JSON only.",
            context_block(brief, topics, rag)
        );

        let content = self.complete(LEGACY_SYSTEM_PROMPT, prompt).await?;
        parse_legacy_outline(&content)
    }

    async fn complete(&self, system_prompt: &str, prompt: String) -> Result<String, LlmError> {
        let request = LlmRequest::new(vec![ChatMessage::user(prompt)])
            .with_system_prompt(system_prompt)
            .with_temperature(OUTLINE_TEMPERATURE)
            .with_max_tokens(Some(OUTLINE_MAX_TOKENS));

        let response = self.llm.generate(request).await?;
        Ok(response.content)
    }
}

fn context_block(brief: &OutlineBrief, topics: &[Topic], rag: Option<&RagResult>) -> String {
    let mut lines = vec![
        format!("Category: {}", brief.category),
        format!("Session type: {}", brief.session_type),
        format!("Desired outcome: {}", brief.desired_outcome),
    ];
    if let Some(problem) = brief.current_problem.as_deref().filter(|p| !p.trim().is_empty()) {
        lines.push(format!("Current problem: {}", problem));
    }
    if let Some(specific) = brief.specific_topics.as_deref().filter(|t| !t.trim().is_empty()) {
        lines.push(format!("Specific topics: {}", specific));
    }
    if brief.duration_minutes > 0 {
        lines.push(format!("Target duration: {} minutes", brief.duration_minutes));
    }
    if let Some(audience) = brief.audience_size.as_deref().filter(|a| !a.trim().is_empty()) {
        lines.push(format!("Audience size: {}", audience));
    }

    if !topics.is_empty() {
        let topic_list = topics
            .iter()
            .map(|topic| {
                let description = topic.display_description();
                if description.trim().is_empty() {
                    format!("- {}", topic.name)
                } else {
                    format!("- {}: {}", topic.name, description)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        lines.push(format!("\nRelevant topics from the library:\n{}", topic_list));
    }

    if let Some(rag) = rag.filter(|r| !r.is_empty()) {
        let excerpts = rag
            .sources
            .iter()
            .filter(|s| !s.content.trim().is_empty())
            .take(MAX_RAG_EXCERPTS)
            .map(|s| format!("- {}", truncate(s.content.trim(), MAX_EXCERPT_CHARS)))
            .collect::<Vec<_>>()
            .join("\n");
        lines.push(format!("\nReference material:\n{}", excerpts));
    }

    lines.join("\n")
}

fn template_block(template: &SessionTemplate) -> String {
    template
        .sections
        .iter()
        .map(|s| {
            format!(
                "{}. [{}] {} ({} min)",
                s.position,
                s.section_type.as_str(),
                s.title,
                s.duration_minutes
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Slice from the first `{` to the last `}`, skipping code fences or chatter
/// around the object.
fn extract_json_object(content: &str) -> Result<&str, LlmError> {
    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(&content[start..=end]),
        _ => Err(LlmError::InvalidResponse(
            "response did not contain a JSON object".to_string(),
        )),
    }
}

fn parse_flexible_outline(
    content: &str,
    now: DateTime<Utc>,
) -> Result<FlexibleSessionOutline, LlmError> {
    let json = extract_json_object(content)?;
    let parsed: LlmOutline = serde_json::from_str(json).map_err(|e| {
        tracing::warn!(error = %e, "Failed to parse LLM outline JSON");
        LlmError::InvalidResponse(e.to_string())
    })?;

    let sections: Vec<Section> = parsed
        .sections
        .into_iter()
        .filter(|s| !s.title.trim().is_empty())
        .map(|s| {
            // Anything the model invents outside the closed set becomes custom.
            let section_type = s.section_type.parse().unwrap_or(SectionType::Custom);
            let duration = if s.duration_minutes == 0 {
                section_type.default_duration_minutes()
            } else {
                s.duration_minutes
            };
            Section::new(section_type, s.title.trim(), duration, now)
                .with_description(s.description.trim())
                .with_learning_objectives(s.learning_objectives)
                .with_suggested_activities(s.suggested_activities)
                .with_materials_needed(s.materials_needed)
        })
        .collect();

    if sections.is_empty() {
        return Err(LlmError::InvalidResponse(
            "outline contained no usable sections".to_string(),
        ));
    }

    let difficulty = parsed
        .difficulty
        .as_deref()
        .and_then(|d| d.parse::<Difficulty>().ok())
        .unwrap_or_default();

    Ok(FlexibleSessionOutline::new(sections, now)
        .with_title(parsed.suggested_session_title)
        .with_description(parsed.suggested_description)
        .with_difficulty(difficulty)
        .with_audience_size(parsed.recommended_audience_size))
}

fn parse_legacy_outline(content: &str) -> Result<LegacyOutline, LlmError> {
    let json = extract_json_object(content)?;
    let mut legacy: LegacyOutline = serde_json::from_str(json).map_err(|e| {
        tracing::warn!(error = %e, "Failed to parse LLM legacy outline JSON");
        LlmError::InvalidResponse(e.to_string())
    })?;

    if legacy.slots().iter().all(|slot| slot.title.trim().is_empty()) {
        return Err(LlmError::InvalidResponse(
            "legacy outline contained no usable slots".to_string(),
        ));
    }

    let defaults = [
        (SectionType::Opener, &mut legacy.opener),
        (SectionType::Content, &mut legacy.main_topic),
        (SectionType::Activity, &mut legacy.activity),
        (SectionType::Closing, &mut legacy.closing),
    ];
    for (section_type, slot) in defaults {
        fill_slot_defaults(section_type, slot);
    }

    Ok(legacy)
}

fn fill_slot_defaults(section_type: SectionType, slot: &mut LegacySlot) {
    if slot.title.trim().is_empty() {
        slot.title = section_type.placeholder_title().to_string();
    }
    if slot.duration == 0 {
        slot.duration = section_type.default_duration_minutes();
    }
}
