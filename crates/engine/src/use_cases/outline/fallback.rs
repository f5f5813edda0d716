//! Template-seeded outline used when synthesis cannot complete.

use chrono::{DateTime, Utc};

use sessioncraft_domain::{FlexibleSessionOutline, OutlineBrief, SectionType, SessionTemplate};

/// Build an outline purely from `template`, with titles and descriptions
/// pointed at the brief's category. Section types, order and durations are
/// the template's, so the result keeps the template's opener and closing.
pub fn build_fallback_outline(
    template: &SessionTemplate,
    brief: &OutlineBrief,
    now: DateTime<Utc>,
) -> FlexibleSessionOutline {
    let category = brief.category.trim();
    let outcome = brief.desired_outcome.trim();

    let sections = template
        .instantiate(now)
        .into_iter()
        .map(|mut section| {
            if !category.is_empty() {
                if matches!(section.section_type, SectionType::Content | SectionType::Activity) {
                    section.title = format!("{}: {}", section.title, category);
                }
                section.description = if outcome.is_empty() {
                    format!("{} Tailored for {}.", section.description, category)
                } else {
                    format!(
                        "{} Tailored for {}: {}.",
                        section.description, category, outcome
                    )
                };
            }
            section
        })
        .collect();

    let audience = brief
        .audience_size
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| template.recommended_audience_size.clone());

    FlexibleSessionOutline::new(sections, now)
        .with_title(suggested_title(brief))
        .with_description(suggested_description(template, brief))
        .with_difficulty(template.difficulty)
        .with_audience_size(audience)
        .with_fallback_used(true)
}

fn suggested_title(brief: &OutlineBrief) -> String {
    let category = brief.category.trim();
    let session_type = title_case(brief.session_type.trim());
    match (category.is_empty(), session_type.is_empty()) {
        (false, false) => format!("{} {}", category, session_type),
        (false, true) => format!("{} Session", category),
        (true, false) => session_type,
        (true, true) => "Training Session".to_string(),
    }
}

fn suggested_description(template: &SessionTemplate, brief: &OutlineBrief) -> String {
    let outcome = brief.desired_outcome.trim();
    if outcome.is_empty() {
        template.description.clone()
    } else {
        format!("{} Goal: {}.", template.description, outcome)
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
