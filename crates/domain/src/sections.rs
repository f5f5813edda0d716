//! Section utilities: pure functions over ordered section lists.

use chrono::{DateTime, Utc};

use crate::aggregates::FlexibleSessionOutline;
use crate::entities::{LegacyOutline, LegacySlot, Section, SectionType, MIN_SECTION_DURATION_MINUTES};
use crate::value_objects::ValidationReport;

/// Reassign positions 1..N in current list order.
pub fn renumber_positions(sections: &mut [Section]) {
    for (index, section) in sections.iter_mut().enumerate() {
        section.position = index as u32 + 1;
    }
}

/// Sum of section durations. Missing durations are already 0.
pub fn compute_total_duration(sections: &[Section]) -> u32 {
    sections
        .iter()
        .fold(0u32, |total, s| total.saturating_add(s.duration_minutes))
}

/// Check a single section. Never fails; violations are listed in the report.
pub fn validate_section(section: &Section) -> ValidationReport {
    let mut errors = Vec::new();

    if section.title.trim().is_empty() {
        errors.push("Section title is required".to_string());
    }
    if section.duration_minutes == 0 {
        errors.push("Section duration must be positive".to_string());
    } else if section.duration_minutes < MIN_SECTION_DURATION_MINUTES {
        errors.push(format!(
            "Section duration must be at least {} minutes",
            MIN_SECTION_DURATION_MINUTES
        ));
    }
    if !section.section_type.is_known() {
        errors.push("Unknown section type".to_string());
    }

    ValidationReport::from_errors(errors)
}

/// A section of `section_type` pre-filled with placeholder content.
pub fn build_default_section(
    section_type: SectionType,
    position: u32,
    now: DateTime<Utc>,
) -> Section {
    Section::new(
        section_type,
        section_type.placeholder_title(),
        section_type.default_duration_minutes(),
        now,
    )
    .with_description(section_type.placeholder_description())
    .with_position(position)
}

/// Map the four-slot legacy shape onto the flexible section list.
///
/// Slot content is carried over unchanged; positions follow slot order.
pub fn convert_legacy_to_flexible(
    legacy: &LegacyOutline,
    now: DateTime<Utc>,
) -> FlexibleSessionOutline {
    let slots: [(SectionType, &LegacySlot); 4] = [
        (SectionType::Opener, &legacy.opener),
        (SectionType::Content, &legacy.main_topic),
        (SectionType::Activity, &legacy.activity),
        (SectionType::Closing, &legacy.closing),
    ];

    let sections = slots
        .into_iter()
        .map(|(section_type, slot)| {
            Section::new(section_type, slot.title.clone(), slot.duration, now)
                .with_description(slot.description.clone())
                .with_learning_objectives(slot.learning_objectives.clone())
                .with_suggested_activities(slot.suggested_activities.clone())
                .with_materials_needed(slot.materials_needed.clone())
        })
        .collect();

    FlexibleSessionOutline::new(sections, now)
        .with_title(legacy.suggested_session_title.clone())
        .with_description(legacy.suggested_description.clone())
        .with_difficulty(legacy.difficulty)
        .with_audience_size(legacy.recommended_audience_size.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn renumber_is_idempotent() {
        let t = now();
        let mut sections = vec![
            Section::new(SectionType::Opener, "a", 10, t).with_position(7),
            Section::new(SectionType::Content, "b", 30, t).with_position(7),
            Section::new(SectionType::Closing, "c", 10, t).with_position(0),
        ];

        renumber_positions(&mut sections);
        let once = sections.clone();
        renumber_positions(&mut sections);

        assert_eq!(sections, once);
        assert_eq!(
            sections.iter().map(|s| s.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn total_duration_treats_missing_as_zero() {
        let t = now();
        let sections = vec![
            Section::new(SectionType::Opener, "a", 10, t),
            Section::new(SectionType::Content, "b", 0, t),
            Section::new(SectionType::Closing, "c", 15, t),
        ];
        assert_eq!(compute_total_duration(&sections), 25);
        assert_eq!(compute_total_duration(&[]), 0);
    }

    #[test]
    fn validate_section_lists_every_violation() {
        let mut section = Section::new(SectionType::Unknown, "  ", 0, now());
        let report = validate_section(&section);

        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 3);
        assert!(report.errors.iter().any(|e| e.contains("title")));
        assert!(report.errors.iter().any(|e| e.contains("positive")));
        assert!(report.errors.iter().any(|e| e.contains("Unknown section type")));

        section.duration_minutes = 3;
        section.title = "Named".into();
        section.section_type = SectionType::Content;
        let report = validate_section(&section);
        assert_eq!(report.errors, vec!["Section duration must be at least 5 minutes"]);
    }

    #[test]
    fn default_sections_are_valid() {
        for (i, kind) in SectionType::KNOWN.into_iter().enumerate() {
            let section = build_default_section(kind, i as u32 + 1, now());
            assert!(validate_section(&section).is_valid, "{kind} default should be valid");
            assert_eq!(section.position, i as u32 + 1);
        }
        assert_eq!(build_default_section(SectionType::Opener, 1, now()).duration_minutes, 10);
        assert_eq!(build_default_section(SectionType::Break, 1, now()).duration_minutes, 10);
        assert_eq!(build_default_section(SectionType::Content, 1, now()).duration_minutes, 30);
    }

    #[test]
    fn legacy_conversion_preserves_content_and_total() {
        let legacy = LegacyOutline {
            opener: LegacySlot::new("Icebreaker", "Meet the group", 10),
            main_topic: LegacySlot {
                learning_objectives: vec!["Explain trust".into()],
                ..LegacySlot::new("Trust model", "The model", 35)
            },
            activity: LegacySlot::new("Pair work", "Practice", 20),
            closing: LegacySlot::new("Commitments", "Next steps", 10),
            suggested_session_title: "Building Trust".into(),
            ..Default::default()
        };

        let outline = convert_legacy_to_flexible(&legacy, now());

        assert_eq!(outline.total_duration(), legacy.total_duration());
        assert_eq!(
            compute_total_duration(outline.sections()),
            legacy.total_duration()
        );
        let kinds: Vec<SectionType> = outline.sections().iter().map(|s| s.section_type).collect();
        assert_eq!(
            kinds,
            vec![
                SectionType::Opener,
                SectionType::Content,
                SectionType::Activity,
                SectionType::Closing
            ]
        );
        assert_eq!(outline.sections()[1].title, "Trust model");
        assert_eq!(outline.sections()[1].learning_objectives, vec!["Explain trust"]);
        assert_eq!(outline.suggested_session_title(), "Building Trust");
        assert_eq!(
            outline.sections().iter().map(|s| s.position).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }
}
