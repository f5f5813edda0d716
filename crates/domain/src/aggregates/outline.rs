//! Flexible session outline aggregate
//!
//! # Invariants
//!
//! - Section positions are exactly `1..=N` in list order, with no gaps or duplicates
//! - `total_duration` always equals the sum of section durations
//!
//! Both are re-established by every constructor and editor operation. Editor
//! operations take `&self` and return a new outline, so a version kept in
//! history is never changed by later edits.
//!
//! Outline-level rules (opener/closing present, total within bounds) are
//! checked by [`FlexibleSessionOutline::validate`], not enforced here.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{Section, SectionType};
use crate::ids::SectionId;
use crate::sections::{build_default_section, compute_total_duration, renumber_positions, validate_section};
use crate::value_objects::{Difficulty, SectionPatch, ValidationReport};

/// Shortest acceptable session.
pub const MIN_OUTLINE_DURATION_MINUTES: u32 = 30;

/// Longest acceptable session.
pub const MAX_OUTLINE_DURATION_MINUTES: u32 = 480;

/// Rejected editor operation. The outline it was applied to is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutlineEditError {
    #[error("Section not found in outline: {0}")]
    UnknownSection(SectionId),
    #[error("Section listed more than once: {0}")]
    DuplicateSection(SectionId),
    #[error("Reorder must list every section exactly once: expected {expected} ids, got {actual}")]
    IncompleteOrder { expected: usize, actual: usize },
}

/// A session plan: an ordered list of typed, timed sections.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use sessioncraft_domain::{FlexibleSessionOutline, SectionPatch, SectionType};
///
/// let now = Utc::now();
/// let outline = FlexibleSessionOutline::new(Vec::new(), now)
///     .with_section_added(SectionType::Opener, &SectionPatch::default(), None, now)
///     .with_section_added(SectionType::Closing, &SectionPatch::default(), None, now);
///
/// assert_eq!(outline.len(), 2);
/// assert_eq!(outline.total_duration(), 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "OutlineRecord", from = "OutlineRecord")]
pub struct FlexibleSessionOutline {
    sections: Vec<Section>,
    total_duration: u32,
    suggested_session_title: String,
    suggested_description: String,
    difficulty: Difficulty,
    recommended_audience_size: String,
    fallback_used: bool,
    generated_at: DateTime<Utc>,
}

impl FlexibleSessionOutline {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Build an outline from sections in their intended order.
    pub fn new(mut sections: Vec<Section>, generated_at: DateTime<Utc>) -> Self {
        renumber_positions(&mut sections);
        let total_duration = compute_total_duration(&sections);
        Self {
            sections,
            total_duration,
            suggested_session_title: String::new(),
            suggested_description: String::new(),
            difficulty: Difficulty::default(),
            recommended_audience_size: String::new(),
            fallback_used: false,
            generated_at,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[inline]
    pub fn total_duration(&self) -> u32 {
        self.total_duration
    }

    #[inline]
    pub fn suggested_session_title(&self) -> &str {
        &self.suggested_session_title
    }

    #[inline]
    pub fn suggested_description(&self) -> &str {
        &self.suggested_description
    }

    #[inline]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[inline]
    pub fn recommended_audience_size(&self) -> &str {
        &self.recommended_audience_size
    }

    #[inline]
    pub fn fallback_used(&self) -> bool {
        self.fallback_used
    }

    #[inline]
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn has_section_type(&self, section_type: SectionType) -> bool {
        self.sections.iter().any(|s| s.section_type == section_type)
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.suggested_session_title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.suggested_description = description.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_audience_size(mut self, size: impl Into<String>) -> Self {
        self.recommended_audience_size = size.into();
        self
    }

    pub fn with_fallback_used(mut self, fallback_used: bool) -> Self {
        self.fallback_used = fallback_used;
        self
    }

    // =========================================================================
    // Editor Operations
    // =========================================================================

    /// Insert a default section of `section_type`, overlaid with `patch`.
    ///
    /// `position` is 1-based. `None` appends; values past the end append and
    /// 0 inserts first.
    pub fn with_section_added(
        &self,
        section_type: SectionType,
        patch: &SectionPatch,
        position: Option<u32>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut section = build_default_section(section_type, 0, now);
        patch.apply_to(&mut section);
        self.with_section_inserted(section, position)
    }

    /// Insert a caller-built section at `position` (same rules as
    /// [`with_section_added`](Self::with_section_added)).
    pub fn with_section_inserted(&self, section: Section, position: Option<u32>) -> Self {
        let mut sections = self.sections.clone();
        let index = match position {
            Some(p) => (p.max(1) as usize - 1).min(sections.len()),
            None => sections.len(),
        };
        sections.insert(index, section);
        self.rebuild(sections)
    }

    /// Drop the section with `id`. Unknown ids leave the sections as they are.
    pub fn without_section(&self, id: SectionId) -> Self {
        let sections = self
            .sections
            .iter()
            .filter(|s| s.id != id)
            .cloned()
            .collect();
        self.rebuild(sections)
    }

    /// Merge `patch` into the section with `id` and stamp `updated_at`.
    pub fn with_section_updated(
        &self,
        id: SectionId,
        patch: &SectionPatch,
        now: DateTime<Utc>,
    ) -> Result<Self, OutlineEditError> {
        let mut sections = self.sections.clone();
        let section = sections
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(OutlineEditError::UnknownSection(id))?;
        patch.apply_to(section);
        section.updated_at = now;
        Ok(self.rebuild(sections))
    }

    /// Re-sequence sections to follow `order`, which must list every section
    /// id exactly once.
    pub fn reordered(&self, order: &[SectionId]) -> Result<Self, OutlineEditError> {
        let mut remaining: Vec<Option<&Section>> = self.sections.iter().map(Some).collect();
        let mut sections = Vec::with_capacity(order.len());

        for id in order {
            // Outlines read off the wire may repeat an id; each listing claims
            // the next unclaimed section carrying it.
            let slot = remaining
                .iter_mut()
                .find(|slot| slot.is_some_and(|s| s.id == *id));
            let Some(section) = slot.and_then(Option::take) else {
                return Err(if self.section(*id).is_some() {
                    OutlineEditError::DuplicateSection(*id)
                } else {
                    OutlineEditError::UnknownSection(*id)
                });
            };
            sections.push(section.clone());
        }

        if sections.len() != self.sections.len() {
            return Err(OutlineEditError::IncompleteOrder {
                expected: self.sections.len(),
                actual: order.len(),
            });
        }

        Ok(self.rebuild(sections))
    }

    /// Clone the section with `id` right after the original.
    pub fn with_section_duplicated(
        &self,
        id: SectionId,
        now: DateTime<Utc>,
    ) -> Result<Self, OutlineEditError> {
        let index = self
            .sections
            .iter()
            .position(|s| s.id == id)
            .ok_or(OutlineEditError::UnknownSection(id))?;
        let copy = self.sections[index].duplicate(now);
        let mut sections = self.sections.clone();
        sections.insert(index + 1, copy);
        Ok(self.rebuild(sections))
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Per-section checks plus outline rules. All violations are reported.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();

        if self.sections.is_empty() {
            errors.push("Outline must contain at least one section".to_string());
        }

        let mut seen = HashSet::new();
        for section in &self.sections {
            if !seen.insert(section.id) {
                errors.push(format!(
                    "Section {}: duplicate section id {}",
                    section.position, section.id
                ));
            }
            let report = validate_section(section);
            errors.extend(
                report
                    .errors
                    .into_iter()
                    .map(|e| format!("Section {}: {}", section.position, e)),
            );
        }

        if !self.has_section_type(SectionType::Opener) {
            errors.push("Outline must include at least one opener section".to_string());
        }
        if !self.has_section_type(SectionType::Closing) {
            errors.push("Outline must include at least one closing section".to_string());
        }

        if self.total_duration < MIN_OUTLINE_DURATION_MINUTES {
            errors.push(format!(
                "Total duration of {} minutes is below the minimum of {} minutes",
                self.total_duration, MIN_OUTLINE_DURATION_MINUTES
            ));
        } else if self.total_duration > MAX_OUTLINE_DURATION_MINUTES {
            errors.push(format!(
                "Total duration of {} minutes exceeds the maximum of {} minutes",
                self.total_duration, MAX_OUTLINE_DURATION_MINUTES
            ));
        }

        ValidationReport::from_errors(errors)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn rebuild(&self, mut sections: Vec<Section>) -> Self {
        renumber_positions(&mut sections);
        let total_duration = compute_total_duration(&sections);
        let outline = Self {
            sections,
            total_duration,
            suggested_session_title: self.suggested_session_title.clone(),
            suggested_description: self.suggested_description.clone(),
            difficulty: self.difficulty,
            recommended_audience_size: self.recommended_audience_size.clone(),
            fallback_used: self.fallback_used,
            generated_at: self.generated_at,
        };
        debug_assert!(outline.positions_are_contiguous());
        outline
    }

    fn positions_are_contiguous(&self) -> bool {
        self.sections
            .iter()
            .enumerate()
            .all(|(i, s)| s.position == i as u32 + 1)
    }
}

/// Wire shape. `totalDuration` is written for readers but recomputed on read.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutlineRecord {
    sections: Vec<Section>,
    #[serde(default)]
    total_duration: u32,
    #[serde(default)]
    suggested_session_title: String,
    #[serde(default)]
    suggested_description: String,
    #[serde(default)]
    difficulty: Difficulty,
    #[serde(default)]
    recommended_audience_size: String,
    #[serde(default)]
    fallback_used: bool,
    generated_at: DateTime<Utc>,
}

impl From<FlexibleSessionOutline> for OutlineRecord {
    fn from(outline: FlexibleSessionOutline) -> Self {
        Self {
            sections: outline.sections,
            total_duration: outline.total_duration,
            suggested_session_title: outline.suggested_session_title,
            suggested_description: outline.suggested_description,
            difficulty: outline.difficulty,
            recommended_audience_size: outline.recommended_audience_size,
            fallback_used: outline.fallback_used,
            generated_at: outline.generated_at,
        }
    }
}

impl From<OutlineRecord> for FlexibleSessionOutline {
    fn from(record: OutlineRecord) -> Self {
        let mut sections = record.sections;
        // Stable: sections sharing a position keep their listed order.
        sections.sort_by_key(|s| s.position);
        Self::new(sections, record.generated_at)
            .with_title(record.suggested_session_title)
            .with_description(record.suggested_description)
            .with_difficulty(record.difficulty)
            .with_audience_size(record.recommended_audience_size)
            .with_fallback_used(record.fallback_used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn three_sections() -> (FlexibleSessionOutline, [SectionId; 3]) {
        let t = now();
        let a = Section::new(SectionType::Opener, "A", 10, t);
        let b = Section::new(SectionType::Content, "B", 30, t);
        let c = Section::new(SectionType::Closing, "C", 15, t);
        let ids = [a.id, b.id, c.id];
        (FlexibleSessionOutline::new(vec![a, b, c], t), ids)
    }

    fn assert_invariants(outline: &FlexibleSessionOutline) {
        let positions: Vec<u32> = outline.sections().iter().map(|s| s.position).collect();
        assert_eq!(positions, (1..=outline.len() as u32).collect::<Vec<_>>());
        assert_eq!(
            outline.total_duration(),
            outline.sections().iter().map(|s| s.duration_minutes).sum::<u32>()
        );
    }

    #[test]
    fn add_inserts_at_position_and_renumbers() {
        let (outline, [a, b, _]) = three_sections();
        let updated = outline.with_section_added(
            SectionType::Break,
            &SectionPatch::default(),
            Some(2),
            now(),
        );

        assert_invariants(&updated);
        assert_eq!(updated.len(), 4);
        assert_eq!(updated.sections()[0].id, a);
        assert_eq!(updated.sections()[1].section_type, SectionType::Break);
        assert_eq!(updated.sections()[2].id, b);
        assert_eq!(updated.total_duration(), 65);
        // original untouched
        assert_eq!(outline.len(), 3);
    }

    #[test]
    fn add_clamps_out_of_range_positions() {
        let (outline, [a, _, _]) = three_sections();
        let appended =
            outline.with_section_added(SectionType::Activity, &SectionPatch::default(), Some(99), now());
        assert_eq!(appended.sections()[3].section_type, SectionType::Activity);

        let first =
            outline.with_section_added(SectionType::Activity, &SectionPatch::default(), Some(0), now());
        assert_eq!(first.sections()[0].section_type, SectionType::Activity);
        assert_eq!(first.sections()[1].id, a);
        assert_invariants(&first);
    }

    #[test]
    fn add_applies_supplied_fields() {
        let (outline, _) = three_sections();
        let patch = SectionPatch {
            title: Some("Panel".into()),
            duration_minutes: Some(45),
            ..Default::default()
        };
        let updated = outline.with_section_added(SectionType::Custom, &patch, None, now());
        let last = &updated.sections()[3];
        assert_eq!(last.title, "Panel");
        assert_eq!(last.duration_minutes, 45);
        assert_eq!(updated.total_duration(), 100);
    }

    #[test]
    fn remove_is_idempotent_for_unknown_ids() {
        let (outline, [_, b, _]) = three_sections();
        let removed = outline.without_section(b);
        assert_invariants(&removed);
        assert_eq!(removed.len(), 2);
        assert_eq!(removed.total_duration(), 25);

        let again = removed.without_section(b);
        assert_eq!(again, removed);
    }

    #[test]
    fn update_stamps_updated_at_and_rejects_unknown_ids() {
        let (outline, [a, _, _]) = three_sections();
        let later = now() + chrono::Duration::minutes(5);
        let updated = outline
            .with_section_updated(a, &SectionPatch::duration(20), later)
            .unwrap();

        assert_eq!(updated.section(a).unwrap().duration_minutes, 20);
        assert_eq!(updated.section(a).unwrap().updated_at, later);
        assert_eq!(updated.total_duration(), 65);

        let missing = SectionId::new();
        assert_eq!(
            outline.with_section_updated(missing, &SectionPatch::default(), later),
            Err(OutlineEditError::UnknownSection(missing))
        );
    }

    #[test]
    fn reorder_follows_given_ids() {
        let (outline, [a, b, c]) = three_sections();
        let reordered = outline.reordered(&[b, a, c]).unwrap();

        assert_eq!(reordered.section(b).unwrap().position, 1);
        assert_eq!(reordered.section(a).unwrap().position, 2);
        assert_eq!(reordered.section(c).unwrap().position, 3);
        assert_eq!(reordered.total_duration(), outline.total_duration());
    }

    #[test]
    fn reorder_rejects_bad_input() {
        let (outline, [a, b, c]) = three_sections();
        let stranger = SectionId::new();

        assert_eq!(
            outline.reordered(&[a, stranger, c]),
            Err(OutlineEditError::UnknownSection(stranger))
        );
        assert_eq!(
            outline.reordered(&[a, a, c]),
            Err(OutlineEditError::DuplicateSection(a))
        );
        assert_eq!(
            outline.reordered(&[a, b]),
            Err(OutlineEditError::IncompleteOrder { expected: 3, actual: 2 })
        );
    }

    #[test]
    fn repeated_ids_are_flagged_and_still_reorderable() {
        let t = now();
        let opener = Section::new(SectionType::Opener, "Open", 10, t);
        let mut twin = Section::new(SectionType::Content, "Body", 30, t);
        twin.id = opener.id;
        let closing = Section::new(SectionType::Closing, "Close", 10, t);
        let (a, c) = (opener.id, closing.id);
        let outline = FlexibleSessionOutline::new(vec![opener, twin, closing], t);

        let report = outline.validate();
        assert!(!report.is_valid);
        assert_eq!(
            report.errors,
            vec![format!("Section 2: duplicate section id {}", a)]
        );

        let reordered = outline.reordered(&[c, a, a]).unwrap();
        let titles: Vec<&str> = reordered.sections().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Close", "Open", "Body"]);
        assert_invariants(&reordered);
        assert_eq!(
            outline.reordered(&[a, a, a]),
            Err(OutlineEditError::DuplicateSection(a))
        );
    }

    #[test]
    fn duplicate_inserts_copy_after_original() {
        let (outline, [a, b, _]) = three_sections();
        let duplicated = outline.with_section_duplicated(a, now()).unwrap();

        assert_invariants(&duplicated);
        let copy = &duplicated.sections()[1];
        assert_ne!(copy.id, a);
        assert_eq!(copy.title, "A (Copy)");
        assert_eq!(copy.position, 2);
        assert_eq!(duplicated.sections()[2].id, b);
        assert_eq!(duplicated.total_duration(), outline.total_duration() + 10);
    }

    #[test]
    fn validation_violations_are_additive() {
        let t = now();
        let outline = FlexibleSessionOutline::new(
            vec![
                Section::new(SectionType::Content, "One", 5, t),
                Section::new(SectionType::Activity, "Two", 10, t),
                Section::new(SectionType::Content, "Three", 5, t),
            ],
            t,
        );

        let report = outline.validate();

        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("opener")));
        assert!(report.errors.iter().any(|e| e.contains("closing")));
        assert!(report.errors.iter().any(|e| e.contains("below the minimum of 30")));
    }

    #[test]
    fn validation_flags_long_sessions_and_bad_sections() {
        let t = now();
        let outline = FlexibleSessionOutline::new(
            vec![
                Section::new(SectionType::Opener, "Open", 10, t),
                Section::new(SectionType::Content, "", 500, t),
                Section::new(SectionType::Closing, "Close", 10, t),
            ],
            t,
        );

        let report = outline.validate();
        assert!(report.errors.iter().any(|e| e == "Section 2: Section title is required"));
        assert!(report.errors.iter().any(|e| e.contains("exceeds the maximum of 480")));
    }

    #[test]
    fn valid_outline_passes() {
        let (outline, _) = three_sections();
        assert_eq!(outline.validate(), ValidationReport::valid());
    }

    #[test]
    fn deserialization_orders_by_position_and_recomputes_total() {
        let (outline, [a, b, c]) = three_sections();
        let mut json = serde_json::to_value(&outline).unwrap();
        assert_eq!(json["totalDuration"], 55);

        json["totalDuration"] = serde_json::json!(999);
        let sections = json["sections"].as_array_mut().unwrap();
        sections.swap(0, 2);

        let restored: FlexibleSessionOutline = serde_json::from_value(json).unwrap();
        assert_eq!(restored.total_duration(), 55);
        let ids: Vec<SectionId> = restored.sections().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }
}
