pub mod aggregates;
pub mod entities;
pub mod error;
pub mod ids;
pub mod sections;
pub mod value_objects;

pub use aggregates::{
    AutosaveStatus, DraftPhase, DraftSession, DraftStateError, FlexibleSessionOutline,
    OutlineEditError, SaveLocation, MAX_OUTLINE_DURATION_MINUTES, MIN_OUTLINE_DURATION_MINUTES,
};

pub use entities::{
    LegacyOutline, LegacySlot, Section, SectionType, SessionTemplate, TemplateSection, Topic,
    MIN_SECTION_DURATION_MINUTES,
};

pub use error::DomainError;

// Re-export ID types
pub use ids::{SectionId, SessionId, TemplateId, TopicId};

pub use sections::{
    build_default_section, compute_total_duration, convert_legacy_to_flexible,
    renumber_positions, validate_section,
};

pub use value_objects::{
    Difficulty, DraftMetadata, DraftPayload, DraftSnapshot, OutlineBrief, OutlineVersion,
    Provenance, SectionPatch, ValidationReport, VersionHistory,
};
