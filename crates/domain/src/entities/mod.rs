//! Entities: plain data records with identity.

pub mod legacy_outline;
pub mod section;
pub mod template;
pub mod topic;

pub use legacy_outline::{LegacyOutline, LegacySlot};
pub use section::{Section, SectionType, MIN_SECTION_DURATION_MINUTES};
pub use template::{SessionTemplate, TemplateSection};
pub use topic::Topic;
