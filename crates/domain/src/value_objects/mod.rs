//! Value objects: immutable descriptive types without identity.

mod brief;
mod difficulty;
mod draft;
mod provenance;
mod section_patch;
mod validation;
mod version_history;

pub use brief::OutlineBrief;
pub use difficulty::Difficulty;
pub use draft::{DraftMetadata, DraftPayload, DraftSnapshot};
pub use provenance::Provenance;
pub use section_patch::SectionPatch;
pub use validation::ValidationReport;
pub use version_history::{OutlineVersion, VersionHistory};
