//! Use cases - User story orchestration.
//!
//! Each module covers one area of the authoring workflow and composes the
//! infrastructure ports it needs.

pub mod drafts;
pub mod outline;
pub mod sections;
pub mod templates;

pub use drafts::{DraftError, DraftOps};
pub use outline::{GenerateOutline, GeneratedOutline, GenerationConfig};
pub use sections::{SectionEditError, SectionOps};
pub use templates::{TemplateError, TemplateRegistry};

use std::sync::Arc;

/// Container for outline use cases.
pub struct OutlineUseCases {
    pub generate: Arc<GenerateOutline>,
    pub sections: Arc<SectionOps>,
}

impl OutlineUseCases {
    pub fn new(generate: Arc<GenerateOutline>, sections: Arc<SectionOps>) -> Self {
        Self { generate, sections }
    }
}
