//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::{ClockPort, DraftRepo, LlmPort, RagPort, TopicRepo};
use crate::use_cases::{
    DraftOps, GenerateOutline, GenerationConfig, OutlineUseCases, SectionOps, TemplateRegistry,
};

/// Main application state.
///
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub outline: OutlineUseCases,
    pub templates: Arc<TemplateRegistry>,
    pub drafts: Arc<DraftOps>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        topics: Arc<dyn TopicRepo>,
        drafts: Arc<dyn DraftRepo>,
        rag: Arc<dyn RagPort>,
        llm: Arc<dyn LlmPort>,
        clock: Arc<dyn ClockPort>,
        generation: GenerationConfig,
    ) -> Self {
        let templates = Arc::new(TemplateRegistry::new());

        let generate = Arc::new(GenerateOutline::new(
            topics,
            rag,
            llm,
            templates.clone(),
            clock.clone(),
            generation,
        ));
        let sections = Arc::new(SectionOps::new(clock.clone()));
        let drafts = Arc::new(DraftOps::new(drafts, clock));

        Self {
            use_cases: UseCases {
                outline: OutlineUseCases::new(generate, sections),
                templates,
                drafts,
            },
        }
    }
}
