//! Outline generation: keyword extraction, LLM synthesis, template fallback
//! and the orchestrating pipeline.

mod fallback;
mod generate;
mod keywords;
mod synthesis;

pub use fallback::build_fallback_outline;
pub use generate::{GenerateOutline, GeneratedOutline, GenerationConfig, StageOutcome};
pub use keywords::{extract_keywords, MAX_KEYWORDS};
pub use synthesis::OutlineSynthesizer;
