//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Database access (topics and drafts could move off SQLite)
//! - LLM calls (could swap Ollama -> another OpenAI-compatible server)
//! - Retrieval (the RAG service is optional and may be disabled)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{DraftRepo, TopicRepo};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    ChatMessage, FinishReason, LlmPort, LlmRequest, LlmResponse, MessageRole, RagExcerpt,
    RagPort, RagResult, TokenUsage,
};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use external::{MockLlmPort, MockRagPort};
#[cfg(test)]
pub use repos::{MockDraftRepo, MockTopicRepo};
#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{LlmError, RagError, RepoError};
