//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod config;
pub mod drafts;
pub mod ollama;
pub mod ports;
pub mod rag;
pub mod resilient_llm;
pub mod topics;
