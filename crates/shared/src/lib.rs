//! Sessioncraft Shared - wire types for the engine HTTP API
//!
//! Everything here is used on both sides of the wire: the engine decodes
//! requests and encodes responses, the authoring client does the reverse.
//!
//! # Design Principles
//!
//! 1. **No business logic** - pure data types and serialization
//! 2. **camelCase JSON** - field names match what browser clients send
//! 3. **Raw ids** - requests carry `uuid::Uuid`; the engine converts to domain ids

pub mod requests;
pub mod responses;

pub use requests::{
    AddSectionRequest, CreateTemplateRequest, DuplicateSectionRequest, GenerateOutlineRequest,
    RemoveSectionRequest, ReorderSectionsRequest, UpdateSectionRequest, ValidateOutlineRequest,
};
pub use responses::{ErrorBody, ErrorCode, GenerateOutlineResponse, HealthResponse};
