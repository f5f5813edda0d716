//! Aggregate roots - domain objects that own their related data
//!
//! - [`FlexibleSessionOutline`] owns its sections and keeps positions and the
//!   total duration consistent. Editor operations return new outlines.
//! - [`DraftSession`] owns the authoring lifecycle: metadata, the working
//!   outline, generated versions, and autosave state.

pub mod draft;
pub mod outline;

pub use draft::{AutosaveStatus, DraftPhase, DraftSession, DraftStateError, SaveLocation};
pub use outline::{
    FlexibleSessionOutline, OutlineEditError, MAX_OUTLINE_DURATION_MINUTES,
    MIN_OUTLINE_DURATION_MINUTES,
};
