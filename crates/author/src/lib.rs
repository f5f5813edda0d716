//! Sessioncraft Author - the client side of outline authoring.
//!
//! An [`AuthoringSession`] owns one draft: it hydrates it from the engine (or
//! the local snapshot when the engine is unreachable), applies edits through
//! the draft state machine, requests generated outlines, and autosaves with a
//! debounce.

pub mod autosave;
pub mod config;
pub mod infrastructure;
pub mod ports;
pub mod session;

pub use autosave::{AutosaveHandle, AutosaveWorker, SharedDraft};
pub use config::AuthorConfig;
pub use ports::{ClientError, DraftStore, OutlineGenerator, SnapshotStore};
pub use session::{AuthoringSession, SessionError};
