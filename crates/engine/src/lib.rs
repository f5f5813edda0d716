//! Sessioncraft Engine library.
//!
//! Server side of the session authoring tool: outline generation, section
//! editing, templates and draft storage.
//!
//! ## Structure
//!
//! - `use_cases/` - Outline generation pipeline, section editing, templates, drafts
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
