//! Section editor use cases.
//!
//! Thin layer over the outline aggregate's editor operations: stamps the
//! current time and logs rejected edits. Every call returns a new outline.

use std::sync::Arc;

use sessioncraft_domain::{
    FlexibleSessionOutline, OutlineEditError, SectionId, SectionPatch, SectionType,
    ValidationReport,
};

use crate::infrastructure::ports::ClockPort;

#[derive(Debug, thiserror::Error)]
pub enum SectionEditError {
    #[error(transparent)]
    Edit(#[from] OutlineEditError),
    #[error("Unsupported section type: {0}")]
    UnsupportedType(SectionType),
}

pub struct SectionOps {
    clock: Arc<dyn ClockPort>,
}

impl SectionOps {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self { clock }
    }

    /// Insert a default section of `section_type` with `patch` applied on top,
    /// at the 1-based `position` or at the end.
    pub fn add(
        &self,
        outline: &FlexibleSessionOutline,
        section_type: SectionType,
        patch: &SectionPatch,
        position: Option<u32>,
    ) -> Result<FlexibleSessionOutline, SectionEditError> {
        if !section_type.is_known() {
            return Err(SectionEditError::UnsupportedType(section_type));
        }
        Ok(outline.with_section_added(section_type, patch, position, self.clock.now()))
    }

    /// Removing an unknown id is a no-op.
    pub fn remove(&self, outline: &FlexibleSessionOutline, id: SectionId) -> FlexibleSessionOutline {
        outline.without_section(id)
    }

    pub fn update(
        &self,
        outline: &FlexibleSessionOutline,
        id: SectionId,
        patch: &SectionPatch,
    ) -> Result<FlexibleSessionOutline, SectionEditError> {
        outline
            .with_section_updated(id, patch, self.clock.now())
            .map_err(|e| rejected("update", e))
    }

    pub fn reorder(
        &self,
        outline: &FlexibleSessionOutline,
        order: &[SectionId],
    ) -> Result<FlexibleSessionOutline, SectionEditError> {
        outline.reordered(order).map_err(|e| rejected("reorder", e))
    }

    pub fn duplicate(
        &self,
        outline: &FlexibleSessionOutline,
        id: SectionId,
    ) -> Result<FlexibleSessionOutline, SectionEditError> {
        outline
            .with_section_duplicated(id, self.clock.now())
            .map_err(|e| rejected("duplicate", e))
    }

    pub fn validate(&self, outline: &FlexibleSessionOutline) -> ValidationReport {
        outline.validate()
    }
}

fn rejected(operation: &'static str, error: OutlineEditError) -> SectionEditError {
    tracing::debug!(operation, error = %error, "Section edit rejected");
    SectionEditError::Edit(error)
}
