use serde::{Deserialize, Serialize};

/// Outcome of validating a section or an outline.
///
/// Violations are additive: every rule is checked and every failure listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn valid() -> Self {
        Self::from_errors(Vec::new())
    }
}
