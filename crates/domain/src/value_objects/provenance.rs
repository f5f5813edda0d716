use serde::{Deserialize, Serialize};

/// Which generation sources actually contributed to an outline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub rag_available: bool,
    pub rag_queried: bool,
    pub fallback_used: bool,
}
