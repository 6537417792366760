use serde::{Deserialize, Serialize};

/// A user-supplied pairing between a path on the first side and a path on
/// the second side, used to compare files that were renamed between refs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Path as it appears in the first side's tree.
    pub source: String,
    /// Path as it appears in the second side's tree.
    pub target: String,
}

impl MappingEntry {
    /// Convenience constructor taking anything string-like.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}
