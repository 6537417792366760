use serde::{Deserialize, Serialize};

/// Partition of two file sets into exclusive and shared paths.
///
/// All three lists are sorted lexicographically. The partition invariant
/// holds: `only_in_first ∪ common` reconstitutes the first set,
/// `only_in_second ∪ common` the second, and the exclusive lists are disjoint
/// from `common`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileSetDiff {
    /// Paths present only in the first side.
    #[serde(default)]
    pub only_in_first: Vec<String>,
    /// Paths present only in the second side.
    #[serde(default)]
    pub only_in_second: Vec<String>,
    /// Paths present on both sides.
    #[serde(default)]
    pub common: Vec<String>,
}
