use serde::{Deserialize, Serialize};

/// Which ref namespace a name belongs to.
///
/// Branches and tags are separate namespaces and are never conflated when
/// resolving a comparison side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    /// A remote-tracking branch.
    Branch,
    /// A lightweight or annotated tag.
    Tag,
}

/// The resolvable refs of a repository, grouped by namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RefLists {
    /// Short names of remote-tracking branches (e.g., `origin/main`).
    #[serde(default)]
    pub branches: Vec<String>,
    /// Tag names rendered as plain strings.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RefLists {
    /// Returns the names available in one namespace.
    #[must_use]
    pub fn names(&self, kind: RefKind) -> &[String] {
        match kind {
            RefKind::Branch => &self.branches,
            RefKind::Tag => &self.tags,
        }
    }

    /// True when the repository exposes neither branches nor tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty() && self.tags.is_empty()
    }
}
