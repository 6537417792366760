//! Session mapping table pairing files that were renamed between the two
//! compared snapshots.

use std::collections::BTreeSet;

use regex::Regex;

use crate::api::MappingEntry;
use crate::{Error, Result};

/// Ordered table of (source path -> target path) pairings maintained by the
/// user during a session.
///
/// Sources are unique: re-adding a source overwrites its target while
/// keeping the entry's original position, so display order stays stable.
#[derive(Debug, Default, Clone)]
pub struct MappingTable {
    entries: Vec<MappingEntry>,
}

impl MappingTable {
    /// Create an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a mapping, overwriting the target of an existing entry with
    /// the same source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyMappingEntry`] when either name is empty; the
    /// table is left untouched in that case.
    pub fn add(&mut self, source: impl Into<String>, target: impl Into<String>) -> Result<()> {
        let source = source.into();
        let target = target.into();
        if source.is_empty() || target.is_empty() {
            return Err(Error::EmptyMappingEntry);
        }

        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.source == source) {
            entry.target = target;
        } else {
            self.entries.push(MappingEntry { source, target });
        }
        Ok(())
    }

    /// Derive mappings by applying a regex substitution to every file name.
    ///
    /// Names the substitution leaves untouched produce no entry. Returns the
    /// number of mappings added or overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] when `pattern` does not compile; the
    /// table is left untouched in that case.
    pub fn add_pattern_mappings(
        &mut self,
        files: &BTreeSet<String>,
        pattern: &str,
        replacement: &str,
    ) -> Result<usize> {
        let regex = Regex::new(pattern)?;
        let mut added = 0;
        for file in files {
            let renamed = regex.replace_all(file, replacement);
            if renamed != *file {
                self.add(file.clone(), renamed.into_owned())?;
                added += 1;
            }
        }
        Ok(added)
    }

    /// Current entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// True when no mappings have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Build the candidate pair list for one comparison pass.
    ///
    /// Starts from identity pairs for every common path (sorted order), then
    /// applies each table entry in insertion order: a mapping replaces the
    /// identity pair keyed on its source, so a mapped file is compared only
    /// under the mapping's target.
    #[must_use]
    pub fn build_pairs(&self, common: &BTreeSet<String>) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = common
            .iter()
            .map(|path| (path.clone(), path.clone()))
            .collect();

        for entry in &self.entries {
            pairs.retain(|(source, _)| *source != entry.source);
            pairs.push((entry.source.clone(), entry.target.clone()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(paths: &[&str]) -> BTreeSet<String> {
        paths.iter().map(|path| (*path).to_owned()).collect()
    }

    #[test]
    fn add_rejects_empty_names_without_mutating() {
        let mut table = MappingTable::new();
        assert!(matches!(table.add("", "x"), Err(Error::EmptyMappingEntry)));
        assert!(matches!(table.add("x", ""), Err(Error::EmptyMappingEntry)));
        assert!(table.is_empty());
    }

    #[test]
    fn duplicate_source_overwrites_in_place() {
        let mut table = MappingTable::new();
        table.add("a.py", "b.py").expect("add mapping");
        table.add("c.py", "d.py").expect("add mapping");
        table.add("a.py", "renamed.py").expect("overwrite mapping");

        assert_eq!(table.entries().len(), 2);
        assert_eq!(table.entries()[0].source, "a.py");
        assert_eq!(table.entries()[0].target, "renamed.py");
        assert_eq!(table.entries()[1].source, "c.py");
    }

    #[test]
    fn mapping_takes_precedence_over_identity_pair() {
        let mut table = MappingTable::new();
        table.add("x", "y").expect("add mapping");

        let pairs = table.build_pairs(&set(&["x"]));
        assert_eq!(pairs, vec![("x".to_owned(), "y".to_owned())]);
    }

    #[test]
    fn identity_mapping_re_add_is_a_no_op_overwrite() {
        let mut table = MappingTable::new();
        table.add("x", "x").expect("add identity mapping");

        let pairs = table.build_pairs(&set(&["x", "z"]));
        assert_eq!(
            pairs,
            vec![
                ("z".to_owned(), "z".to_owned()),
                ("x".to_owned(), "x".to_owned()),
            ]
        );
    }

    #[test]
    fn pairs_cover_common_then_mappings_in_order() {
        let mut table = MappingTable::new();
        table.add("old.py", "new.py").expect("add mapping");

        let pairs = table.build_pairs(&set(&["b.txt", "a.txt"]));
        assert_eq!(
            pairs,
            vec![
                ("a.txt".to_owned(), "a.txt".to_owned()),
                ("b.txt".to_owned(), "b.txt".to_owned()),
                ("old.py".to_owned(), "new.py".to_owned()),
            ]
        );
    }

    #[test]
    fn pattern_mappings_rename_matching_files() {
        let mut table = MappingTable::new();
        let files = set(&["src/alpha.py", "src/beta.py", "README.md"]);

        let added = table
            .add_pattern_mappings(&files, r"\.py$", ".rs")
            .expect("pattern mappings");

        assert_eq!(added, 2);
        assert_eq!(table.entries()[0].source, "src/alpha.py");
        assert_eq!(table.entries()[0].target, "src/alpha.rs");
        assert_eq!(table.entries()[1].source, "src/beta.py");
    }

    #[test]
    fn invalid_pattern_leaves_table_untouched() {
        let mut table = MappingTable::new();
        let files = set(&["a.py"]);
        let err = table.add_pattern_mappings(&files, "(", "x");
        assert!(matches!(err, Err(Error::InvalidPattern { .. })));
        assert!(table.is_empty());
    }

    #[test]
    fn clear_empties_the_table() {
        let mut table = MappingTable::new();
        table.add("a", "b").expect("add mapping");
        table.clear();
        assert!(table.is_empty());
    }
}
