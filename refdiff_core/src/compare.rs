//! Orchestration of one comparison pass between two named refs.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{CompareReport, DiffSummaryEntry, FileSetDiff, SideBySideTable};
use crate::cache::{BlobKey, CompareCache, NoopCache};
use crate::diff::DiffEngine;
use crate::mapping::MappingTable;
use crate::repository::Repository;
use crate::{Error, Result};

/// Partition two file sets into exclusive and shared paths.
///
/// Pure set arithmetic; the sorted output order falls out of the input sets.
#[must_use]
pub fn diff_file_sets(first: &BTreeSet<String>, second: &BTreeSet<String>) -> FileSetDiff {
    FileSetDiff {
        only_in_first: first.difference(second).cloned().collect(),
        only_in_second: second.difference(first).cloned().collect(),
        common: first.intersection(second).cloned().collect(),
    }
}

/// Runs the comparison pipeline: tree listing, set partitioning, candidate
/// pair construction, content fetching, and change-count filtering.
pub struct Comparator {
    engine: DiffEngine,
    cache: Arc<dyn CompareCache>,
}

impl Comparator {
    /// Construct a comparator without memoization.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cache(Arc::new(NoopCache))
    }

    /// Construct a comparator backed by the provided cache port.
    #[must_use]
    pub fn with_cache(cache: Arc<dyn CompareCache>) -> Self {
        Self {
            engine: DiffEngine::new(),
            cache,
        }
    }

    /// Access the underlying diff engine.
    #[must_use]
    pub const fn engine(&self) -> &DiffEngine {
        &self.engine
    }

    /// Compare the trees of two refs and summarize every candidate pair
    /// whose contents differ.
    ///
    /// Pairs with an Absent side are dropped silently: a stale mapping is an
    /// expected condition, not a failure. Summary order follows candidate
    /// pair order (sorted common paths, then mapping entries in insertion
    /// order), so repeated runs over the same inputs are identical.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RefNotFound`] when a side fails to resolve even
    /// after one ref-list refresh, or a backend error for repository
    /// failures; either aborts the pass.
    pub fn compare(
        &self,
        repo: &Repository,
        first_ref: &str,
        second_ref: &str,
        mappings: &MappingTable,
    ) -> Result<CompareReport> {
        let first_files = self.list_files_with_refresh(repo, first_ref)?;
        let second_files = self.list_files_with_refresh(repo, second_ref)?;
        let files = diff_file_sets(&first_files, &second_files);

        let common: BTreeSet<String> = files.common.iter().cloned().collect();
        let pairs = mappings.build_pairs(&common);
        debug!(
            first_ref,
            second_ref,
            candidates = pairs.len(),
            "built candidate pair list"
        );

        let mut summary = Vec::new();
        for (first_path, second_path) in pairs {
            let Some(first_content) = self.fetch_blob(repo, first_ref, &first_path)? else {
                debug!(path = %first_path, reference = first_ref, "dropping pair: absent on first side");
                continue;
            };
            let Some(second_content) = self.fetch_blob(repo, second_ref, &second_path)? else {
                debug!(path = %second_path, reference = second_ref, "dropping pair: absent on second side");
                continue;
            };
            if first_content == second_content {
                continue;
            }

            let changed_lines = self.change_count(&first_content, &second_content);
            if changed_lines == 0 {
                continue;
            }
            summary.push(DiffSummaryEntry {
                first_path,
                second_path,
                changed_lines,
            });
        }
        debug!(entries = summary.len(), "comparison summary ready");

        Ok(CompareReport {
            first_ref: first_ref.to_owned(),
            second_ref: second_ref.to_owned(),
            files,
            mappings: mappings.entries().to_vec(),
            summary,
        })
    }

    /// Produce the full side-by-side rendering for one selected pair.
    ///
    /// Returns `Ok(None)` when either side has since become Absent, meaning
    /// the pair is no longer comparable and the summary is stale.
    ///
    /// # Errors
    ///
    /// Propagates ref resolution and backend failures.
    pub fn render(
        &self,
        repo: &Repository,
        first_ref: &str,
        second_ref: &str,
        first_path: &str,
        second_path: &str,
    ) -> Result<Option<SideBySideTable>> {
        let Some(first_content) = self.fetch_blob(repo, first_ref, first_path)? else {
            return Ok(None);
        };
        let Some(second_content) = self.fetch_blob(repo, second_ref, second_path)? else {
            return Ok(None);
        };

        Ok(Some(self.engine.render_side_by_side(
            &first_content,
            &second_content,
            &format!("{first_ref}:{first_path}"),
            &format!("{second_ref}:{second_path}"),
        )))
    }

    fn list_files_with_refresh(
        &self,
        repo: &Repository,
        reference: &str,
    ) -> Result<BTreeSet<String>> {
        match repo.list_files(reference) {
            Err(Error::RefNotFound { .. }) => {
                warn!(reference, "ref did not resolve; refreshing ref lists and retrying once");
                repo.ref_lists()?;
                repo.list_files(reference)
            }
            result => result,
        }
    }

    fn fetch_blob(
        &self,
        repo: &Repository,
        reference: &str,
        path: &str,
    ) -> Result<Option<String>> {
        let key = BlobKey::new(reference, path);
        if let Some(cached) = self.cache.get_blob(&key) {
            return Ok(cached);
        }
        let content = repo.blob_content(reference, path)?;
        self.cache.put_blob(key, content.clone());
        Ok(content)
    }

    fn change_count(&self, first: &str, second: &str) -> u32 {
        if let Some(cached) = self.cache.get_change_count(first, second) {
            return cached;
        }
        let count = self.engine.quick_change_count(first, second);
        self.cache.put_change_count(first, second, count);
        count
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comparator")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
