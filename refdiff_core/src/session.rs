//! Session context for a sequence of comparisons against one repository.
//!
//! The session is the explicit owner of everything the comparison workflow
//! keeps between requests: the repository handle, the user's mapping table,
//! and the request generation counter that invalidates superseded results.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::api::{CompareReport, MappingEntry, RefLists, SideBySideTable};
use crate::cache::{CompareCache, NoopCache};
use crate::compare::Comparator;
use crate::mapping::MappingTable;
use crate::repository::Repository;
use crate::{Error, Result};

/// The result of one comparison pass, tagged with the request generation it
/// belongs to.
///
/// A subsequent comparison or mapping edit supersedes the report; rendering
/// from a superseded report fails with [`Error::StaleComparison`] instead of
/// silently mixing state from two requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    /// Generation counter value at the time the report was produced.
    pub generation: u64,
    /// The presentation-facing comparison report.
    pub report: CompareReport,
}

/// Stateful handle for one logical user session.
#[derive(Debug)]
pub struct CompareSession {
    repository: Mutex<Repository>,
    mappings: Mutex<MappingTable>,
    comparator: Comparator,
    generation: AtomicU64,
}

impl CompareSession {
    /// Open a session against an existing repository clone.
    ///
    /// # Errors
    ///
    /// Returns an error when the path does not resolve to a repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_repository(
            Repository::open(path)?,
            Arc::new(NoopCache),
        ))
    }

    /// Open a session with a memoization cache installed.
    ///
    /// # Errors
    ///
    /// Returns an error when the path does not resolve to a repository.
    pub fn open_with_cache(path: impl AsRef<Path>, cache: Arc<dyn CompareCache>) -> Result<Self> {
        Ok(Self::from_repository(Repository::open(path)?, cache))
    }

    /// Open a session, cloning the repository from `url` first when no clone
    /// exists at `path` yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the clone fails or an existing directory does
    /// not hold a repository.
    pub fn clone_if_absent(url: &str, path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_repository(
            Repository::clone_if_absent(url, path)?,
            Arc::new(NoopCache),
        ))
    }

    fn from_repository(repository: Repository, cache: Arc<dyn CompareCache>) -> Self {
        Self {
            repository: Mutex::new(repository),
            mappings: Mutex::new(MappingTable::new()),
            comparator: Comparator::with_cache(cache),
            generation: AtomicU64::new(0),
        }
    }

    /// Enumerate the refs available for comparison.
    ///
    /// # Errors
    ///
    /// Propagates repository access failures.
    pub fn ref_lists(&self) -> Result<RefLists> {
        self.with_repository(Repository::ref_lists)
    }

    /// Add one mapping entry; supersedes any in-flight comparison.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyMappingEntry`] for empty names; the table and
    /// the generation counter are left untouched in that case.
    pub fn add_mapping(&self, source: impl Into<String>, target: impl Into<String>) -> Result<()> {
        {
            let mut mappings = self.mappings.lock().map_err(|_| Error::Internal)?;
            mappings.add(source, target)?;
        }
        self.bump_generation();
        Ok(())
    }

    /// Derive mappings from a regex substitution over the files of one ref;
    /// supersedes any in-flight comparison when entries were added.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for an uncompilable pattern, or
    /// repository failures while listing the ref's files.
    pub fn add_pattern_mappings(
        &self,
        reference: &str,
        pattern: &str,
        replacement: &str,
    ) -> Result<usize> {
        let files = self.with_repository(|repo| repo.list_files(reference))?;
        let added = {
            let mut mappings = self.mappings.lock().map_err(|_| Error::Internal)?;
            mappings.add_pattern_mappings(&files, pattern, replacement)?
        };
        if added > 0 {
            self.bump_generation();
        }
        Ok(added)
    }

    /// Snapshot of the current mapping table in insertion order.
    ///
    /// # Errors
    ///
    /// Fails only when the session lock is poisoned.
    pub fn mappings(&self) -> Result<Vec<MappingEntry>> {
        let mappings = self.mappings.lock().map_err(|_| Error::Internal)?;
        Ok(mappings.entries().to_vec())
    }

    /// Clear the mapping table, e.g. on session reset.
    ///
    /// # Errors
    ///
    /// Fails only when the session lock is poisoned.
    pub fn reset_mappings(&self) -> Result<()> {
        {
            let mut mappings = self.mappings.lock().map_err(|_| Error::Internal)?;
            mappings.clear();
        }
        self.bump_generation();
        Ok(())
    }

    /// Run a full comparison pass between two refs.
    ///
    /// Starting a comparison supersedes any earlier result: the returned
    /// [`Comparison`] carries the new generation.
    ///
    /// # Errors
    ///
    /// Propagates ref resolution and backend failures from the pipeline.
    pub fn compare(&self, first_ref: &str, second_ref: &str) -> Result<Comparison> {
        let generation = self.bump_generation();
        let report = {
            let repository = self.repository.lock().map_err(|_| Error::Internal)?;
            let mappings = self.mappings.lock().map_err(|_| Error::Internal)?;
            self.comparator
                .compare(&repository, first_ref, second_ref, &mappings)?
        };
        Ok(Comparison { generation, report })
    }

    /// Render the side-by-side table for one summary entry of a comparison.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleComparison`] when the comparison has been
    /// superseded by a newer request or when a side of the pair has since
    /// become absent, and [`Error::InvalidSummaryEntry`] when `index` does
    /// not address a summary entry of the report.
    pub fn render_entry(&self, comparison: &Comparison, index: usize) -> Result<SideBySideTable> {
        if comparison.generation != self.generation.load(Ordering::SeqCst) {
            return Err(Error::StaleComparison);
        }
        let entry = comparison
            .report
            .summary
            .get(index)
            .ok_or(Error::InvalidSummaryEntry { index })?;

        let rendered = {
            let repository = self.repository.lock().map_err(|_| Error::Internal)?;
            self.comparator.render(
                &repository,
                &comparison.report.first_ref,
                &comparison.report.second_ref,
                &entry.first_path,
                &entry.second_path,
            )?
        };
        rendered.ok_or(Error::StaleComparison)
    }

    fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn with_repository<F, T>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&Repository) -> Result<T>,
    {
        let repository = self.repository.lock().map_err(|_| Error::Internal)?;
        op(&repository)
    }
}
