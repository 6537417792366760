//! Core library for refdiff's snapshot comparison workflow.
//!
//! The crate is layered around four primary responsibilities:
//! - repository access: resolving refs, listing trees, fetching blobs
//! - pure comparison logic: file-set partitioning and line diffing
//! - the session mapping overlay for renamed files
//! - orchestration of a full comparison pass between two refs

#![warn(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::pedantic,
    missing_docs
)]
#![cfg_attr(
    not(test),
    deny(
        clippy::dbg_macro,
        clippy::expect_used,
        clippy::panic,
        clippy::print_stderr,
        clippy::print_stdout,
        clippy::todo,
        clippy::unwrap_used
    )
)]

/// Cache port for memoizing backend calls and diff computations.
pub mod cache;
/// Orchestration of a comparison pass between two refs.
pub mod compare;
/// Line-level diffing primitives.
pub mod diff;
/// The session mapping table pairing renamed files across sides.
pub mod mapping;
/// Git repository access: refs, trees, and blob content.
pub mod repository;
/// Session context owning the repository, mappings, and request generation.
pub mod session;

pub use refdiff_api as api;

/// Common result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying git operation failed.
    #[error("git error: {source}")]
    Git {
        /// Original libgit2 error bubbled up by the core library.
        #[from]
        source: git2::Error,
    },
    /// Provided path does not correspond to a git repository.
    #[error("path does not reference a git repository: {path}")]
    NotARepository {
        /// Path that failed to resolve to a repository.
        path: String,
    },
    /// Filesystem interaction failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Filesystem path involved in the failed operation.
        path: String,
        /// Source I/O error returned by the standard library.
        #[source]
        source: std::io::Error,
    },
    /// A selected ref no longer resolves, even after refreshing the ref lists.
    #[error("ref does not resolve to a snapshot: {reference}")]
    RefNotFound {
        /// The ref name that failed to resolve.
        reference: String,
    },
    /// A mapping entry with an empty source or target was rejected.
    #[error("mapping entries require a non-empty source and target")]
    EmptyMappingEntry,
    /// A pattern supplied for bulk mapping generation failed to compile.
    #[error("invalid mapping pattern: {source}")]
    InvalidPattern {
        /// Underlying regex compilation error.
        #[from]
        source: regex::Error,
    },
    /// A rendered entry belongs to a comparison superseded by a newer request.
    #[error("comparison result was superseded by a newer request")]
    StaleComparison,
    /// A render request addressed a summary entry that does not exist.
    #[error("summary entry index out of range: {index}")]
    InvalidSummaryEntry {
        /// Index the caller asked to render.
        index: usize,
    },
    /// Internal invariant failed (e.g., a poisoned session lock).
    #[error("internal error: session state is unusable")]
    Internal,
}
