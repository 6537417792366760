//! Repository access built on top of libgit2: ref enumeration, tree listing,
//! and blob retrieval for one named snapshot.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use git2::{
    BranchType, ErrorClass, ErrorCode, ObjectType, Repository as GitRepository, TreeWalkMode,
    TreeWalkResult,
};

use crate::{api::RefLists, Error, Result};

/// Lightweight handle to a local repository clone.
///
/// The handle is read-only: every operation resolves refs and objects without
/// touching the working tree or the index.
pub struct Repository {
    inner: GitRepository,
    root: PathBuf,
}

impl Repository {
    /// Open a repository from the given filesystem path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be canonicalized or does not
    /// resolve to a git repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let original = path.as_ref();
        let canonical = std::fs::canonicalize(original).map_err(|source| Error::Io {
            path: display_path(original),
            source,
        })?;

        let repo = match GitRepository::discover(&canonical) {
            Ok(repo) => repo,
            Err(err)
                if err.class() == ErrorClass::Repository && err.code() == ErrorCode::NotFound =>
            {
                return Err(Error::NotARepository {
                    path: display_path(&canonical),
                })
            }
            Err(err) => return Err(Error::from(err)),
        };

        Ok(Self::from_git(repo))
    }

    /// Open the repository at `path`, cloning it from `url` first when no
    /// clone exists there yet.
    ///
    /// # Errors
    ///
    /// Returns an error when an existing directory does not hold a
    /// repository, or when the clone itself fails.
    pub fn clone_if_absent(url: &str, path: impl AsRef<Path>) -> Result<Self> {
        let target = path.as_ref();
        if target.exists() {
            return Self::open(target);
        }

        tracing::debug!(url, target = %target.display(), "cloning repository");
        let repo = git2::build::RepoBuilder::new().clone(url, target)?;
        Ok(Self::from_git(repo))
    }

    fn from_git(repo: GitRepository) -> Self {
        let root = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();
        Self { inner: repo, root }
    }

    /// Returns the absolute path to the repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerate the refs available for comparison, grouped by namespace.
    ///
    /// Branches are the short names of remote-tracking references; the
    /// symbolic `origin/HEAD` pointer is skipped. Locally-created branches
    /// without a remote counterpart are not listed. Both lists are sorted.
    ///
    /// # Errors
    ///
    /// Propagates libgit2 failures while iterating references or tags.
    pub fn ref_lists(&self) -> Result<RefLists> {
        let mut branches = Vec::new();
        for item in self.inner.branches(Some(BranchType::Remote))? {
            let (branch, _) = item?;
            if branch.get().symbolic_target_bytes().is_some() {
                continue;
            }
            if let Some(name) = branch.name()? {
                branches.push(name.to_owned());
            }
        }

        let mut tags = Vec::new();
        for name in self.inner.tag_names(None)?.iter().flatten() {
            tags.push(name.to_owned());
        }

        branches.sort_unstable();
        tags.sort_unstable();
        Ok(RefLists { branches, tags })
    }

    /// List every blob path reachable from the ref's root tree.
    ///
    /// Directory and submodule entries are excluded; the resulting set is
    /// sorted by construction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RefNotFound`] when `reference` does not resolve, or
    /// any other backend failure encountered while walking the tree.
    pub fn list_files(&self, reference: &str) -> Result<BTreeSet<String>> {
        let tree = self.resolve_tree(reference)?;
        let mut files = BTreeSet::new();
        tree.walk(TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    files.insert(format!("{dir}{name}"));
                }
            }
            TreeWalkResult::Ok
        })?;
        Ok(files)
    }

    /// Fetch the text content of `path` at `reference`.
    ///
    /// Returns `Ok(None)` when the path does not exist at that ref, or when
    /// the object is not representable as text (binary content, invalid
    /// UTF-8, or a non-blob entry). Absence is an expected condition, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RefNotFound`] when `reference` does not resolve, or
    /// a backend error for unreadable objects.
    pub fn blob_content(&self, reference: &str, path: &str) -> Result<Option<String>> {
        let tree = self.resolve_tree(reference)?;
        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(err) if err.code() == ErrorCode::NotFound => return Ok(None),
            Err(err) => return Err(Error::from(err)),
        };

        let object = entry.to_object(&self.inner)?;
        let Some(blob) = object.as_blob() else {
            return Ok(None);
        };
        if blob.is_binary() {
            return Ok(None);
        }
        Ok(std::str::from_utf8(blob.content())
            .ok()
            .map(str::to_owned))
    }

    fn resolve_tree(&self, reference: &str) -> Result<git2::Tree<'_>> {
        let object = match self.inner.revparse_single(reference) {
            Ok(object) => object,
            Err(err)
                if matches!(err.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec) =>
            {
                return Err(Error::RefNotFound {
                    reference: reference.to_owned(),
                })
            }
            Err(err) => return Err(Error::from(err)),
        };
        Ok(object.peel_to_tree()?)
    }
}

fn display_path(path: &Path) -> String {
    path.to_path_buf()
        .into_os_string()
        .to_string_lossy()
        .into_owned()
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
