use std::sync::Arc;

use git2::Repository as GitRepository;
use refdiff_core::{
    api::RowKind,
    cache::{BlobKey, CompareCache, MemoryCache},
    session::CompareSession,
    Error,
};
use tempfile::TempDir;

#[test]
fn compare_reports_structure_and_summary() {
    // One inserted line in the common file, one exclusive file per side.
    let temp = TempDir::new().expect("tempdir");
    let repo = init_repository(temp.path());
    commit_files(
        &repo,
        "side1",
        "First side",
        &[("a.txt", "1\n2\n"), ("b.txt", "x\n")],
    );
    commit_files(
        &repo,
        "side2",
        "Second side",
        &[("a.txt", "1\n2\n3\n"), ("c.txt", "y\n")],
    );

    let session = CompareSession::open(temp.path()).expect("open session");
    let comparison = session.compare("side1", "side2").expect("compare");
    let report = &comparison.report;

    assert_eq!(report.first_ref, "side1");
    assert_eq!(report.second_ref, "side2");
    assert_eq!(report.files.only_in_first, ["b.txt".to_string()]);
    assert_eq!(report.files.only_in_second, ["c.txt".to_string()]);
    assert_eq!(report.files.common, ["a.txt".to_string()]);

    assert_eq!(report.summary.len(), 1);
    let entry = &report.summary[0];
    assert_eq!(entry.first_path, "a.txt");
    assert_eq!(entry.second_path, "a.txt");
    assert_eq!(entry.changed_lines, 1);

    let table = session.render_entry(&comparison, 0).expect("render entry");
    assert_eq!(table.first_label, "side1:a.txt");
    assert_eq!(table.second_label, "side2:a.txt");
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.changed_row_count(), entry.changed_lines);
    assert_eq!(table.rows[2].kind, RowKind::Inserted);
    assert_eq!(table.rows[2].second_text.as_deref(), Some("3"));
}

#[test]
fn identical_trees_produce_empty_summary() {
    // Identical content everywhere means nothing to report.
    let temp = TempDir::new().expect("tempdir");
    let repo = init_repository(temp.path());
    let files = [("a.txt", "same\n"), ("docs/guide.md", "also same\n")];
    commit_files(&repo, "side1", "First side", &files);
    commit_files(&repo, "side2", "Second side", &files);

    let session = CompareSession::open(temp.path()).expect("open session");
    let comparison = session.compare("side1", "side2").expect("compare");

    assert!(comparison.report.summary.is_empty());
    assert_eq!(comparison.report.files.common.len(), 2);
}

#[test]
fn mapping_pairs_files_absent_from_common() {
    // A rename mapped by the user is compared although neither name exists
    // on both sides.
    let temp = TempDir::new().expect("tempdir");
    let repo = init_repository(temp.path());
    commit_files(&repo, "side1", "First side", &[("old.py", "a\nb\n")]);
    commit_files(&repo, "side2", "Second side", &[("new.py", "a\nc\n")]);

    let session = CompareSession::open(temp.path()).expect("open session");
    session.add_mapping("old.py", "new.py").expect("add mapping");

    let comparison = session.compare("side1", "side2").expect("compare");
    let report = &comparison.report;

    assert!(report.files.common.is_empty());
    assert_eq!(report.summary.len(), 1);
    assert_eq!(report.summary[0].first_path, "old.py");
    assert_eq!(report.summary[0].second_path, "new.py");
    assert!(report.summary[0].changed_lines > 0);
    assert_eq!(report.mappings.len(), 1);
}

#[test]
fn absent_and_empty_sides_are_dropped_silently() {
    let temp = TempDir::new().expect("tempdir");
    let repo = init_repository(temp.path());
    commit_files(
        &repo,
        "side1",
        "First side",
        &[("shared.txt", "same\n"), ("empty.txt", "")],
    );
    commit_files(
        &repo,
        "side2",
        "Second side",
        &[("shared.txt", "same\n"), ("empty.txt", "data\n")],
    );

    let session = CompareSession::open(temp.path()).expect("open session");
    // Stale mapping whose source never existed on side1.
    session
        .add_mapping("ghost.py", "shared.txt")
        .expect("add mapping");

    let comparison = session.compare("side1", "side2").expect("compare");

    // The ghost mapping and the empty-content pair are both excluded; the
    // identical shared file never qualifies.
    assert!(comparison.report.summary.is_empty());
}

#[test]
fn superseded_comparison_cannot_be_rendered() {
    let temp = TempDir::new().expect("tempdir");
    let repo = init_repository(temp.path());
    commit_files(&repo, "side1", "First side", &[("a.txt", "1\n")]);
    commit_files(&repo, "side2", "Second side", &[("a.txt", "2\n")]);

    let session = CompareSession::open(temp.path()).expect("open session");
    let stale = session.compare("side1", "side2").expect("compare");

    // A mapping edit supersedes the earlier result.
    session.add_mapping("x.txt", "y.txt").expect("add mapping");
    let err = session.render_entry(&stale, 0);
    assert!(matches!(err, Err(Error::StaleComparison)));

    // A fresh comparison renders fine again.
    let fresh = session.compare("side1", "side2").expect("compare again");
    let table = session.render_entry(&fresh, 0).expect("render entry");
    assert_eq!(table.changed_row_count(), 1);

    // An index past the summary is a caller error, not supersession.
    let err = session.render_entry(&fresh, 99);
    assert!(matches!(
        err,
        Err(Error::InvalidSummaryEntry { index: 99 })
    ));
}

#[test]
fn memory_cache_memoizes_without_changing_results() {
    let temp = TempDir::new().expect("tempdir");
    let repo = init_repository(temp.path());
    commit_files(&repo, "side1", "First side", &[("a.txt", "1\n2\n")]);
    commit_files(&repo, "side2", "Second side", &[("a.txt", "1\n2\n3\n")]);

    let cache = Arc::new(MemoryCache::new());
    let session = CompareSession::open_with_cache(
        temp.path(),
        Arc::clone(&cache) as Arc<dyn CompareCache>,
    )
    .expect("open session");

    let first = session.compare("side1", "side2").expect("first compare");
    assert_eq!(
        cache.get_blob(&BlobKey::new("side1", "a.txt")),
        Some(Some("1\n2\n".to_owned()))
    );
    assert_eq!(cache.get_change_count("1\n2\n", "1\n2\n3\n"), Some(1));

    let second = session.compare("side1", "side2").expect("second compare");
    assert_eq!(first.report, second.report);
}

#[test]
fn reset_mappings_restores_identity_pairing() {
    let temp = TempDir::new().expect("tempdir");
    let repo = init_repository(temp.path());
    commit_files(&repo, "side1", "First side", &[("a.txt", "1\n")]);
    commit_files(&repo, "side2", "Second side", &[("a.txt", "2\n")]);

    let session = CompareSession::open(temp.path()).expect("open session");
    // Redirect the only common file at a path that does not exist.
    session.add_mapping("a.txt", "missing.txt").expect("add mapping");
    let comparison = session.compare("side1", "side2").expect("compare");
    assert!(comparison.report.summary.is_empty());

    session.reset_mappings().expect("reset mappings");
    assert!(session.mappings().expect("mappings").is_empty());

    let comparison = session.compare("side1", "side2").expect("compare again");
    assert_eq!(comparison.report.summary.len(), 1);
}

#[test]
fn pattern_mappings_are_derived_from_a_ref() {
    let temp = TempDir::new().expect("tempdir");
    let repo = init_repository(temp.path());
    commit_files(
        &repo,
        "side1",
        "First side",
        &[("mod_a.py", "a\n"), ("README.md", "r\n")],
    );
    commit_files(
        &repo,
        "side2",
        "Second side",
        &[("mod_a.rs", "b\n"), ("README.md", "r\n")],
    );

    let session = CompareSession::open(temp.path()).expect("open session");
    let added = session
        .add_pattern_mappings("side1", r"\.py$", ".rs")
        .expect("pattern mappings");
    assert_eq!(added, 1);

    let comparison = session.compare("side1", "side2").expect("compare");
    assert_eq!(comparison.report.summary.len(), 1);
    assert_eq!(comparison.report.summary[0].first_path, "mod_a.py");
    assert_eq!(comparison.report.summary[0].second_path, "mod_a.rs");
}

fn init_repository(path: &std::path::Path) -> GitRepository {
    let mut opts = git2::RepositoryInitOptions::new();
    opts.initial_head("main");
    GitRepository::init_opts(path, &opts).expect("init repo")
}

fn commit_files(repo: &GitRepository, branch: &str, message: &str, files: &[(&str, &str)]) {
    let mut index = git2::Index::new().expect("in-memory index");
    // `add_frombuffer` needs the index to be backed by a repository so the
    // staged blobs can be written to its object database.
    repo.set_index(&mut index).expect("bind index to repo");
    for (path, contents) in files {
        let entry = git2::IndexEntry {
            ctime: git2::IndexTime::new(0, 0),
            mtime: git2::IndexTime::new(0, 0),
            dev: 0,
            ino: 0,
            mode: 0o100_644,
            uid: 0,
            gid: 0,
            file_size: u32::try_from(contents.len()).expect("blob size"),
            id: git2::Oid::zero(),
            flags: 0,
            flags_extended: 0,
            path: path.as_bytes().to_vec(),
        };
        index
            .add_frombuffer(&entry, contents.as_bytes())
            .expect("stage blob");
    }

    let tree_id = index.write_tree_to(repo).expect("write tree");
    let tree = repo.find_tree(tree_id).expect("find tree");
    let signature = git2::Signature::now("Test User", "test@example.com").expect("signature");

    repo.commit(
        Some(&format!("refs/heads/{branch}")),
        &signature,
        &signature,
        message,
        &tree,
        &[],
    )
    .expect("commit");
}
