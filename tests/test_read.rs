mod common;

use std::io::Read;

use revfs::*;

// ---------------------------------------------------------------------------
// uri parsing against a real repository
// ---------------------------------------------------------------------------

#[test]
fn parse_splits_repo_and_path() {
    let dir = tempfile::tempdir().unwrap();
    let (fx, _, _) = common::two_commit_repo(dir.path());

    let uri = format!("git://{}/dir/a.txt@main", fx.path.display());
    let vp = VirtualPath::parse(&uri).unwrap();
    assert_eq!(vp.repo, fx.path);
    assert_eq!(vp.path, "dir/a.txt");
    assert_eq!(vp.revision.as_deref(), Some("main"));
}

#[test]
fn parse_without_revision_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (fx, _, _) = common::two_commit_repo(dir.path());

    let uri = format!("git://{}/hello.txt", fx.path.display());
    let vp = VirtualPath::parse(&uri).unwrap();
    assert_eq!(vp.revision, None);
    assert_eq!(vp.revision_or_default(), "");
}

#[test]
fn parse_repo_root_only() {
    let dir = tempfile::tempdir().unwrap();
    let (fx, _, _) = common::two_commit_repo(dir.path());

    let uri = format!("git://{}@main", fx.path.display());
    let vp = VirtualPath::parse(&uri).unwrap();
    assert_eq!(vp.repo, fx.path);
    assert_eq!(vp.path, "");
}

#[test]
fn parse_roundtrips_to_uri() {
    let dir = tempfile::tempdir().unwrap();
    let (fx, _, _) = common::two_commit_repo(dir.path());

    let uri = format!("git://{}/dir/a.txt@main", fx.path.display());
    let vp = VirtualPath::parse(&uri).unwrap();
    assert_eq!(vp.to_uri(), uri);
}

// ---------------------------------------------------------------------------
// blob lookup and reading
// ---------------------------------------------------------------------------

#[test]
fn read_file_at_revision() {
    let dir = tempfile::tempdir().unwrap();
    let (fx, c1, c2) = common::two_commit_repo(dir.path());
    let repo = Repo::open(&fx.path).unwrap();

    let h1 = tree::lookup(&repo, c1, "hello.txt").unwrap();
    assert_eq!(tree::read_bytes(&repo, &h1).unwrap(), b"hello\n");

    let h2 = tree::lookup(&repo, c2, "hello.txt").unwrap();
    assert_eq!(tree::read_bytes(&repo, &h2).unwrap(), b"hello\nworld\n");
}

#[test]
fn read_nested_file() {
    let dir = tempfile::tempdir().unwrap();
    let (fx, _, c2) = common::two_commit_repo(dir.path());
    let repo = Repo::open(&fx.path).unwrap();

    let handle = tree::lookup(&repo, c2, "dir/b.txt").unwrap();
    assert_eq!(handle.len, 4);
    assert_eq!(handle.kind(), Some(EntryKind::Blob));
    assert!(!handle.is_pointer);
    assert_eq!(tree::read_bytes(&repo, &handle).unwrap(), b"bbb\n");
}

#[test]
fn equal_content_yields_equal_handles() {
    let dir = tempfile::tempdir().unwrap();
    let (fx, c1, c2) = common::two_commit_repo(dir.path());
    let repo = Repo::open(&fx.path).unwrap();

    // dir/a.txt is unchanged between the two commits.
    let h1 = tree::lookup(&repo, c1, "dir/a.txt").unwrap();
    let h2 = tree::lookup(&repo, c2, "dir/a.txt").unwrap();
    assert_eq!(h1.id, h2.id);
}

#[test]
fn reader_streams_blob_content() {
    let dir = tempfile::tempdir().unwrap();
    let (fx, _, c2) = common::two_commit_repo(dir.path());
    let repo = Repo::open(&fx.path).unwrap();

    let handle = tree::lookup(&repo, c2, "hello.txt").unwrap();
    let mut reader = tree::reader(&repo, &handle).unwrap();
    let mut buf = [0u8; 6];
    reader.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"hello\n");
    let mut rest = String::new();
    reader.read_to_string(&mut rest).unwrap();
    assert_eq!(rest, "world\n");
}

// ---------------------------------------------------------------------------
// lookup failure modes
// ---------------------------------------------------------------------------

#[test]
fn missing_path_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (fx, _, c2) = common::two_commit_repo(dir.path());
    let repo = Repo::open(&fx.path).unwrap();

    let err = tree::lookup(&repo, c2, "dir/nope.txt").unwrap_err();
    assert!(matches!(err, Error::PathNotFound(_)));
}

#[test]
fn directory_as_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (fx, _, c2) = common::two_commit_repo(dir.path());
    let repo = Repo::open(&fx.path).unwrap();

    let err = tree::lookup(&repo, c2, "dir").unwrap_err();
    assert!(matches!(err, Error::NotAFile(_)));
}

#[test]
fn file_as_intermediate_segment_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (fx, _, c2) = common::two_commit_repo(dir.path());
    let repo = Repo::open(&fx.path).unwrap();

    let err = tree::lookup(&repo, c2, "hello.txt/inner").unwrap_err();
    assert!(matches!(err, Error::NotADirectory(_)));
}

#[test]
fn root_path_is_not_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let (fx, _, c2) = common::two_commit_repo(dir.path());
    let repo = Repo::open(&fx.path).unwrap();

    let err = tree::lookup(&repo, c2, "").unwrap_err();
    assert!(matches!(err, Error::NotAFile(_)));
}

// ---------------------------------------------------------------------------
// listings
// ---------------------------------------------------------------------------

#[test]
fn list_root_entries() {
    let dir = tempfile::tempdir().unwrap();
    let (fx, _, c2) = common::two_commit_repo(dir.path());
    let repo = Repo::open(&fx.path).unwrap();

    let entries = tree::list_root(&repo, c2).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["dir", "hello.txt"]);
    assert_eq!(entries[0].kind(), Some(EntryKind::Tree));
    assert_eq!(entries[1].kind(), Some(EntryKind::Blob));
    // Raw modes survive the round through the object store.
    assert_eq!(entries[0].mode, MODE_TREE);
    assert_eq!(entries[1].mode, MODE_BLOB);
}

#[test]
fn list_nested_tree() {
    let dir = tempfile::tempdir().unwrap();
    let (fx, _, c2) = common::two_commit_repo(dir.path());
    let repo = Repo::open(&fx.path).unwrap();

    let entries = tree::list_tree(&repo, c2, "dir").unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
}

// ---------------------------------------------------------------------------
// large-object pointers through the store
// ---------------------------------------------------------------------------

#[test]
fn pointer_blob_resolves_to_payload() {
    let dir = tempfile::tempdir().unwrap();
    let fx = common::init_repo(dir.path());

    let payload = b"the real large content".to_vec();
    let lfs_root = dir.path().join("lfs-objects");
    let digest = common::write_payload(&lfs_root, &payload);
    let pointer = common::pointer_text(&digest, payload.len() as u64);

    let c1 = common::commit(&fx, &[("big.bin", pointer.as_bytes())], &[], "add big", 1_000);
    common::branch(&fx, "main", c1);
    common::set_head(&fx, "main");
    let repo = Repo::open(&fx.path).unwrap();

    let handle = tree::lookup(&repo, c1, "big.bin").unwrap();
    assert!(handle.is_pointer);

    let bytes = tree::read_bytes(&repo, &handle).unwrap();
    let resolved = lfs::maybe_resolve(&lfs_root, bytes, true).unwrap();
    assert_eq!(resolved.into_bytes(), payload);
}

#[test]
fn pointer_without_payload_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let fx = common::init_repo(dir.path());

    let digest = "a".repeat(64);
    let pointer = common::pointer_text(&digest, 10);
    let c1 = common::commit(&fx, &[("big.bin", pointer.as_bytes())], &[], "add big", 1_000);
    common::branch(&fx, "main", c1);
    common::set_head(&fx, "main");
    let repo = Repo::open(&fx.path).unwrap();

    let handle = tree::lookup(&repo, c1, "big.bin").unwrap();
    let bytes = tree::read_bytes(&repo, &handle).unwrap();
    let err = lfs::maybe_resolve(&dir.path().join("lfs-objects"), bytes, false).unwrap_err();
    assert!(matches!(err, Error::PayloadMissing(_)));
}
