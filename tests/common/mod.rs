//! Shared fixtures: build small repositories by writing objects directly.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gix::objs::tree::{Entry, EntryKind, EntryMode};
use gix::refs::transaction::PreviousValue;

pub struct Fixture {
    pub repo: gix::Repository,
    pub path: PathBuf,
}

/// Create an empty working-copy repository under `dir`.
///
/// A committer identity is written into the repository config so ref
/// updates can create reflog entries on machines with no global git
/// identity; the repository is reopened to pick it up.
pub fn init_repo(dir: &Path) -> Fixture {
    let path = dir.join("repo");
    let repo = gix::init(&path).unwrap();

    let config = repo.git_dir().join("config");
    let mut text = std::fs::read_to_string(&config).unwrap();
    text.push_str("[user]\n\tname = Test Author\n\temail = test@example.com\n");
    std::fs::write(&config, text).unwrap();

    let repo = gix::open(&path).unwrap();
    Fixture { repo, path }
}

fn signature(time: i64) -> gix::actor::Signature {
    gix::actor::Signature {
        name: "Test Author".into(),
        email: "test@example.com".into(),
        time: gix::date::Time::new(time, 0),
    }
}

/// Write a (possibly nested) tree from `(path, content)` pairs.
pub fn write_tree(repo: &gix::Repository, files: &[(&str, &[u8])]) -> gix::ObjectId {
    let mut blobs: BTreeMap<String, gix::ObjectId> = BTreeMap::new();
    let mut dirs: BTreeMap<String, Vec<(&str, &[u8])>> = BTreeMap::new();

    for (path, data) in files {
        match path.split_once('/') {
            None => {
                let oid = repo.write_blob(data).unwrap().detach();
                blobs.insert(path.to_string(), oid);
            }
            Some((dir, rest)) => {
                dirs.entry(dir.to_string()).or_default().push((rest, data));
            }
        }
    }

    let mut entries = Vec::new();
    for (name, oid) in &blobs {
        entries.push(Entry {
            mode: EntryMode::from(EntryKind::Blob),
            filename: name.as_str().into(),
            oid: *oid,
        });
    }
    for (name, sub) in &dirs {
        entries.push(Entry {
            mode: EntryMode::from(EntryKind::Tree),
            filename: name.as_str().into(),
            oid: write_tree(repo, sub),
        });
    }
    entries.sort();

    repo.write_object(&gix::objs::Tree { entries }).unwrap().detach()
}

/// Write one commit whose tree holds exactly `files`.
pub fn commit(
    fx: &Fixture,
    files: &[(&str, &[u8])],
    parents: &[gix::ObjectId],
    message: &str,
    time: i64,
) -> gix::ObjectId {
    let tree = write_tree(&fx.repo, files);
    let sig = signature(time);
    let commit = gix::objs::Commit {
        tree,
        parents: parents.to_vec().into(),
        author: sig.clone(),
        committer: sig,
        encoding: None,
        message: message.into(),
        extra_headers: vec![],
    };
    fx.repo.write_object(&commit).unwrap().detach()
}

pub fn branch(fx: &Fixture, name: &str, oid: gix::ObjectId) {
    let refname = format!("refs/heads/{}", name);
    fx.repo
        .reference(refname.as_str(), oid, PreviousValue::Any, "fixture")
        .unwrap();
}

/// Lightweight tag pointing straight at `oid`.
pub fn tag(fx: &Fixture, name: &str, oid: gix::ObjectId) {
    let refname = format!("refs/tags/{}", name);
    fx.repo
        .reference(refname.as_str(), oid, PreviousValue::Any, "fixture")
        .unwrap();
}

/// Annotated tag object pointing at a commit, with a ref on top.
pub fn annotated_tag(fx: &Fixture, name: &str, target: gix::ObjectId, time: i64) -> gix::ObjectId {
    let tag_obj = gix::objs::Tag {
        target,
        target_kind: gix::object::Kind::Commit,
        name: name.into(),
        tagger: Some(signature(time)),
        message: format!("tag {}", name).into(),
        pgp_signature: None,
    };
    let oid = fx.repo.write_object(&tag_obj).unwrap().detach();
    let refname = format!("refs/tags/{}", name);
    fx.repo
        .reference(refname.as_str(), oid, PreviousValue::Any, "fixture")
        .unwrap();
    oid
}

/// Point HEAD at `refs/heads/<branch>` symbolically.
pub fn set_head(fx: &Fixture, branch: &str) {
    use gix::refs::transaction::{Change, LogChange, RefEdit, RefLog};
    use gix::refs::{FullName, Target};

    let refname = format!("refs/heads/{}", branch);
    let edit = RefEdit {
        change: Change::Update {
            log: LogChange {
                mode: RefLog::AndReference,
                force_create_reflog: false,
                message: format!("fixture: point to {}", branch).into(),
            },
            expected: PreviousValue::Any,
            new: Target::Symbolic(FullName::try_from(refname).unwrap()),
        },
        name: FullName::try_from("HEAD".to_string()).unwrap(),
        deref: false,
    };
    fx.repo.edit_reference(edit).unwrap();
}

/// A repository with two commits on `main`:
///
/// * first:  `hello.txt` = "hello\n", `dir/a.txt` = "aaa\n"
/// * second: `hello.txt` = "hello\nworld\n", `dir/a.txt` unchanged,
///   `dir/b.txt` = "bbb\n" added
///
/// Returns the fixture plus `(first, second)` commit ids.
pub fn two_commit_repo(dir: &Path) -> (Fixture, gix::ObjectId, gix::ObjectId) {
    let fx = init_repo(dir);
    let c1 = commit(
        &fx,
        &[("hello.txt", b"hello\n"), ("dir/a.txt", b"aaa\n")],
        &[],
        "first",
        1_000,
    );
    let c2 = commit(
        &fx,
        &[
            ("hello.txt", b"hello\nworld\n"),
            ("dir/a.txt", b"aaa\n"),
            ("dir/b.txt", b"bbb\n"),
        ],
        &[c1],
        "second",
        2_000,
    );
    branch(&fx, "main", c2);
    set_head(&fx, "main");
    (fx, c1, c2)
}

/// Store `content` in a sharded payload store under `root`; returns the
/// sha256 hex digest.
pub fn write_payload(root: &Path, content: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let digest = hex::encode(Sha256::digest(content));
    let dir = root.join(&digest[0..2]).join(&digest[2..4]);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(&digest), content).unwrap();
    digest
}

/// Canonical pointer text for a sha256 payload.
pub fn pointer_text(digest: &str, size: u64) -> String {
    format!(
        "version https://git-lfs.github.com/spec/v1\noid sha256:{}\nsize {}\n",
        digest, size,
    )
}
