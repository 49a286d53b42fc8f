use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};

/// Internal state shared via `Arc`.
pub(crate) struct RepoInner {
    pub(crate) repo: Mutex<gix::Repository>,
    pub(crate) path: PathBuf,
}

/// A read-only handle on an existing git repository.
///
/// Cheap to clone (`Arc` internally). A handle is scoped to the request that
/// opened it: nothing in this crate retains one beyond the call chain it was
/// passed into, and no process-wide cache exists behind it.
#[derive(Clone)]
pub struct Repo {
    pub(crate) inner: Arc<RepoInner>,
}

impl Repo {
    /// Open an existing repository at `path` (working copy or bare).
    ///
    /// # Errors
    /// Returns [`Error::NotARepository`] if `path` holds no repository
    /// metadata.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        log::debug!("opening repository at {}", path.display());

        let repo = gix::open(&path)
            .map_err(|_| Error::not_a_repository(path.display().to_string()))?;

        Ok(Repo {
            inner: Arc::new(RepoInner {
                repo: Mutex::new(repo),
                path,
            }),
        })
    }

    /// Open the repository at the current working location (`"."`).
    ///
    /// Equivalent to `Repo::open(".")`; the zero-argument entry points of
    /// the history enumerator are built on this.
    pub fn open_current() -> Result<Self> {
        Self::open(".")
    }

    /// Location this handle was opened at.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Default root of the large-object side store: `<git-dir>/lfs/objects`.
    pub fn lfs_objects_root(&self) -> Result<PathBuf> {
        let repo = self.lock()?;
        Ok(repo.git_dir().join("lfs").join("objects"))
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, gix::Repository>> {
        self.inner
            .repo
            .lock()
            .map_err(|e| Error::git_msg(e.to_string()))
    }
}

impl std::fmt::Debug for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repo").field("path", &self.inner.path).finish()
    }
}
