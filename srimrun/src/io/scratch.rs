//! Scratch-directory allocation: one isolated workspace per run.
//!
//! The scratch root is an arena shared by every concurrent run; the only
//! coordination between runs is the uniqueness of their subdirectory
//! names. No locks: scratch names carry a random token, and numbered
//! save slots are claimed through the atomicity of `create_dir`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;
use tracing::debug;

use crate::error::RunError;

/// Isolated working directory for exactly one run.
///
/// Removed on drop unless [`ScratchDir::keep`] detaches it. Retention is
/// the caller's decision, not the allocator's.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Allocate a fresh uniquely named directory under `root`, creating
    /// `root` first if missing.
    ///
    /// Concurrent callers always observe distinct paths. A collision
    /// that survives the name-retry budget maps to
    /// [`RunError::DirectoryCollision`].
    pub fn allocate(root: &Path) -> Result<ScratchDir> {
        fs::create_dir_all(root)
            .with_context(|| format!("create scratch root {}", root.display()))?;
        let dir = tempfile::Builder::new()
            .prefix("trim-")
            .tempdir_in(root)
            .map_err(|err| collision_or_io(root, err))?;
        debug!(scratch = %dir.path().display(), "allocated scratch dir");
        Ok(ScratchDir { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Detach from RAII cleanup and hand the path to the caller.
    pub fn keep(self) -> PathBuf {
        self.dir.keep()
    }

    /// Remove the directory now, reporting failures.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .with_context(|| format!("remove scratch dir {}", path.display()))
    }
}

fn collision_or_io(root: &Path, err: io::Error) -> anyhow::Error {
    if err.kind() == io::ErrorKind::AlreadyExists {
        RunError::DirectoryCollision {
            root: root.to_path_buf(),
        }
        .into()
    } else {
        anyhow::Error::new(err)
            .context(format!("create scratch dir under {}", root.display()))
    }
}

/// Arena of numbered save slots, one slot per finished run.
#[derive(Debug, Clone)]
pub struct ResultsArena {
    root: PathBuf,
}

impl ResultsArena {
    pub fn new(root: impl Into<PathBuf>) -> ResultsArena {
        ResultsArena { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Claim the lowest free integer-named slot.
    ///
    /// `create_dir` either creates the slot or fails with
    /// `AlreadyExists`, so two callers can never claim the same index.
    pub fn next_slot(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("create results arena {}", self.root.display()))?;
        let mut index: u32 = 0;
        loop {
            let slot = self.root.join(index.to_string());
            match fs::create_dir(&slot) {
                Ok(()) => {
                    debug!(slot = %slot.display(), "claimed save slot");
                    return Ok(slot);
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    index += 1;
                }
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("create save slot {}", slot.display()));
                }
            }
        }
    }
}
