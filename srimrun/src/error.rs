//! Run-level error taxonomy.
//!
//! Every variant is local to the run it occurred in: no failure here
//! implies anything about the scratch directory or state of a
//! concurrently executing run. Orchestration and miscellaneous I/O
//! errors flow through `anyhow` instead; callers that need to branch on
//! a run failure recover the typed variant with `downcast_ref`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    /// The scratch-directory name was already claimed by a live run.
    #[error("scratch directory collision under {root}")]
    DirectoryCollision { root: PathBuf },

    /// A file the external process requires was absent at staging time.
    #[error("missing input file {path}")]
    MissingInputFile { path: PathBuf },

    /// The external process could not be started at all.
    #[error("failed to launch {program}: {source}")]
    ProcessLaunchFailure {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external process ran to completion but with an error status.
    ///
    /// Informational: the run is complete, its outputs (if any) are in
    /// place. [`crate::io::simulator::LaunchReport::ensure_success`]
    /// produces this variant when the caller wants it to be fatal.
    #[error("{program} exited with status {code:?}")]
    ProcessNonZeroExit { program: String, code: Option<i32> },
}
