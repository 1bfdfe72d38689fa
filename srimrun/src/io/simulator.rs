//! Simulator abstraction for launching the SRIM binaries.
//!
//! The [`Simulator`] trait decouples run orchestration from the real
//! Wine-wrapped executables. Tests use scripted simulators that
//! fabricate output files without spawning processes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::error::RunError;
use crate::io::process::{CommandOutput, run_command_with_timeout};

/// File the child's captured stdout/stderr is persisted to, inside the
/// scratch dir.
pub const CHILD_LOG_FILE: &str = "srimrun.log";

/// Parameters for one external simulation launch.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// Scratch directory the process is confined to.
    pub workdir: PathBuf,
    /// Executable name relative to `workdir` (e.g. `TRIM.exe`).
    pub program: String,
    /// Maximum time to wait for the process to finish.
    pub timeout: Duration,
    /// Truncate captured stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

/// Outcome of a completed launch.
///
/// A non-zero exit is informational here: the run finished and its
/// outputs (if any) are in place. [`LaunchReport::ensure_success`]
/// upgrades it to [`RunError::ProcessNonZeroExit`] for callers that
/// treat it as fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub program: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

impl LaunchReport {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out
    }

    pub fn ensure_success(&self) -> Result<(), RunError> {
        if self.success() {
            Ok(())
        } else {
            Err(RunError::ProcessNonZeroExit {
                program: self.program.clone(),
                code: self.exit_code,
            })
        }
    }
}

/// Abstraction over simulation backends.
pub trait Simulator {
    /// Launch the program with its working directory bound to
    /// `request.workdir` and wait for it to finish.
    fn launch(&self, request: &LaunchRequest) -> Result<LaunchReport>;
}

/// Launches the real binaries, through Wine when available.
pub struct WineSimulator;

impl Simulator for WineSimulator {
    #[instrument(skip_all, fields(program = %request.program, workdir = %request.workdir.display()))]
    fn launch(&self, request: &LaunchRequest) -> Result<LaunchReport> {
        info!("launching simulation");
        let relative = Path::new(".").join(&request.program);
        let mut cmd = match wine_binary() {
            Some(wine) => {
                let mut cmd = Command::new(wine);
                cmd.arg(&relative);
                cmd
            }
            None => Command::new(&relative),
        };
        cmd.current_dir(&request.workdir);

        let output =
            run_command_with_timeout(cmd, request.timeout, request.output_limit_bytes)?;
        write_child_log(&request.workdir.join(CHILD_LOG_FILE), &output)?;

        if output.timed_out {
            warn!(
                timeout_secs = request.timeout.as_secs(),
                "simulation timed out"
            );
        } else if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "simulation exited unsuccessfully");
        } else {
            debug!("simulation completed");
        }

        Ok(LaunchReport {
            program: request.program.clone(),
            exit_code: output.status.code(),
            timed_out: output.timed_out,
        })
    }
}

/// `wine` on `PATH`, unless the binaries run natively (Windows).
fn wine_binary() -> Option<PathBuf> {
    if cfg!(windows) {
        return None;
    }
    which::which("wine").ok()
}

fn write_child_log(path: &Path, output: &CommandOutput) -> Result<()> {
    let mut buf = String::new();
    buf.push_str("=== stdout ===\n");
    buf.push_str(&String::from_utf8_lossy(&output.stdout));
    buf.push_str(&output.stdout_truncated_notice());
    buf.push_str("\n=== stderr ===\n");
    buf.push_str(&String::from_utf8_lossy(&output.stderr));
    buf.push_str(&output.stderr_truncated_notice());
    if output.timed_out {
        buf.push_str("\n[simulation timed out]\n");
    }
    fs::write(path, buf).with_context(|| format!("write child log {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedSimulator;

    #[test]
    fn ensure_success_passes_clean_exit() {
        let report = LaunchReport {
            program: "TRIM.exe".to_string(),
            exit_code: Some(0),
            timed_out: false,
        };
        report.ensure_success().expect("clean exit");
    }

    #[test]
    fn ensure_success_flags_non_zero_exit() {
        let report = LaunchReport {
            program: "TRIM.exe".to_string(),
            exit_code: Some(7),
            timed_out: false,
        };
        let err = report.ensure_success().unwrap_err();
        assert!(matches!(
            err,
            RunError::ProcessNonZeroExit { code: Some(7), .. }
        ));
    }

    #[test]
    fn ensure_success_flags_timeout() {
        let report = LaunchReport {
            program: "TRIM.exe".to_string(),
            exit_code: None,
            timed_out: true,
        };
        assert!(report.ensure_success().is_err());
    }

    #[test]
    fn scripted_simulator_writes_into_workdir_only() {
        let workdir = tempfile::tempdir().expect("workdir");
        let simulator = ScriptedSimulator::succeeding();
        let request = LaunchRequest {
            workdir: workdir.path().to_path_buf(),
            program: "TRIM.exe".to_string(),
            timeout: Duration::from_secs(1),
            output_limit_bytes: 1000,
        };

        let report = simulator.launch(&request).expect("launch");
        assert!(report.success());
        assert!(workdir.path().join("RANGE.txt").is_file());
    }
}
