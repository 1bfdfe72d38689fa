//! Harvesting known SRIM output files from a finished scratch dir.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Every file TRIM is known to produce, depending on the diskfile flags.
pub const KNOWN_OUTPUT_FILES: &[&str] = &[
    "TRIM.IN",
    "PHONON.txt",
    "E2RECOIL.txt",
    "IONIZ.txt",
    "LATERAL.txt",
    "NOVAC.txt",
    "RANGE.txt",
    "VACANCY.txt",
    "COLLISON.txt",
    "BACKSCAT.txt",
    "SPUTTER.txt",
    "RANGE_3D.txt",
    "TRANSMIT.txt",
    "TRIMOUT.txt",
    "TDATA.txt",
];

/// Subdirectory TRIM tucks some outputs into, depending on its version.
const OUTPUTS_SUBDIR: &str = "SRIM Outputs";

/// Name of the per-run metadata file written into each save slot.
pub const MANIFEST_FILE: &str = "run.json";

/// Copy every known output present in `scratch` into `dest`.
///
/// Files at the scratch root are copied; files TRIM tucked into
/// `SRIM Outputs` are moved out of it. Absent files are skipped. Returns
/// the destination paths of everything harvested.
pub fn collect_outputs(scratch: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    if !dest.is_dir() {
        return Err(anyhow!("destination {} is not a directory", dest.display()));
    }

    let mut collected = Vec::new();
    for name in KNOWN_OUTPUT_FILES {
        let at_root = scratch.join(name);
        let in_subdir = scratch.join(OUTPUTS_SUBDIR).join(name);
        let target = dest.join(name);

        if at_root.is_file() {
            fs::copy(&at_root, &target)
                .with_context(|| format!("copy {} to {}", at_root.display(), target.display()))?;
            collected.push(target);
        } else if in_subdir.is_file() {
            // Move: copy + remove survives the scratch root and the
            // results arena living on different filesystems.
            fs::copy(&in_subdir, &target).with_context(|| {
                format!("copy {} to {}", in_subdir.display(), target.display())
            })?;
            fs::remove_file(&in_subdir)
                .with_context(|| format!("remove {}", in_subdir.display()))?;
            collected.push(target);
        }
    }

    debug!(files = collected.len(), dest = %dest.display(), "collected outputs");
    Ok(collected)
}

/// Per-run metadata written next to the harvested files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunManifest {
    /// Ion symbol this fragment belongs to.
    pub ion: String,
    /// Fragment index within the ion's batch (0-based).
    pub fragment: u32,
    /// Ion count simulated by this fragment.
    pub number_ions: u32,
    /// Exit code of the external process, if it exited normally.
    pub exit_code: Option<i32>,
    /// Whether the launch hit its wall-clock budget and was killed.
    pub timed_out: bool,
    /// Wall-clock duration of the launch in milliseconds.
    pub duration_ms: u64,
}

/// Write the manifest as pretty JSON with a trailing newline.
pub fn write_manifest(dir: &Path, manifest: &RunManifest) -> Result<()> {
    let path = dir.join(MANIFEST_FILE);
    let mut buf = serde_json::to_string_pretty(manifest).context("serialize manifest")?;
    buf.push('\n');
    fs::write(&path, buf).with_context(|| format!("write {}", path.display()))
}

pub fn load_manifest(dir: &Path) -> Result<RunManifest> {
    let path = dir.join(MANIFEST_FILE);
    let contents =
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_from_root_and_subdir() {
        let scratch = tempfile::tempdir().expect("scratch");
        let dest = tempfile::tempdir().expect("dest");
        fs::write(scratch.path().join("RANGE.txt"), b"root file").expect("write");
        let subdir = scratch.path().join(OUTPUTS_SUBDIR);
        fs::create_dir_all(&subdir).expect("subdir");
        fs::write(subdir.join("TDATA.txt"), b"tucked away").expect("write");

        let collected = collect_outputs(scratch.path(), dest.path()).expect("collect");

        assert_eq!(collected.len(), 2);
        assert!(dest.path().join("RANGE.txt").is_file());
        assert!(dest.path().join("TDATA.txt").is_file());
        // The root copy stays, the subdir original is moved out.
        assert!(scratch.path().join("RANGE.txt").is_file());
        assert!(!subdir.join("TDATA.txt").exists());
    }

    #[test]
    fn unknown_files_are_ignored() {
        let scratch = tempfile::tempdir().expect("scratch");
        let dest = tempfile::tempdir().expect("dest");
        fs::write(scratch.path().join("NOTES.txt"), b"scratch notes").expect("write");

        let collected = collect_outputs(scratch.path(), dest.path()).expect("collect");
        assert!(collected.is_empty());
        assert!(!dest.path().join("NOTES.txt").exists());
    }

    #[test]
    fn missing_destination_is_an_error() {
        let scratch = tempfile::tempdir().expect("scratch");
        let dest = scratch.path().join("nope");
        assert!(collect_outputs(scratch.path(), &dest).is_err());
    }

    #[test]
    fn manifest_round_trips() {
        let dir = tempfile::tempdir().expect("dir");
        let manifest = RunManifest {
            ion: "Ni".to_string(),
            fragment: 3,
            number_ions: 2500,
            exit_code: Some(0),
            timed_out: false,
            duration_ms: 1234,
        };
        write_manifest(dir.path(), &manifest).expect("write");
        let loaded = load_manifest(dir.path()).expect("load");
        assert_eq!(loaded, manifest);
    }
}
