//! Staging SRIM installation files into a scratch directory.
//!
//! The TRIM binary reads its data tables relative to its working
//! directory, so every run gets a private copy of the files it needs.
//! Staging only ever writes inside the given scratch dir.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::error::RunError;

/// Directories copied wholesale when present in the installation.
const SUPPORT_DIRS: &[&str] = &["SRIM Outputs", "SRIM Restore", "Data"];

/// File extensions the binaries need next to them.
const STAGED_EXTENSIONS: &[&str] = &["exe", "dat", "ocx"];

/// Populate `scratch` with everything `required` needs to run there.
///
/// Copies every `exe`/`dat`/`ocx` file from `srim_dir` plus the support
/// directories. Fails with [`RunError::MissingInputFile`] when the
/// installation lacks the required binary (e.g. `TRIM.exe`); support
/// directories are optional.
pub fn stage_inputs(srim_dir: &Path, scratch: &Path, required: &str) -> Result<()> {
    let required_path = srim_dir.join(required);
    if !required_path.is_file() {
        return Err(RunError::MissingInputFile {
            path: required_path,
        }
        .into());
    }

    let mut staged = 0usize;
    let entries = fs::read_dir(srim_dir)
        .with_context(|| format!("read SRIM directory {}", srim_dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("list {}", srim_dir.display()))?;
        let path = entry.path();
        if path.is_file() && has_staged_extension(&path) {
            let dest = scratch.join(entry.file_name());
            fs::copy(&path, &dest)
                .with_context(|| format!("copy {} to scratch", path.display()))?;
            staged += 1;
        }
    }

    for dir in SUPPORT_DIRS {
        let src = srim_dir.join(dir);
        if src.is_dir() {
            copy_dir_recursive(&src, &scratch.join(dir))?;
        }
    }

    debug!(staged, scratch = %scratch.display(), "staged inputs");
    Ok(())
}

fn has_staged_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            STAGED_EXTENSIONS
                .iter()
                .any(|staged| ext.eq_ignore_ascii_case(staged))
        })
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).with_context(|| format!("create {}", dest.display()))?;
    let entries =
        fs::read_dir(src).with_context(|| format!("read directory {}", src.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("list {}", src.display()))?;
        let path = entry.path();
        let target = dest.join(entry.file_name());
        if path.is_dir() {
            copy_dir_recursive(&path, &target)?;
        } else {
            fs::copy(&path, &target)
                .with_context(|| format!("copy {} to {}", path.display(), target.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fake_srim_install;

    #[test]
    fn stages_binaries_data_and_support_dirs() {
        let install = tempfile::tempdir().expect("install dir");
        let scratch = tempfile::tempdir().expect("scratch dir");
        fake_srim_install(install.path());

        stage_inputs(install.path(), scratch.path(), "TRIM.exe").expect("stage");

        assert!(scratch.path().join("TRIM.exe").is_file());
        assert!(scratch.path().join("VERSION.dat").is_file());
        assert!(scratch.path().join("TRIM.ocx").is_file());
        assert!(scratch.path().join("Data").join("SCOEF.dat").is_file());
        assert!(scratch.path().join("SRIM Restore").is_dir());
        // README.txt has no staged extension and must be left behind.
        assert!(!scratch.path().join("README.txt").exists());
    }

    #[test]
    fn missing_required_binary_is_typed() {
        let install = tempfile::tempdir().expect("install dir");
        let scratch = tempfile::tempdir().expect("scratch dir");

        let err = stage_inputs(install.path(), scratch.path(), "TRIM.exe").unwrap_err();
        match err.downcast_ref::<RunError>() {
            Some(RunError::MissingInputFile { path }) => {
                assert!(path.ends_with("TRIM.exe"));
            }
            other => panic!("expected MissingInputFile, got {other:?}"),
        }
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let install = tempfile::tempdir().expect("install dir");
        let scratch = tempfile::tempdir().expect("scratch dir");
        fake_srim_install(install.path());
        fs::write(install.path().join("LEGACY.DAT"), b"tables").expect("write");

        stage_inputs(install.path(), scratch.path(), "TRIM.exe").expect("stage");
        assert!(scratch.path().join("LEGACY.DAT").is_file());
    }
}
