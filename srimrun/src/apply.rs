//! Orchestration: fragmenting jobs into isolated parallel runs.
//!
//! Runs share nothing but the scratch root and the results arena, and
//! both are append-only from a run's perspective. One fragment's
//! failure is recorded in its own outcome and never aborts or disturbs
//! the rest of the batch.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use rand::Rng as _;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::core::fragment::fragments;
use crate::io::config::HarnessConfig;
use crate::io::input_files::{AutoTrim, SrInput, TrimInput};
use crate::io::job::{JobIon, SrJob, TrimJob};
use crate::io::outputs::{RunManifest, collect_outputs, write_manifest};
use crate::io::scratch::{ResultsArena, ScratchDir};
use crate::io::simulator::{LaunchRequest, Simulator};
use crate::io::stage::stage_inputs;

pub const TRIM_EXE: &str = "TRIM.exe";
pub const SR_EXE: &str = "SRModule.exe";
pub const SR_MODULE_DIR: &str = "SR Module";

/// Identity of one fragment within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRun {
    pub ion: String,
    /// Fragment index within the ion's batch (0-based).
    pub fragment: u32,
    pub number_ions: u32,
}

/// Report for one fragment that ran to completion.
#[derive(Debug)]
pub struct FragmentReport {
    pub save_dir: PathBuf,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub duration_ms: u64,
    /// Scratch dir path when the config keeps them around.
    pub scratch_kept: Option<PathBuf>,
}

impl FragmentReport {
    pub fn process_succeeded(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out
    }
}

/// All fragment outcomes of a TRIM batch, in ion order.
#[derive(Debug)]
pub struct BatchReport {
    pub fragments: Vec<(FragmentRun, Result<FragmentReport>)>,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.fragments
            .iter()
            .all(|(_, outcome)| matches!(outcome, Ok(report) if report.process_succeeded()))
    }

    pub fn failed_count(&self) -> usize {
        self.fragments
            .iter()
            .filter(|(_, outcome)| !matches!(outcome, Ok(report) if report.process_succeeded()))
            .count()
    }
}

/// Run a TRIM job: one isolated external launch per fragment, fanned out
/// over a worker pool.
pub fn run_trim<S>(
    job: &TrimJob,
    config: &HarnessConfig,
    output_dir: &Path,
    simulator: &S,
) -> Result<BatchReport>
where
    S: Simulator + Sync,
{
    config.validate()?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .context("build worker pool")?;

    let mut all = Vec::new();
    for job_ion in &job.ions {
        let arena = ResultsArena::new(output_dir.join(job_ion.ion.symbol()));
        let runs: Vec<FragmentRun> = fragments(job.step_size, job_ion.number_ions)
            .enumerate()
            .map(|(index, number_ions)| FragmentRun {
                ion: job_ion.ion.symbol().to_string(),
                fragment: index as u32,
                number_ions,
            })
            .collect();
        info!(
            ion = job_ion.ion.symbol(),
            fragments = runs.len(),
            "running ion batch"
        );

        let outcomes: Vec<(FragmentRun, Result<FragmentReport>)> = pool.install(|| {
            runs.into_par_iter()
                .map(|run| {
                    let outcome =
                        execute_fragment(&run, job_ion, job, config, &arena, simulator);
                    (run, outcome)
                })
                .collect()
        });
        all.extend(outcomes);
    }

    Ok(BatchReport { fragments: all })
}

/// Prepare an isolated scratch dir, launch TRIM in it, and harvest the
/// results into the next free arena slot.
fn execute_fragment<S: Simulator>(
    run: &FragmentRun,
    job_ion: &JobIon,
    job: &TrimJob,
    config: &HarnessConfig,
    arena: &ResultsArena,
    simulator: &S,
) -> Result<FragmentReport> {
    let scratch = ScratchDir::allocate(&config.scratch_root)?;
    stage_inputs(&config.srim_dir, scratch.path(), TRIM_EXE)?;
    AutoTrim.write(scratch.path())?;

    // Fragments draw independent seeds unless the job pins one.
    let seed = job
        .settings
        .random_seed
        .unwrap_or_else(|| rand::rng().random_range(0..=100_000));
    TrimInput {
        ion: &job_ion.ion,
        target: &job.target,
        number_ions: run.number_ions,
        settings: &job.settings,
        seed,
    }
    .write(scratch.path())?;

    let request = LaunchRequest {
        workdir: scratch.path().to_path_buf(),
        program: TRIM_EXE.to_string(),
        timeout: config.launch_timeout(),
        output_limit_bytes: config.output_limit_bytes,
    };
    let started = Instant::now();
    let launch = simulator.launch(&request)?;
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if !launch.success() {
        warn!(
            ion = run.ion.as_str(),
            fragment = run.fragment,
            exit_code = ?launch.exit_code,
            timed_out = launch.timed_out,
            "fragment exited unsuccessfully"
        );
    }

    let save_dir = arena.next_slot()?;
    collect_outputs(scratch.path(), &save_dir)?;
    write_manifest(
        &save_dir,
        &RunManifest {
            ion: run.ion.clone(),
            fragment: run.fragment,
            number_ions: run.number_ions,
            exit_code: launch.exit_code,
            timed_out: launch.timed_out,
            duration_ms,
        },
    )?;

    let scratch_kept = if config.keep_scratch {
        Some(scratch.keep())
    } else {
        scratch.close()?;
        None
    };

    Ok(FragmentReport {
        save_dir,
        exit_code: launch.exit_code,
        timed_out: launch.timed_out,
        duration_ms,
        scratch_kept,
    })
}

/// Run a single stopping/range calculation and return the table's final
/// location under `output_dir`.
pub fn run_sr<S: Simulator>(
    job: &SrJob,
    config: &HarnessConfig,
    output_dir: &Path,
    simulator: &S,
) -> Result<PathBuf> {
    config.validate()?;
    job.settings.validate()?;

    let scratch = ScratchDir::allocate(&config.scratch_root)?;
    stage_inputs(&config.srim_dir.join(SR_MODULE_DIR), scratch.path(), SR_EXE)?;
    SrInput {
        ion: &job.ion,
        layer: &job.layer,
        settings: &job.settings,
    }
    .write(scratch.path())?;

    let request = LaunchRequest {
        workdir: scratch.path().to_path_buf(),
        program: SR_EXE.to_string(),
        timeout: config.launch_timeout(),
        output_limit_bytes: config.output_limit_bytes,
    };
    let report = simulator.launch(&request)?;
    report.ensure_success()?;

    let produced = scratch.path().join(&job.settings.output_filename);
    if !produced.is_file() {
        return Err(anyhow!("missing SR output {}", produced.display()));
    }
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir {}", output_dir.display()))?;
    let dest = output_dir.join(&job.settings.output_filename);
    fs::copy(&produced, &dest)
        .with_context(|| format!("copy {} to {}", produced.display(), dest.display()))?;

    if config.keep_scratch {
        scratch.keep();
    } else {
        scratch.close()?;
    }
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::SrSettings;
    use crate::core::settings::TrimSettings;
    use crate::core::target::Target;
    use crate::error::RunError;
    use crate::io::job::JobIon;
    use crate::io::outputs::load_manifest;
    use crate::test_support::{ScriptedSimulator, fake_srim_install, nickel_layer};

    fn test_config(root: &Path) -> HarnessConfig {
        let srim_dir = root.join("install");
        fs::create_dir_all(&srim_dir).expect("install dir");
        fake_srim_install(&srim_dir);
        HarnessConfig {
            srim_dir,
            scratch_root: root.join("scratch"),
            keep_scratch: false,
            threads: 2,
            launch_timeout_secs: 10,
            output_limit_bytes: 10_000,
        }
    }

    fn test_job(number_ions: u32, step_size: u32) -> TrimJob {
        TrimJob {
            ions: vec![JobIon {
                ion: crate::core::ion::Ion::new("Ni", 3000.0).expect("ion"),
                number_ions,
            }],
            target: Target::new(vec![nickel_layer()]).expect("target"),
            settings: TrimSettings::default(),
            step_size,
        }
    }

    #[test]
    fn batch_produces_one_slot_per_fragment() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = test_config(temp.path());
        let job = test_job(10, 3);
        let output = temp.path().join("results");

        let report =
            run_trim(&job, &config, &output, &ScriptedSimulator::succeeding()).expect("run");

        assert_eq!(report.fragments.len(), 4);
        assert!(report.all_succeeded());
        assert_eq!(report.failed_count(), 0);

        let mut seen_ions = 0;
        for index in 0..4u32 {
            let slot = output.join("Ni").join(index.to_string());
            assert!(slot.join("RANGE.txt").is_file());
            assert!(slot.join("TRIM.IN").is_file());
            let manifest = load_manifest(&slot).expect("manifest");
            assert_eq!(manifest.ion, "Ni");
            seen_ions += manifest.number_ions;
        }
        assert_eq!(seen_ions, 10);
    }

    #[test]
    fn scratch_dirs_are_removed_by_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = test_config(temp.path());
        let job = test_job(4, 2);

        run_trim(
            &job,
            &config,
            &temp.path().join("results"),
            &ScriptedSimulator::succeeding(),
        )
        .expect("run");

        let leftovers = fs::read_dir(&config.scratch_root)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn keep_scratch_retains_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = HarnessConfig {
            keep_scratch: true,
            ..test_config(temp.path())
        };
        let job = test_job(2, 2);

        let report = run_trim(
            &job,
            &config,
            &temp.path().join("results"),
            &ScriptedSimulator::succeeding(),
        )
        .expect("run");

        let (_, outcome) = &report.fragments[0];
        let kept = outcome
            .as_ref()
            .expect("report")
            .scratch_kept
            .as_ref()
            .expect("kept path");
        assert!(kept.is_dir());
        assert!(kept.join("TRIM.IN").is_file());
    }

    #[test]
    fn non_zero_exit_is_reported_not_fatal() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = test_config(temp.path());
        let job = test_job(4, 2);

        let report = run_trim(
            &job,
            &config,
            &temp.path().join("results"),
            &ScriptedSimulator::failing(9),
        )
        .expect("run");

        assert!(!report.all_succeeded());
        assert_eq!(report.failed_count(), 2);
        for (_, outcome) in &report.fragments {
            let fragment = outcome.as_ref().expect("completed run");
            assert_eq!(fragment.exit_code, Some(9));
            // The slot and manifest still land for post-mortem.
            assert!(fragment.save_dir.join("run.json").is_file());
        }
    }

    #[test]
    fn missing_installation_fails_each_fragment_in_isolation() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = HarnessConfig {
            srim_dir: temp.path().join("empty"),
            scratch_root: temp.path().join("scratch"),
            threads: 2,
            launch_timeout_secs: 10,
            output_limit_bytes: 10_000,
            keep_scratch: false,
        };
        fs::create_dir_all(&config.srim_dir).expect("empty dir");
        let job = test_job(4, 2);

        let report = run_trim(
            &job,
            &config,
            &temp.path().join("results"),
            &ScriptedSimulator::succeeding(),
        )
        .expect("run");

        assert_eq!(report.fragments.len(), 2);
        for (_, outcome) in &report.fragments {
            let err = outcome.as_ref().expect_err("staging failure");
            assert!(matches!(
                err.downcast_ref::<RunError>(),
                Some(RunError::MissingInputFile { .. })
            ));
        }
        // No half-populated scratch dirs survive a failed run.
        let leftovers = fs::read_dir(&config.scratch_root)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn sr_run_copies_output_table() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = test_config(temp.path());
        let job = SrJob {
            ion: crate::core::ion::Ion::new("H", 1000.0).expect("ion"),
            layer: nickel_layer(),
            settings: SrSettings::default(),
        };
        let simulator = ScriptedSimulator::with_outputs(vec![(
            "SR_OUTPUT.txt".to_string(),
            b"stopping table\n".to_vec(),
        )]);

        let dest =
            run_sr(&job, &config, &temp.path().join("results"), &simulator).expect("sr run");
        assert!(dest.is_file());
        assert_eq!(fs::read(&dest).expect("read"), b"stopping table\n");
    }

    #[test]
    fn sr_failure_surfaces_exit_status() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = test_config(temp.path());
        let job = SrJob {
            ion: crate::core::ion::Ion::new("H", 1000.0).expect("ion"),
            layer: nickel_layer(),
            settings: SrSettings::default(),
        };

        let err = run_sr(
            &job,
            &config,
            &temp.path().join("results"),
            &ScriptedSimulator::failing(2),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RunError>(),
            Some(RunError::ProcessNonZeroExit { code: Some(2), .. })
        ));
    }
}
