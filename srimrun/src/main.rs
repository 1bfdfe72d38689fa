//! SRIM/TRIM automation harness CLI.
//!
//! Prepares isolated scratch directories, launches the SRIM binaries
//! (through Wine on non-Windows hosts), harvests their outputs into a
//! results arena, and merges per-fragment collision logs.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use srimrun::apply::{SR_EXE, SR_MODULE_DIR, TRIM_EXE, run_sr, run_trim};
use srimrun::exit_codes;
use srimrun::io::config::{DEFAULT_CONFIG_FILE, HarnessConfig, load_config};
use srimrun::io::job::{load_job, load_sr_job};
use srimrun::io::merge::merge_arena;
use srimrun::io::simulator::WineSimulator;

#[derive(Parser)]
#[command(
    name = "srimrun",
    version,
    about = "SRIM/TRIM automation harness with per-run isolation"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a TRIM job: one isolated external launch per fragment.
    Run {
        /// Job description file (TOML).
        #[arg(long)]
        job: PathBuf,
        /// Harness config file; defaults apply when absent.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Results arena root.
        #[arg(long, default_value = "srim-results")]
        output: PathBuf,
    },
    /// Run a single stopping/range calculation with the SR module.
    Sr {
        /// SR job description file (TOML).
        #[arg(long)]
        job: PathBuf,
        /// Harness config file; defaults apply when absent.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory the stopping table is copied to.
        #[arg(long, default_value = "srim-results")]
        output: PathBuf,
    },
    /// Merge per-fragment collision logs inside a results arena.
    Merge {
        /// Results arena produced by `run`.
        arena: PathBuf,
    },
    /// Check the SRIM installation and Wine availability.
    Check {
        /// Harness config file; defaults apply when absent.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    srimrun::logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            job,
            config,
            output,
        } => cmd_run(&job, config.as_deref(), &output),
        Command::Sr {
            job,
            config,
            output,
        } => cmd_sr(&job, config.as_deref(), &output),
        Command::Merge { arena } => cmd_merge(&arena),
        Command::Check { config } => cmd_check(config.as_deref()),
    }
}

fn load_harness_config(path: Option<&Path>) -> Result<HarnessConfig> {
    load_config(path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE)))
}

fn cmd_run(job: &Path, config: Option<&Path>, output: &Path) -> Result<i32> {
    let config = load_harness_config(config)?;
    let job = load_job(job)?;
    let report = run_trim(&job, &config, output, &WineSimulator)?;

    for (run, outcome) in &report.fragments {
        match outcome {
            Ok(fragment) if fragment.process_succeeded() => {
                println!(
                    "{} #{} ions={} -> {}",
                    run.ion,
                    run.fragment,
                    run.number_ions,
                    fragment.save_dir.display()
                );
            }
            Ok(fragment) => {
                let timeout_note = if fragment.timed_out { ", timed out" } else { "" };
                println!(
                    "{} #{} ions={} failed (exit {:?}{timeout_note}) -> {}",
                    run.ion,
                    run.fragment,
                    run.number_ions,
                    fragment.exit_code,
                    fragment.save_dir.display()
                );
            }
            Err(err) => {
                println!(
                    "{} #{} ions={} error: {:#}",
                    run.ion, run.fragment, run.number_ions, err
                );
            }
        }
    }

    if report.all_succeeded() {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::PARTIAL)
    }
}

fn cmd_sr(job: &Path, config: Option<&Path>, output: &Path) -> Result<i32> {
    let config = load_harness_config(config)?;
    let job = load_sr_job(job)?;
    let dest = run_sr(&job, &config, output, &WineSimulator)?;
    println!("{}", dest.display());
    Ok(exit_codes::OK)
}

fn cmd_merge(arena: &Path) -> Result<i32> {
    let merged = merge_arena(arena)?;
    for ion in &merged {
        println!(
            "{}: {} fragments, {} ions -> {}",
            ion.symbol,
            ion.fragments,
            ion.total_ions,
            ion.output.display()
        );
    }
    Ok(exit_codes::OK)
}

fn cmd_check(config: Option<&Path>) -> Result<i32> {
    let config = load_harness_config(config)?;
    let mut all_present = true;

    all_present &= check_file("TRIM.exe", &config.srim_dir.join(TRIM_EXE));
    all_present &= check_file(
        "SRModule.exe",
        &config.srim_dir.join(SR_MODULE_DIR).join(SR_EXE),
    );

    match which::which("wine") {
        Ok(path) => println!("wine: {}", path.display()),
        Err(_) if cfg!(windows) => println!("wine: not needed on this platform"),
        Err(_) => {
            println!("wine: missing");
            all_present = false;
        }
    }

    Ok(if all_present {
        exit_codes::OK
    } else {
        exit_codes::INVALID
    })
}

fn check_file(label: &str, path: &Path) -> bool {
    if path.is_file() {
        println!("{label}: {}", path.display());
        true
    } else {
        println!("{label}: missing ({})", path.display());
        false
    }
}
