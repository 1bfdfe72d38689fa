//! CLI tests for `srimrun merge` and `srimrun check`.
//!
//! Spawns the srimrun binary and verifies exit codes and produced files.

use std::fs;
use std::path::Path;
use std::process::Command;

use srimrun::exit_codes;
use srimrun::io::config::{HarnessConfig, write_config};

fn write_fragment(arena: &Path, symbol: &str, index: u32, ions: u32) {
    let slot = arena.join(symbol).join(index.to_string());
    fs::create_dir_all(&slot).expect("slot");
    let trim_in = format!(
        "==> SRIM-2013.00 This file controls TRIM Calculations.\n\
         Ion: Z1 ,  M1,  Energy (keV), Angle,Number,Bragg Corr,AutoSave Number.\n\
         \x20    28   58.693   1000   0   {ions}   1   0\n"
    );
    fs::write(slot.join("TRIM.IN"), trim_in).expect("trim.in");

    let mut collision = String::new();
    collision.push_str("==========================  COLLISION HISTORY  ====\n");
    for i in 0..9 {
        collision.push_str(&format!("header {i}\n"));
    }
    for i in 1..=ions {
        collision.push_str(&format!("  For Ion {i:07}  cascade record\n"));
    }
    fs::write(slot.join("COLLISON.txt"), collision).expect("collison");
}

#[test]
fn merge_command_produces_renumbered_log() {
    let temp = tempfile::tempdir().expect("tempdir");
    let arena = temp.path().join("results");
    write_fragment(&arena, "Ni", 0, 2);
    write_fragment(&arena, "Ni", 1, 2);

    let status = Command::new(env!("CARGO_BIN_EXE_srimrun"))
        .arg("merge")
        .arg(&arena)
        .status()
        .expect("srimrun merge");
    assert_eq!(status.code(), Some(exit_codes::OK));

    let merged =
        fs::read_to_string(arena.join("Ni").join("COLLISON.txt")).expect("merged log");
    assert!(merged.contains("For Ion 0000004"));
}

#[test]
fn check_reports_missing_installation() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = HarnessConfig {
        srim_dir: temp.path().join("nowhere"),
        scratch_root: temp.path().join("scratch"),
        ..HarnessConfig::default()
    };
    let config_path = temp.path().join("srimrun.toml");
    write_config(&config_path, &config).expect("write config");

    let status = Command::new(env!("CARGO_BIN_EXE_srimrun"))
        .arg("check")
        .arg("--config")
        .arg(&config_path)
        .status()
        .expect("srimrun check");
    assert_eq!(status.code(), Some(exit_codes::INVALID));
}
