//! Test-only helpers: fake SRIM installations and scripted simulators.

use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::core::element::Element;
use crate::core::target::{Layer, LayerElement, Phase};
use crate::io::simulator::{LaunchReport, LaunchRequest, Simulator};

/// Lay down a minimal fake SRIM installation in `dir`.
///
/// Contains the files staging cares about (binaries, `.dat` tables,
/// `.ocx` controls, support dirs) plus a `README.txt` that must be left
/// behind.
pub fn fake_srim_install(dir: &Path) {
    fs::write(dir.join("TRIM.exe"), b"MZ fake trim binary").expect("TRIM.exe");
    fs::write(dir.join("SRIM.exe"), b"MZ fake srim binary").expect("SRIM.exe");
    fs::write(dir.join("VERSION.dat"), b"SRIM-2013.00").expect("VERSION.dat");
    fs::write(dir.join("TRIM.ocx"), b"fake control").expect("TRIM.ocx");
    fs::write(dir.join("README.txt"), b"not staged").expect("README.txt");

    let data = dir.join("Data");
    fs::create_dir_all(&data).expect("Data");
    fs::write(data.join("SCOEF.dat"), b"stopping coefficients").expect("SCOEF.dat");

    let restore = dir.join("SRIM Restore");
    fs::create_dir_all(&restore).expect("SRIM Restore");
    fs::write(restore.join("TRIMDEF.sav"), b"defaults").expect("TRIMDEF.sav");

    fs::create_dir_all(dir.join("SRIM Outputs")).expect("SRIM Outputs");

    let sr = dir.join("SR Module");
    fs::create_dir_all(&sr).expect("SR Module");
    fs::write(sr.join("SRModule.exe"), b"MZ fake sr binary").expect("SRModule.exe");
    fs::write(sr.join("VERSION.dat"), b"SR-2013.00").expect("sr VERSION.dat");
}

/// A single-element nickel layer with book values.
pub fn nickel_layer() -> Layer {
    let ni = Element::from_symbol("Ni").expect("nickel");
    Layer {
        name: "Ni".to_string(),
        width_angstrom: 10_000.0,
        density: 8.908,
        phase: Phase::Solid,
        elements: vec![LayerElement {
            element: ni,
            stoich: 1.0,
            displacement_ev: 25.0,
            lattice_ev: 3.0,
            surface_ev: 4.46,
        }],
    }
}

/// Simulator that fabricates output files instead of spawning anything.
pub struct ScriptedSimulator {
    pub exit_code: i32,
    pub outputs: Vec<(String, Vec<u8>)>,
}

impl ScriptedSimulator {
    /// Exit 0 and produce a plausible pair of TRIM outputs.
    pub fn succeeding() -> ScriptedSimulator {
        ScriptedSimulator {
            exit_code: 0,
            outputs: vec![
                ("RANGE.txt".to_string(), b"fake range table\n".to_vec()),
                ("TDATA.txt".to_string(), b"fake tdata\n".to_vec()),
            ],
        }
    }

    /// Exit with `exit_code` and produce nothing.
    pub fn failing(exit_code: i32) -> ScriptedSimulator {
        ScriptedSimulator {
            exit_code,
            outputs: Vec::new(),
        }
    }

    /// Exit 0 and produce exactly `outputs`.
    pub fn with_outputs(outputs: Vec<(String, Vec<u8>)>) -> ScriptedSimulator {
        ScriptedSimulator {
            exit_code: 0,
            outputs,
        }
    }
}

impl Simulator for ScriptedSimulator {
    fn launch(&self, request: &LaunchRequest) -> Result<LaunchReport> {
        for (name, contents) in &self.outputs {
            fs::write(request.workdir.join(name), contents)?;
        }
        Ok(LaunchReport {
            program: request.program.clone(),
            exit_code: Some(self.exit_code),
            timed_out: false,
        })
    }
}
