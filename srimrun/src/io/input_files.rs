//! Writers for the fixed-format SRIM input files.
//!
//! The formats are line-oriented with commentary headers the binaries
//! skip over. One detail is load-bearing beyond TRIM itself: the ion
//! line (third line of `TRIM.IN`) carries the fragment's ion count as
//! its third-from-last token, and the merge scanner reads it back from
//! there.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::ion::Ion;
use crate::core::settings::{SrSettings, TrimSettings};
use crate::core::target::{Layer, Target};

pub const TRIM_INPUT_FILE: &str = "TRIM.IN";
pub const AUTO_TRIM_FILE: &str = "TRIMAUTO";
pub const SR_INPUT_FILE: &str = "SR.IN";

/// Renders `TRIM.IN` for one fragment.
#[derive(Debug)]
pub struct TrimInput<'a> {
    pub ion: &'a Ion,
    pub target: &'a Target,
    pub number_ions: u32,
    pub settings: &'a TrimSettings,
    /// Seed resolved by the caller (fragments draw their own when the
    /// job does not pin one).
    pub seed: u32,
}

impl TrimInput<'_> {
    pub fn render(&self) -> String {
        let settings = self.settings;
        let atoms = self.target.atoms();
        let mut out = String::new();

        out.push_str("==> SRIM-2013.00 This file controls TRIM Calculations.\n");
        out.push_str("Ion: Z1 ,  M1,  Energy (keV), Angle,Number,Bragg Corr,AutoSave Number.\n");
        let _ = writeln!(
            out,
            "     {}   {}   {}   {}   {}   {}   {}",
            self.ion.element.z,
            self.ion.element.mass,
            self.ion.energy_kev,
            settings.angle_ions,
            self.number_ions,
            settings.bragg_correction,
            settings.autosave,
        );
        out.push_str(
            "Cascades(1=No;2=Full;3=Sputt;4-5=Ions;6-7=Neutrons), Random Number Seed, Reminders\n",
        );
        let _ = writeln!(
            out,
            "     {}   {}   {}",
            settings.calculation, self.seed, settings.reminders
        );
        out.push_str(
            "Diskfiles (0=no,1=yes): Ranges, Backscatt, Transmit, Sputtered, Collisions(1=Ion;2=Ion+Recoils), Special EXYZ.txt file\n",
        );
        let _ = writeln!(
            out,
            "     {}   {}   {}   {}   {}   {}",
            settings.ranges,
            settings.backscattered,
            settings.transmit,
            settings.sputtered,
            settings.collisions,
            settings.exyz,
        );
        out.push_str("Target material : Number of Elements & Layers\n");
        let _ = writeln!(
            out,
            "\"{}\" {} {}",
            settings.description,
            atoms.len(),
            self.target.layers.len()
        );
        out.push_str(
            "PlotType (0-5); Plot Depths: Xmin, Xmax(Ang.) [=0 0 for Viewing Full Target]\n",
        );
        let _ = writeln!(
            out,
            "     {}   {}   {}",
            settings.plot_mode, settings.plot_xmin, settings.plot_xmax
        );

        out.push_str("Target Elements:    Z   Mass(amu)\n");
        for (index, atom) in atoms.iter().enumerate() {
            let _ = writeln!(
                out,
                "Atom {} = {} =       {}   {}",
                index + 1,
                atom.element.symbol,
                atom.element.z,
                atom.element.mass
            );
        }

        out.push_str("Layer   Layer Name /               Width Density");
        for atom in &atoms {
            let _ = write!(out, "    {}({})", atom.element.symbol, atom.element.z);
        }
        out.push('\n');
        out.push_str("Numb.   Description                (Ang) (g/cm3)    Stoich\n");
        for (index, layer) in self.target.layers.iter().enumerate() {
            let _ = write!(
                out,
                " {}      \"{}\"           {}   {}",
                index + 1,
                layer.name,
                layer.width_angstrom,
                layer.density
            );
            for atom in &atoms {
                let _ = write!(out, "    {}", layer.stoich_of(atom.element));
            }
            out.push('\n');
        }

        out.push_str("0  Target layer phases (0=Solid, 1=Gas)\n");
        let phases: Vec<String> = self
            .target
            .layers
            .iter()
            .map(|layer| layer.phase.flag().to_string())
            .collect();
        let _ = writeln!(out, "{}", phases.join(" "));

        out.push_str("Target Compound Corrections (Bragg)\n");
        let corrections: Vec<String> = self
            .target
            .layers
            .iter()
            .map(|_| settings.bragg_correction.to_string())
            .collect();
        let _ = writeln!(out, " {}", corrections.join(" "));

        push_atom_energies(&mut out, "displacement", &atoms, |atom| atom.displacement_ev);
        push_atom_energies(&mut out, "lattice binding", &atoms, |atom| atom.lattice_ev);
        push_atom_energies(&mut out, "surface binding", &atoms, |atom| atom.surface_ev);

        out.push_str("Stopping Power Version (1=2011, 0=2011)\n");
        let _ = writeln!(out, " {}", settings.version);

        out
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        let path = dir.join(TRIM_INPUT_FILE);
        fs::write(&path, self.render())
            .with_context(|| format!("write {}", path.display()))
    }
}

fn push_atom_energies<F>(
    out: &mut String,
    what: &str,
    atoms: &[crate::core::target::LayerElement],
    value: F,
) where
    F: Fn(&crate::core::target::LayerElement) -> f64,
{
    let _ = writeln!(out, "Individual target atom {what} energies (eV)");
    let values: Vec<String> = atoms.iter().map(|atom| value(atom).to_string()).collect();
    let _ = writeln!(out, "      {}", values.join(" "));
}

/// Writes `TRIMAUTO` so TRIM runs unattended and leaves its outputs in
/// the working directory.
#[derive(Debug)]
pub struct AutoTrim;

impl AutoTrim {
    pub fn write(&self, dir: &Path) -> Result<()> {
        let contents = "1\n\
            ---------------------------------------------------------------\n\
            TRIMAUTO flag (number above): 1 = run TRIM in batch mode with\n\
            no keyboard input, leaving output files in this directory.\n";
        let path = dir.join(AUTO_TRIM_FILE);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))
    }
}

/// Renders `SR.IN` for the stopping/range module.
#[derive(Debug)]
pub struct SrInput<'a> {
    pub ion: &'a Ion,
    pub layer: &'a Layer,
    pub settings: &'a SrSettings,
}

impl SrInput<'_> {
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("---Stopping/Range Input Data (Number-format: Period = Decimal Point)\n");
        out.push_str("---Output File Name\n");
        let _ = writeln!(out, "\"{}\"", self.settings.output_filename);
        out.push_str("---Ion(Z), Ion Mass(u)\n");
        let _ = writeln!(out, "{}   {}", self.ion.element.z, self.ion.element.mass);
        out.push_str("---Target Data: (Solid=0,Gas=1), Density(g/cm3), Compound Corr.\n");
        let _ = writeln!(
            out,
            "{}    {}    {}",
            self.layer.phase.flag(),
            self.layer.density,
            self.settings.correction
        );
        out.push_str("---Number of Target Elements\n");
        let _ = writeln!(out, " {}", self.layer.elements.len());
        out.push_str("---Target Elements: (Z), Target name, Stoich, Target Mass(u)\n");
        for entry in &self.layer.elements {
            let _ = writeln!(
                out,
                "{}   \"{}\"   {}   {}",
                entry.element.z, entry.element.name, entry.stoich, entry.element.mass
            );
        }
        out.push_str("---Output Stopping Units (1-8)\n");
        let _ = writeln!(out, " {}", self.settings.output_type);
        out.push_str("---Ion Energy : E-Min(keV), E-Max(keV)\n");
        let _ = writeln!(
            out,
            " {}   {}",
            self.settings.energy_min / 1000.0,
            self.ion.energy_kev
        );
        out
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        let path = dir.join(SR_INPUT_FILE);
        fs::write(&path, self.render())
            .with_context(|| format!("write {}", path.display()))
    }
}
