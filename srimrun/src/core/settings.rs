//! Validated settings for TRIM and SR calculations.
//!
//! These mirror the knobs the SRIM input files expose. Most are small
//! integer flags with tight ranges; `validate` reports the first field
//! out of bounds so a bad job file fails before any scratch directory
//! is allocated.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Settings for a TRIM cascade calculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrimSettings {
    /// Free-text run description. Ends up inside a quoted field of
    /// `TRIM.IN`, so it must not contain quote characters itself.
    pub description: String,

    /// Pop up reminder dialogs (0|1). Always 0 for unattended runs.
    pub reminders: u32,

    /// Autosave interval flag (0|1).
    pub autosave: u32,

    /// Live plot mode (0..=5). 5 = no moving plots, fastest.
    pub plot_mode: u32,

    /// Plot window minimum depth in Angstrom.
    pub plot_xmin: f64,

    /// Plot window maximum depth in Angstrom. 0/0 means full target.
    pub plot_xmax: f64,

    /// Write `RANGE.txt` (0|1).
    pub ranges: u32,

    /// Write `BACKSCAT.txt` (0|1).
    pub backscattered: u32,

    /// Write `TRANSMIT.txt` (0|1).
    pub transmit: u32,

    /// Write `SPUTTER.txt` (0|1).
    pub sputtered: u32,

    /// Collision detail (0=none, 1=ion, 2=ion+recoils).
    pub collisions: u32,

    /// EXYZ sampling interval in eV, 0 disables `EXYZ.txt`.
    pub exyz: u32,

    /// Incident angle in degrees, 0 <= angle < 90.
    pub angle_ions: f64,

    /// Bragg stopping-power correction factor.
    pub bragg_correction: f64,

    /// Monte Carlo seed (0..=100_000). When unset, each fragment draws
    /// its own so parallel fragments sample independent cascades.
    pub random_seed: Option<u32>,

    /// SRIM version flag (0|1).
    pub version: u32,

    /// Damage calculation mode (1..=7). 2 = full cascades.
    pub calculation: u32,
}

impl Default for TrimSettings {
    fn default() -> Self {
        Self {
            description: "srimrun calculation".to_string(),
            reminders: 0,
            autosave: 0,
            plot_mode: 5,
            plot_xmin: 0.0,
            plot_xmax: 0.0,
            ranges: 0,
            backscattered: 0,
            transmit: 0,
            sputtered: 0,
            collisions: 0,
            exyz: 0,
            angle_ions: 0.0,
            bragg_correction: 1.0,
            random_seed: None,
            version: 0,
            calculation: 2,
        }
    }
}

impl TrimSettings {
    pub fn validate(&self) -> Result<()> {
        if self.description.contains('"') {
            return Err(anyhow!("description must not contain quotes"));
        }
        flag("reminders", self.reminders)?;
        flag("autosave", self.autosave)?;
        bounded("plot_mode", self.plot_mode, 0, 5)?;
        if !self.plot_xmin.is_finite() || self.plot_xmin < 0.0 {
            return Err(anyhow!("plot_xmin must be >= 0, got {}", self.plot_xmin));
        }
        if !self.plot_xmax.is_finite() || self.plot_xmax < self.plot_xmin {
            return Err(anyhow!(
                "plot_xmax must be >= plot_xmin ({} < {})",
                self.plot_xmax,
                self.plot_xmin
            ));
        }
        flag("ranges", self.ranges)?;
        flag("backscattered", self.backscattered)?;
        flag("transmit", self.transmit)?;
        flag("sputtered", self.sputtered)?;
        bounded("collisions", self.collisions, 0, 2)?;
        if !(0.0..90.0).contains(&self.angle_ions) {
            return Err(anyhow!(
                "angle_ions must be in [0, 90) degrees, got {}",
                self.angle_ions
            ));
        }
        if !self.bragg_correction.is_finite() || self.bragg_correction <= 0.0 {
            return Err(anyhow!(
                "bragg_correction must be > 0, got {}",
                self.bragg_correction
            ));
        }
        if let Some(seed) = self.random_seed {
            bounded("random_seed", seed, 0, 100_000)?;
        }
        flag("version", self.version)?;
        bounded("calculation", self.calculation, 1, 7)?;
        Ok(())
    }
}

/// Settings for an SR (stopping/range table) calculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SrSettings {
    /// Lower bound of the energy table in eV.
    pub energy_min: f64,

    /// Stopping-power output units (1..=8).
    pub output_type: u32,

    /// File the SR module writes its table to.
    pub output_filename: String,

    /// Compound correction factor.
    pub correction: f64,
}

impl Default for SrSettings {
    fn default() -> Self {
        Self {
            energy_min: 1.0e3,
            output_type: 1,
            output_filename: "SR_OUTPUT.txt".to_string(),
            correction: 1.0,
        }
    }
}

impl SrSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.energy_min.is_finite() || self.energy_min <= 0.0 {
            return Err(anyhow!("energy_min must be > 0, got {}", self.energy_min));
        }
        bounded("output_type", self.output_type, 1, 8)?;
        if self.output_filename.trim().is_empty() || self.output_filename.contains('"') {
            return Err(anyhow!("output_filename must be non-empty and quoteless"));
        }
        if !self.correction.is_finite() || self.correction <= 0.0 {
            return Err(anyhow!("correction must be > 0, got {}", self.correction));
        }
        Ok(())
    }
}

fn flag(name: &str, value: u32) -> Result<()> {
    bounded(name, value, 0, 1)
}

fn bounded(name: &str, value: u32, min: u32, max: u32) -> Result<()> {
    if value < min || value > max {
        return Err(anyhow!("{name} must be in {min}..={max}, got {value}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        TrimSettings::default().validate().expect("trim defaults");
        SrSettings::default().validate().expect("sr defaults");
    }

    #[test]
    fn rejects_quoted_description() {
        let settings = TrimSettings {
            description: "say \"hi\"".to_string(),
            ..TrimSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_calculation() {
        for calculation in [0, 8] {
            let settings = TrimSettings {
                calculation,
                ..TrimSettings::default()
            };
            assert!(settings.validate().is_err());
        }
    }

    #[test]
    fn rejects_inverted_plot_window() {
        let settings = TrimSettings {
            plot_xmin: 100.0,
            plot_xmax: 10.0,
            ..TrimSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_steep_angle() {
        let settings = TrimSettings {
            angle_ions: 90.0,
            ..TrimSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_oversized_seed() {
        let settings = TrimSettings {
            random_seed: Some(100_001),
            ..TrimSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn sr_rejects_bad_output_type() {
        let settings = SrSettings {
            output_type: 9,
            ..SrSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
