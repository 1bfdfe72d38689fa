//! Job description files (TOML).
//!
//! A job file names what to simulate; the harness config says how. The
//! raw serde structs are kept separate from the core types so symbol
//! resolution and range validation happen in one place, before any
//! scratch directory is allocated.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::core::element::Element;
use crate::core::ion::Ion;
use crate::core::settings::{SrSettings, TrimSettings};
use crate::core::target::{Layer, LayerElement, Phase, Target};

/// Default per-fragment ion count when a job does not set one.
const DEFAULT_STEP_SIZE: u32 = 1000;

#[derive(Debug, Deserialize)]
struct JobFile {
    ions: Vec<IonSpec>,
    target: TargetSpec,
    #[serde(default)]
    settings: TrimSettings,
    #[serde(default = "default_step_size")]
    step_size: u32,
}

fn default_step_size() -> u32 {
    DEFAULT_STEP_SIZE
}

#[derive(Debug, Deserialize)]
struct IonSpec {
    symbol: String,
    energy_kev: f64,
    number_ions: u32,
}

#[derive(Debug, Deserialize)]
struct TargetSpec {
    layers: Vec<LayerSpec>,
}

#[derive(Debug, Deserialize)]
struct LayerSpec {
    name: String,
    width_angstrom: f64,
    density: f64,
    #[serde(default)]
    gas: bool,
    elements: Vec<LayerElementSpec>,
}

#[derive(Debug, Deserialize)]
struct LayerElementSpec {
    symbol: String,
    stoich: f64,
    #[serde(default = "default_displacement_ev")]
    displacement_ev: f64,
    #[serde(default = "default_lattice_ev")]
    lattice_ev: f64,
    #[serde(default = "default_surface_ev")]
    surface_ev: f64,
}

fn default_displacement_ev() -> f64 {
    25.0
}

fn default_lattice_ev() -> f64 {
    3.0
}

fn default_surface_ev() -> f64 {
    2.0
}

/// One ion entry of a resolved TRIM job.
#[derive(Debug, Clone)]
pub struct JobIon {
    pub ion: Ion,
    pub number_ions: u32,
}

/// A fully resolved and validated TRIM job.
#[derive(Debug, Clone)]
pub struct TrimJob {
    pub ions: Vec<JobIon>,
    pub target: Target,
    pub settings: TrimSettings,
    pub step_size: u32,
}

/// Load and resolve a TRIM job file.
pub fn load_job(path: &Path) -> Result<TrimJob> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let raw: JobFile =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    resolve_job(raw).with_context(|| format!("invalid job {}", path.display()))
}

fn resolve_job(raw: JobFile) -> Result<TrimJob> {
    if raw.ions.is_empty() {
        return Err(anyhow!("job must list at least one ion"));
    }
    if raw.step_size == 0 {
        return Err(anyhow!("step_size must be > 0"));
    }
    raw.settings.validate()?;

    let mut ions = Vec::with_capacity(raw.ions.len());
    for spec in &raw.ions {
        if spec.number_ions == 0 {
            return Err(anyhow!("ion {} has number_ions = 0", spec.symbol));
        }
        ions.push(JobIon {
            ion: Ion::new(&spec.symbol, spec.energy_kev)?,
            number_ions: spec.number_ions,
        });
    }

    let layers: Vec<Layer> = raw
        .target
        .layers
        .iter()
        .map(resolve_layer)
        .collect::<Result<_>>()?;
    let target = Target::new(layers)?;

    Ok(TrimJob {
        ions,
        target,
        settings: raw.settings,
        step_size: raw.step_size,
    })
}

fn resolve_layer(spec: &LayerSpec) -> Result<Layer> {
    let elements: Vec<LayerElement> = spec
        .elements
        .iter()
        .map(|entry| {
            let element = Element::from_symbol(&entry.symbol)
                .ok_or_else(|| anyhow!("unknown element symbol {}", entry.symbol))?;
            Ok(LayerElement {
                element,
                stoich: entry.stoich,
                displacement_ev: entry.displacement_ev,
                lattice_ev: entry.lattice_ev,
                surface_ev: entry.surface_ev,
            })
        })
        .collect::<Result<_>>()?;

    let layer = Layer {
        name: spec.name.clone(),
        width_angstrom: spec.width_angstrom,
        density: spec.density,
        phase: if spec.gas { Phase::Gas } else { Phase::Solid },
        elements,
    };
    layer.validate()?;
    Ok(layer)
}

#[derive(Debug, Deserialize)]
struct SrJobFile {
    ion: SrIonSpec,
    layer: LayerSpec,
    #[serde(default)]
    settings: SrSettings,
}

#[derive(Debug, Deserialize)]
struct SrIonSpec {
    symbol: String,
    energy_kev: f64,
}

/// A resolved stopping/range job: one ion against one layer.
#[derive(Debug, Clone)]
pub struct SrJob {
    pub ion: Ion,
    pub layer: Layer,
    pub settings: SrSettings,
}

/// Load and resolve an SR job file.
pub fn load_sr_job(path: &Path) -> Result<SrJob> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let raw: SrJobFile =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    raw.settings.validate()?;
    let layer = resolve_layer(&raw.layer)
        .with_context(|| format!("invalid layer in {}", path.display()))?;
    Ok(SrJob {
        ion: Ion::new(&raw.ion.symbol, raw.ion.energy_kev)?,
        layer,
        settings: raw.settings,
    })
}
