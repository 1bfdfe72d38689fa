//! Target material description: layers of element mixtures.

use anyhow::{Result, anyhow};

use crate::core::element::Element;

/// Physical phase of a target layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Solid,
    Gas,
}

impl Phase {
    /// Numeric flag used by the SRIM input format.
    pub fn flag(self) -> u32 {
        match self {
            Phase::Solid => 0,
            Phase::Gas => 1,
        }
    }
}

/// One element within a layer, with its stoichiometric fraction and the
/// per-atom energies SRIM needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerElement {
    pub element: Element,
    pub stoich: f64,
    pub displacement_ev: f64,
    pub lattice_ev: f64,
    pub surface_ev: f64,
}

/// A homogeneous slab of the target.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub width_angstrom: f64,
    pub density: f64,
    pub phase: Phase,
    pub elements: Vec<LayerElement>,
}

impl Layer {
    pub fn validate(&self) -> Result<()> {
        if self.name.contains('"') {
            return Err(anyhow!("layer name must not contain quotes: {}", self.name));
        }
        ensure_positive("layer width", self.width_angstrom)?;
        ensure_positive("layer density", self.density)?;
        if self.elements.is_empty() {
            return Err(anyhow!("layer {} has no elements", self.name));
        }
        for entry in &self.elements {
            ensure_positive("stoichiometric fraction", entry.stoich)?;
            ensure_positive("displacement energy", entry.displacement_ev)?;
            ensure_positive("lattice binding energy", entry.lattice_ev)?;
            ensure_positive("surface binding energy", entry.surface_ev)?;
        }
        Ok(())
    }

    /// Stoichiometric fraction of `element` in this layer, 0 when absent.
    pub fn stoich_of(&self, element: Element) -> f64 {
        self.elements
            .iter()
            .find(|entry| entry.element == element)
            .map_or(0.0, |entry| entry.stoich)
    }
}

/// The full target: one or more layers hit in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub layers: Vec<Layer>,
}

impl Target {
    pub fn new(layers: Vec<Layer>) -> Result<Target> {
        let target = Target { layers };
        target.validate()?;
        Ok(target)
    }

    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(anyhow!("target must have at least one layer"));
        }
        for layer in &self.layers {
            layer.validate()?;
        }
        Ok(())
    }

    /// Distinct atoms across all layers, in first-encounter order.
    ///
    /// The SRIM input format lists atoms once globally and references
    /// them per layer by column.
    pub fn atoms(&self) -> Vec<LayerElement> {
        let mut atoms: Vec<LayerElement> = Vec::new();
        for layer in &self.layers {
            for entry in &layer.elements {
                if !atoms.iter().any(|seen| seen.element == entry.element) {
                    atoms.push(*entry);
                }
            }
        }
        atoms
    }
}

fn ensure_positive(what: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(anyhow!("{what} must be > 0, got {value}"));
    }
    Ok(())
}
