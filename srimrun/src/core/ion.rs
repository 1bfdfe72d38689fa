//! Projectile ion description.

use anyhow::{Result, anyhow};

use crate::core::element::Element;

/// An ion species accelerated at the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ion {
    pub element: Element,
    pub energy_kev: f64,
}

impl Ion {
    /// Build an ion from an element symbol and kinetic energy in keV.
    pub fn new(symbol: &str, energy_kev: f64) -> Result<Ion> {
        let element = Element::from_symbol(symbol)
            .ok_or_else(|| anyhow!("unknown element symbol {symbol}"))?;
        if !energy_kev.is_finite() || energy_kev <= 0.0 {
            return Err(anyhow!("ion energy must be > 0 keV, got {energy_kev}"));
        }
        Ok(Ion {
            element,
            energy_kev,
        })
    }

    pub fn symbol(&self) -> &'static str {
        self.element.symbol
    }
}
