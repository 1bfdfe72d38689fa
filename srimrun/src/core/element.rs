//! Embedded element data for resolving ion and target species.
//!
//! SRIM identifies atoms by atomic number and mass; job files identify
//! them by symbol. The table covers the naturally occurring elements
//! (Z = 1..=92) with standard atomic weights.

/// A chemical element from the embedded table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub symbol: &'static str,
    pub name: &'static str,
    pub z: u32,
    pub mass: f64,
}

impl Element {
    /// Look up an element by symbol (case-sensitive, e.g. `"Ni"`).
    pub fn from_symbol(symbol: &str) -> Option<Element> {
        ELEMENTS.iter().copied().find(|e| e.symbol == symbol)
    }

    /// Look up an element by atomic number.
    pub fn from_z(z: u32) -> Option<Element> {
        // The table is ordered by Z starting at 1.
        let index = z.checked_sub(1)? as usize;
        ELEMENTS.get(index).copied()
    }
}

const fn element(symbol: &'static str, name: &'static str, z: u32, mass: f64) -> Element {
    Element {
        symbol,
        name,
        z,
        mass,
    }
}

const ELEMENTS: &[Element] = &[
    element("H", "Hydrogen", 1, 1.008),
    element("He", "Helium", 2, 4.003),
    element("Li", "Lithium", 3, 6.94),
    element("Be", "Beryllium", 4, 9.012),
    element("B", "Boron", 5, 10.81),
    element("C", "Carbon", 6, 12.011),
    element("N", "Nitrogen", 7, 14.007),
    element("O", "Oxygen", 8, 15.999),
    element("F", "Fluorine", 9, 18.998),
    element("Ne", "Neon", 10, 20.180),
    element("Na", "Sodium", 11, 22.990),
    element("Mg", "Magnesium", 12, 24.305),
    element("Al", "Aluminium", 13, 26.982),
    element("Si", "Silicon", 14, 28.085),
    element("P", "Phosphorus", 15, 30.974),
    element("S", "Sulfur", 16, 32.06),
    element("Cl", "Chlorine", 17, 35.45),
    element("Ar", "Argon", 18, 39.948),
    element("K", "Potassium", 19, 39.098),
    element("Ca", "Calcium", 20, 40.078),
    element("Sc", "Scandium", 21, 44.956),
    element("Ti", "Titanium", 22, 47.867),
    element("V", "Vanadium", 23, 50.942),
    element("Cr", "Chromium", 24, 51.996),
    element("Mn", "Manganese", 25, 54.938),
    element("Fe", "Iron", 26, 55.845),
    element("Co", "Cobalt", 27, 58.933),
    element("Ni", "Nickel", 28, 58.693),
    element("Cu", "Copper", 29, 63.546),
    element("Zn", "Zinc", 30, 65.38),
    element("Ga", "Gallium", 31, 69.723),
    element("Ge", "Germanium", 32, 72.630),
    element("As", "Arsenic", 33, 74.922),
    element("Se", "Selenium", 34, 78.971),
    element("Br", "Bromine", 35, 79.904),
    element("Kr", "Krypton", 36, 83.798),
    element("Rb", "Rubidium", 37, 85.468),
    element("Sr", "Strontium", 38, 87.62),
    element("Y", "Yttrium", 39, 88.906),
    element("Zr", "Zirconium", 40, 91.224),
    element("Nb", "Niobium", 41, 92.906),
    element("Mo", "Molybdenum", 42, 95.95),
    element("Tc", "Technetium", 43, 98.0),
    element("Ru", "Ruthenium", 44, 101.07),
    element("Rh", "Rhodium", 45, 102.906),
    element("Pd", "Palladium", 46, 106.42),
    element("Ag", "Silver", 47, 107.868),
    element("Cd", "Cadmium", 48, 112.414),
    element("In", "Indium", 49, 114.818),
    element("Sn", "Tin", 50, 118.710),
    element("Sb", "Antimony", 51, 121.760),
    element("Te", "Tellurium", 52, 127.60),
    element("I", "Iodine", 53, 126.904),
    element("Xe", "Xenon", 54, 131.293),
    element("Cs", "Caesium", 55, 132.905),
    element("Ba", "Barium", 56, 137.327),
    element("La", "Lanthanum", 57, 138.905),
    element("Ce", "Cerium", 58, 140.116),
    element("Pr", "Praseodymium", 59, 140.908),
    element("Nd", "Neodymium", 60, 144.242),
    element("Pm", "Promethium", 61, 145.0),
    element("Sm", "Samarium", 62, 150.36),
    element("Eu", "Europium", 63, 151.964),
    element("Gd", "Gadolinium", 64, 157.25),
    element("Tb", "Terbium", 65, 158.925),
    element("Dy", "Dysprosium", 66, 162.500),
    element("Ho", "Holmium", 67, 164.930),
    element("Er", "Erbium", 68, 167.259),
    element("Tm", "Thulium", 69, 168.934),
    element("Yb", "Ytterbium", 70, 173.045),
    element("Lu", "Lutetium", 71, 174.967),
    element("Hf", "Hafnium", 72, 178.49),
    element("Ta", "Tantalum", 73, 180.948),
    element("W", "Tungsten", 74, 183.84),
    element("Re", "Rhenium", 75, 186.207),
    element("Os", "Osmium", 76, 190.23),
    element("Ir", "Iridium", 77, 192.217),
    element("Pt", "Platinum", 78, 195.084),
    element("Au", "Gold", 79, 196.967),
    element("Hg", "Mercury", 80, 200.592),
    element("Tl", "Thallium", 81, 204.38),
    element("Pb", "Lead", 82, 207.2),
    element("Bi", "Bismuth", 83, 208.980),
    element("Po", "Polonium", 84, 209.0),
    element("At", "Astatine", 85, 210.0),
    element("Rn", "Radon", 86, 222.0),
    element("Fr", "Francium", 87, 223.0),
    element("Ra", "Radium", 88, 226.0),
    element("Ac", "Actinium", 89, 227.0),
    element("Th", "Thorium", 90, 232.038),
    element("Pa", "Protactinium", 91, 231.036),
    element("U", "Uranium", 92, 238.029),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_symbol() {
        let ni = Element::from_symbol("Ni").expect("nickel");
        assert_eq!(ni.z, 28);
        assert_eq!(ni.name, "Nickel");
        assert!((ni.mass - 58.693).abs() < 1e-9);
    }

    #[test]
    fn lookup_unknown_symbol() {
        assert!(Element::from_symbol("Xx").is_none());
        assert!(Element::from_symbol("ni").is_none());
    }

    #[test]
    fn lookup_by_z_matches_table_order() {
        for (index, entry) in [(1u32, "H"), (26, "Fe"), (92, "U")] {
            let found = Element::from_z(index).expect("in range");
            assert_eq!(found.symbol, entry);
        }
        assert!(Element::from_z(0).is_none());
        assert!(Element::from_z(93).is_none());
    }
}
