use std::collections::HashMap;

/// Amino Acid Masses
///
/// # Arguments
///
/// None
///
/// # Returns
///
/// * `HashMap<&'static str, f64>` - a map of amino acid one-letter codes to their monoisotopic residue masses
///
/// # Example
///
/// ```
/// use anncore::chemistry::amino_acid::amino_acid_masses;
///
/// let amino_acid_masses = amino_acid_masses();
/// assert_eq!(amino_acid_masses.get("K"), Some(&128.094963));
/// ```
pub fn amino_acid_masses() -> HashMap<&'static str, f64> {
    let mut map = HashMap::new();
    map.insert("A", 71.037114);
    map.insert("R", 156.101111);
    map.insert("N", 114.042927);
    map.insert("D", 115.026943);
    map.insert("C", 103.009185);
    map.insert("E", 129.042593);
    map.insert("Q", 128.058578);
    map.insert("G", 57.021464);
    map.insert("H", 137.058912);
    map.insert("I", 113.084064);
    map.insert("L", 113.084064);
    map.insert("K", 128.094963);
    map.insert("M", 131.040485);
    map.insert("F", 147.068414);
    map.insert("P", 97.052764);
    map.insert("S", 87.032028);
    map.insert("T", 101.047679);
    map.insert("W", 186.079313);
    map.insert("Y", 163.063329);
    map.insert("V", 99.068414);
    map.insert("U", 168.053);
    map
}

/// Monoisotopic mass of a single residue letter
///
/// Returns `None` for letters outside the supported alphabet, including the
/// ambiguity codes B, J, X and Z, which carry no defined monoisotopic mass.
///
/// # Arguments
///
/// * `residue` - one-letter amino acid code
///
/// # Example
///
/// ```
/// use anncore::chemistry::amino_acid::residue_mass;
///
/// assert_eq!(residue_mass('G'), Some(57.021464));
/// assert_eq!(residue_mass('B'), None);
/// ```
pub fn residue_mass(residue: char) -> Option<f64> {
    amino_acid_masses().get(&residue.to_string()[..]).copied()
}
