use std::collections::HashMap;

/// Modification masses keyed by their short Unimod name as it appears in
/// peptidoform notation, e.g. `PEPT[Phospho]IDE`.
///
/// # Example
///
/// ```
/// use anncore::chemistry::unimod::unimod_modifications_mass;
///
/// let masses = unimod_modifications_mass();
/// assert_eq!(masses.get("Phospho"), Some(&79.966331));
/// ```
pub fn unimod_modifications_mass() -> HashMap<&'static str, f64> {
    let mut map = HashMap::new();
    map.insert("Acetyl", 42.010565);
    map.insert("Biotin", 226.077598);
    map.insert("Carbamidomethyl", 57.021464);
    map.insert("Deamidated", 0.984016);
    map.insert("Phospho", 79.966331);
    map.insert("Methyl", 14.015650);
    map.insert("Oxidation", 15.994915);
    map.insert("Dimethyl", 28.031300);
    map.insert("Trimethyl", 42.046950);
    map.insert("HexNAc", 203.079373);
    map.insert("Propionyl", 56.026215);
    map.insert("Succinyl", 100.016044);
    map.insert("GG", 114.042927);
    map.insert("Formyl", 27.994915);
    map.insert("Cysteinyl", 119.004099);
    map.insert("Nitro", 44.985078);
    map.insert("Malonyl", 86.000394);
    map.insert("Butyryl", 70.041865);
    map.insert("Crotonyl", 68.026215);
    map.insert("Glutaryl", 114.031694);
    map
}

// MODIFICATIONS_MZ_NUMERICAL with integer accession keys and float values
pub fn unimod_modifications_mass_numerical() -> HashMap<u32, f64> {
    let mut map = HashMap::new();
    map.insert(1, 42.010565);
    map.insert(3, 226.077598);
    map.insert(4, 57.021464);
    map.insert(7, 0.984016);
    map.insert(21, 79.966331);
    map.insert(34, 14.015650);
    map.insert(35, 15.994915);
    map.insert(36, 28.031300);
    map.insert(37, 42.046950);
    map.insert(43, 203.079373);
    map.insert(58, 56.026215);
    map.insert(64, 100.016044);
    map.insert(121, 114.042927);
    map.insert(122, 27.994915);
    map.insert(312, 119.004099);
    map.insert(354, 44.985078);
    map.insert(747, 86.000394);
    map.insert(1289, 70.041865);
    map.insert(1363, 68.026215);
    map.insert(1848, 114.031694);
    map
}

/// Mass delta for a modification token, accepting either a short Unimod name
/// (`Phospho`) or a numerical accession (`UNIMOD:21`).
///
/// Returns `None` when the token is not present in the tables, callers are
/// expected to turn this into a hard error rather than default to zero.
///
/// # Example
///
/// ```
/// use anncore::chemistry::unimod::modification_mass;
///
/// assert_eq!(modification_mass("Phospho"), Some(79.966331));
/// assert_eq!(modification_mass("UNIMOD:21"), Some(79.966331));
/// assert_eq!(modification_mass("NotAModification"), None);
/// ```
pub fn modification_mass(token: &str) -> Option<f64> {
    if let Some(accession) = token.strip_prefix("UNIMOD:") {
        let accession: u32 = accession.parse().ok()?;
        return unimod_modifications_mass_numerical().get(&accession).copied();
    }
    unimod_modifications_mass().get(token).copied()
}
