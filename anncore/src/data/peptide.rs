use std::fmt;
use std::fmt::{Display, Formatter};

use bincode::{Decode, Encode};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::chemistry::amino_acid::amino_acid_masses;
use crate::chemistry::constants::{MASS_PROTON, MASS_WATER};
use crate::chemistry::unimod::modification_mass;
use crate::errors::{AnnotatorError, Result};

/// A single mass delta attached to a residue or terminus.
///
/// `name` is the Unimod token the delta was resolved from, `None` when the
/// notation carried an explicit numeric delta that is used verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Modification {
    pub mass: f64,
    pub name: Option<String>,
}

/// One position of a peptidoform: a residue letter, its intrinsic
/// monoisotopic mass and the modifications stacked on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Residue {
    pub code: char,
    pub mass: f64,
    pub modifications: Vec<Modification>,
}

impl Residue {
    /// Intrinsic residue mass plus the sum of all attached modification deltas.
    pub fn monoisotopic_mass(&self) -> f64 {
        self.mass + self.modifications.iter().map(|m| m.mass).sum::<f64>()
    }
}

/// A parsed peptidoform: an ordered residue sequence with terminal
/// modifications. Immutable once parsed.
///
/// The accepted notation is a ProForma subset: one uppercase letter per
/// residue, bracket groups for modifications (`PEPT[Phospho]IDE`,
/// `PEPT[UNIMOD:21]IDE`, `PEPT[+79.966331]IDE`), an optional leading
/// `[mod]-` N-terminal group and an optional trailing `-[mod]` C-terminal
/// group. Multiple bracket groups on one position stack additively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Peptidoform {
    pub peptidoform_string: String,
    pub residues: Vec<Residue>,
    pub n_term: Vec<Modification>,
    pub c_term: Vec<Modification>,
}

impl Peptidoform {
    /// Parse a peptidoform notation string.
    ///
    /// Fails with `MalformedNotation` on unbalanced brackets, dangling
    /// terminal markers or stray characters, with `UnknownResidue` on letters
    /// outside the supported alphabet and with `UnknownModification` on
    /// bracket tokens that neither the Unimod tables nor numeric-delta
    /// parsing accept. All positions reported are byte offsets into the
    /// notation.
    ///
    /// # Example
    ///
    /// ```
    /// use anncore::data::peptide::Peptidoform;
    ///
    /// let peptidoform = Peptidoform::parse("PEPT[Phospho]IDE").unwrap();
    /// assert_eq!(peptidoform.residues.len(), 7);
    /// assert_eq!(peptidoform.residues[3].modifications.len(), 1);
    /// ```
    pub fn parse(notation: &str) -> Result<Self> {
        if notation.is_empty() {
            return Err(AnnotatorError::malformed(notation, 0, "empty sequence"));
        }

        let masses = amino_acid_masses();
        let bytes = notation.as_bytes();

        let mut residues: Vec<Residue> = Vec::new();
        let mut n_term: Vec<Modification> = Vec::new();
        let mut c_term: Vec<Modification> = Vec::new();
        let mut i = 0;

        // Leading bracket groups belong to the N-terminus and must be
        // separated from the first residue by '-'
        if bytes[0] == b'[' {
            while i < bytes.len() && bytes[i] == b'[' {
                let (modification, next) = parse_modification_token(notation, i)?;
                n_term.push(modification);
                i = next;
            }
            if i >= bytes.len() || bytes[i] != b'-' {
                return Err(AnnotatorError::malformed(
                    notation,
                    i,
                    "N-terminal modification must be followed by '-'",
                ));
            }
            i += 1;
        }

        while i < bytes.len() {
            let c = bytes[i] as char;
            if c.is_ascii_uppercase() {
                let mass = match masses.get(&c.to_string()[..]) {
                    Some(&mass) => mass,
                    None => {
                        return Err(AnnotatorError::UnknownResidue {
                            residue: c,
                            position: i,
                        })
                    }
                };
                residues.push(Residue {
                    code: c,
                    mass,
                    modifications: Vec::new(),
                });
                i += 1;
            } else if c == '[' {
                let (modification, next) = parse_modification_token(notation, i)?;
                match residues.last_mut() {
                    Some(residue) => residue.modifications.push(modification),
                    None => {
                        return Err(AnnotatorError::malformed(
                            notation,
                            i,
                            "modification is not attached to any residue",
                        ))
                    }
                }
                i = next;
            } else if c == '-' {
                // C-terminal group(s) run to the end of the notation
                i += 1;
                if i >= bytes.len() || bytes[i] != b'[' {
                    return Err(AnnotatorError::malformed(
                        notation,
                        i,
                        "C-terminal '-' must be followed by a modification",
                    ));
                }
                while i < bytes.len() && bytes[i] == b'[' {
                    let (modification, next) = parse_modification_token(notation, i)?;
                    c_term.push(modification);
                    i = next;
                }
                if i < bytes.len() {
                    return Err(AnnotatorError::malformed(
                        notation,
                        i,
                        "unexpected characters after C-terminal modification",
                    ));
                }
            } else {
                return Err(AnnotatorError::malformed(notation, i, "unexpected character"));
            }
        }

        if residues.is_empty() {
            return Err(AnnotatorError::malformed(notation, 0, "no residues"));
        }

        Ok(Peptidoform {
            peptidoform_string: notation.to_owned(),
            residues,
            n_term,
            c_term,
        })
    }

    /// Number of residues.
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Residue letters without any modification markup.
    pub fn stripped_sequence(&self) -> String {
        self.residues.iter().map(|r| r.code).collect()
    }

    /// Monoisotopic neutral mass, summed left-to-right over the residues to
    /// bound floating point error growth, plus terminal deltas and water.
    ///
    /// # Example
    ///
    /// ```
    /// use anncore::data::peptide::Peptidoform;
    ///
    /// let peptidoform = Peptidoform::parse("PEPTIDE").unwrap();
    /// assert!((peptidoform.neutral_mass() - 799.3599646863).abs() < 1e-6);
    /// ```
    pub fn neutral_mass(&self) -> f64 {
        let residue_sum = self
            .residues
            .iter()
            .fold(0.0, |acc, residue| acc + residue.monoisotopic_mass());
        let n_term: f64 = self.n_term.iter().map(|m| m.mass).sum();
        let c_term: f64 = self.c_term.iter().map(|m| m.mass).sum();
        residue_sum + n_term + c_term + MASS_WATER
    }

    /// Mass-over-charge of the intact peptidoform at the given charge state.
    ///
    /// Fails with `InvalidCharge` for charge <= 0.
    pub fn mz(&self, charge: i32) -> Result<f64> {
        if charge <= 0 {
            return Err(AnnotatorError::InvalidCharge { charge });
        }
        Ok(calculate_mz(self.neutral_mass(), charge))
    }
}

impl Display for Peptidoform {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.peptidoform_string)
    }
}

// A bracket group starting at `start`. Returns the resolved modification and
// the byte index just past the closing bracket.
fn parse_modification_token(notation: &str, start: usize) -> Result<(Modification, usize)> {
    let close = match notation[start..].find(']') {
        Some(offset) => start + offset,
        None => {
            return Err(AnnotatorError::malformed(
                notation,
                start,
                "unclosed modification bracket",
            ))
        }
    };
    let token = &notation[start + 1..close];
    if token.is_empty() {
        return Err(AnnotatorError::malformed(
            notation,
            start,
            "empty modification bracket",
        ));
    }

    // An explicit numeric delta is taken verbatim, without a table lookup
    let numeric = Regex::new(r"^[+-]\d+(\.\d+)?$").unwrap();
    if numeric.is_match(token) {
        let mass: f64 = token.parse().map_err(|_| {
            AnnotatorError::malformed(notation, start, "unparseable numeric modification delta")
        })?;
        return Ok((Modification { mass, name: None }, close + 1));
    }

    match modification_mass(token) {
        Some(mass) => Ok((
            Modification {
                mass,
                name: Some(token.to_owned()),
            },
            close + 1,
        )),
        None => Err(AnnotatorError::UnknownModification {
            token: token.to_owned(),
            position: start,
        }),
    }
}

/// calculate the m/z of an ion
///
/// Arguments:
///
/// * `monoisotopic_mass` - neutral monoisotopic mass of the ion
/// * `charge` - charge state of the ion
///
/// Returns:
///
/// * `mz` - mass-over-charge of the ion
///
/// # Examples
///
/// ```
/// use anncore::data::peptide::calculate_mz;
///
/// let mz = calculate_mz(1000.0, 2);
/// assert_eq!(mz, 501.007276466621);
/// ```
pub fn calculate_mz(monoisotopic_mass: f64, charge: i32) -> f64 {
    (monoisotopic_mass + charge as f64 * MASS_PROTON) / charge as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn plain_sequence_mass() {
        let peptidoform = Peptidoform::parse("PEPTIDE").unwrap();
        assert_eq!(peptidoform.stripped_sequence(), "PEPTIDE");
        assert!((peptidoform.neutral_mass() - 799.3599646863).abs() < EPS);
    }

    #[test]
    fn named_modification_adds_delta() {
        let peptidoform = Peptidoform::parse("PEPT[Phospho]IDE").unwrap();
        assert!((peptidoform.neutral_mass() - 879.3262956863).abs() < EPS);
        assert_eq!(
            peptidoform.residues[3].modifications[0].name.as_deref(),
            Some("Phospho")
        );
    }

    #[test]
    fn numeric_delta_is_used_verbatim() {
        let named = Peptidoform::parse("PEPT[Phospho]IDE").unwrap();
        let numeric = Peptidoform::parse("PEPT[+79.966331]IDE").unwrap();
        assert!((named.neutral_mass() - numeric.neutral_mass()).abs() < EPS);
        assert_eq!(numeric.residues[3].modifications[0].name, None);
    }

    #[test]
    fn unimod_accession_notation() {
        let peptidoform = Peptidoform::parse("SDGVSPK[UNIMOD:121]HVGR").unwrap();
        let stripped = Peptidoform::parse("SDGVSPKHVGR").unwrap();
        assert!((peptidoform.neutral_mass() - stripped.neutral_mass() - 114.042927).abs() < EPS);
    }

    #[test]
    fn stacked_modifications_sum() {
        let peptidoform = Peptidoform::parse("PEPT[Phospho][Oxidation]IDE").unwrap();
        assert!((peptidoform.neutral_mass() - (799.3599646863 + 79.966331 + 15.994915)).abs() < EPS);
    }

    #[test]
    fn terminal_modifications() {
        let n_term = Peptidoform::parse("[Acetyl]-PEPTIDE").unwrap();
        assert!((n_term.neutral_mass() - 841.3705296863).abs() < EPS);

        let c_term = Peptidoform::parse("PEPTIDE-[Methyl]").unwrap();
        assert!((c_term.neutral_mass() - (799.3599646863 + 14.015650)).abs() < EPS);
    }

    #[test]
    fn unbalanced_bracket_is_malformed() {
        let result = Peptidoform::parse("PEPT[PhosphoIDE");
        assert!(matches!(
            result,
            Err(AnnotatorError::MalformedNotation { position: 4, .. })
        ));
    }

    #[test]
    fn dangling_n_term_marker_is_malformed() {
        let result = Peptidoform::parse("[Acetyl]PEPTIDE");
        assert!(matches!(result, Err(AnnotatorError::MalformedNotation { .. })));
    }

    #[test]
    fn unknown_residue_is_rejected() {
        let result = Peptidoform::parse("PEPTIDEB");
        assert_eq!(
            result,
            Err(AnnotatorError::UnknownResidue {
                residue: 'B',
                position: 7
            })
        );
    }

    #[test]
    fn unknown_modification_is_rejected() {
        let result = Peptidoform::parse("PEPT[Phosphoz]IDE");
        assert!(matches!(
            result,
            Err(AnnotatorError::UnknownModification { .. })
        ));
    }

    #[test]
    fn empty_notation_is_malformed() {
        assert!(matches!(
            Peptidoform::parse(""),
            Err(AnnotatorError::MalformedNotation { .. })
        ));
    }

    #[test]
    fn invalid_charge_is_rejected() {
        let peptidoform = Peptidoform::parse("PEPTIDE").unwrap();
        assert_eq!(
            peptidoform.mz(0),
            Err(AnnotatorError::InvalidCharge { charge: 0 })
        );
        assert_eq!(
            peptidoform.mz(-2),
            Err(AnnotatorError::InvalidCharge { charge: -2 })
        );
    }

    #[test]
    fn mz_round_trips_to_neutral_mass() {
        let peptidoform = Peptidoform::parse("PEPT[Phospho]IDER").unwrap();
        let neutral = peptidoform.neutral_mass();
        assert!(neutral > 0.0);
        for charge in 1..=4 {
            let mz = peptidoform.mz(charge).unwrap();
            let back = mz * charge as f64 - charge as f64 * MASS_PROTON;
            assert!((back - neutral).abs() < EPS);
        }
    }
}
