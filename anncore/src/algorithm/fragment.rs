use std::fmt;
use std::fmt::{Display, Formatter};

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::chemistry::constants::{MASS_CO, MASS_NH3, MASS_PROTON, MASS_WATER};
use crate::data::peptide::{calculate_mz, Peptidoform};
use crate::errors::{AnnotatorError, Result};

/// The closed set of supported ion series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum IonSeries {
    A,
    B,
    C,
    X,
    Y,
    Z,
    Precursor,
    Immonium,
}

impl IonSeries {
    /// Offset added to the summed residue masses (terminal deltas included)
    /// to obtain the neutral fragment mass of this series.
    pub fn mass_offset(&self) -> f64 {
        match self {
            IonSeries::A => -MASS_CO,
            IonSeries::B => 0.0,
            IonSeries::C => MASS_NH3,
            IonSeries::X => MASS_WATER + MASS_CO - 2.0 * MASS_PROTON,
            IonSeries::Y => MASS_WATER,
            IonSeries::Z => MASS_WATER - MASS_NH3,
            IonSeries::Precursor => MASS_WATER,
            IonSeries::Immonium => -MASS_CO,
        }
    }

    /// Fixed rank used to break annotation ties between equally close ions,
    /// backbone pairs before the precursor-derived and immonium classes.
    pub fn priority(&self) -> u8 {
        match self {
            IonSeries::B => 0,
            IonSeries::Y => 1,
            IonSeries::A => 2,
            IonSeries::X => 3,
            IonSeries::C => 4,
            IonSeries::Z => 5,
            IonSeries::Precursor => 6,
            IonSeries::Immonium => 7,
        }
    }

    pub fn is_n_terminal(&self) -> bool {
        matches!(self, IonSeries::A | IonSeries::B | IonSeries::C)
    }

    pub fn is_c_terminal(&self) -> bool {
        matches!(self, IonSeries::X | IonSeries::Y | IonSeries::Z)
    }

    pub fn label_prefix(&self) -> &'static str {
        match self {
            IonSeries::A => "a",
            IonSeries::B => "b",
            IonSeries::C => "c",
            IonSeries::X => "x",
            IonSeries::Y => "y",
            IonSeries::Z => "z",
            IonSeries::Precursor => "p",
            IonSeries::Immonium => "I",
        }
    }
}

impl Display for IonSeries {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label_prefix())
    }
}

/// The closed set of supported neutral losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum NeutralLoss {
    Water,
    Ammonia,
}

impl NeutralLoss {
    pub fn mass(&self) -> f64 {
        match self {
            NeutralLoss::Water => MASS_WATER,
            NeutralLoss::Ammonia => MASS_NH3,
        }
    }

    /// Suffix used in annotation labels, e.g. the `H2O` in `b3-H2O`.
    pub fn label(&self) -> &'static str {
        match self {
            NeutralLoss::Water => "H2O",
            NeutralLoss::Ammonia => "NH3",
        }
    }
}

impl Display for NeutralLoss {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One entry of the theoretical ion table. Produced by
/// [`IonSeriesGenerator::generate`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct TheoreticalIon {
    pub label: String,
    pub series: IonSeries,
    /// 1-based cleavage index, the number of residues contained in the
    /// fragment (full length for precursor ions).
    pub position: usize,
    pub loss: Option<NeutralLoss>,
    pub charge: i32,
    pub mz: f64,
    /// Index of the source peptidoform in the candidate list of the call
    /// that produced this table.
    pub peptidoform_index: usize,
}

/// Generates theoretical ion tables for peptidoforms.
///
/// The output order is deterministic: series in configuration order, then
/// position ascending, then charge ascending, then loss variants with the
/// plain ion first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IonSeriesGenerator {
    pub ion_series: Vec<IonSeries>,
    pub neutral_losses: Vec<NeutralLoss>,
}

impl Default for IonSeriesGenerator {
    fn default() -> Self {
        IonSeriesGenerator {
            ion_series: vec![IonSeries::B, IonSeries::Y],
            neutral_losses: vec![NeutralLoss::Water, NeutralLoss::Ammonia],
        }
    }
}

impl IonSeriesGenerator {
    pub fn new(ion_series: Vec<IonSeries>, neutral_losses: Vec<NeutralLoss>) -> Self {
        IonSeriesGenerator {
            ion_series,
            neutral_losses,
        }
    }

    /// All supported series with water and ammonia losses.
    pub fn exhaustive() -> Self {
        IonSeriesGenerator {
            ion_series: vec![
                IonSeries::B,
                IonSeries::Y,
                IonSeries::A,
                IonSeries::X,
                IonSeries::C,
                IonSeries::Z,
                IonSeries::Precursor,
                IonSeries::Immonium,
            ],
            neutral_losses: vec![NeutralLoss::Water, NeutralLoss::Ammonia],
        }
    }

    /// Generate the theoretical ion table for one peptidoform with fragment
    /// charges 1..=max_charge.
    ///
    /// Backbone series are emitted for cleavage positions 1..len-1, immonium
    /// ions once per distinct residue at charge 1, precursor ions at full
    /// length. Combinations yielding a non-positive neutral mass are silently
    /// skipped. Fails with `InvalidCharge` for max_charge <= 0.
    ///
    /// # Example
    ///
    /// ```
    /// use anncore::algorithm::fragment::IonSeriesGenerator;
    /// use anncore::data::peptide::Peptidoform;
    ///
    /// let peptidoform = Peptidoform::parse("PEPTIDE").unwrap();
    /// let table = IonSeriesGenerator::default().generate(&peptidoform, 1, 0).unwrap();
    /// // 6 b positions and 6 y positions, each plain plus two loss variants
    /// assert_eq!(table.len(), 36);
    /// ```
    pub fn generate(
        &self,
        peptidoform: &Peptidoform,
        max_charge: i32,
        peptidoform_index: usize,
    ) -> Result<Vec<TheoreticalIon>> {
        if max_charge <= 0 {
            return Err(AnnotatorError::InvalidCharge { charge: max_charge });
        }

        let n = peptidoform.len();
        let residue_masses: Vec<f64> = peptidoform
            .residues
            .iter()
            .map(|r| r.monoisotopic_mass())
            .collect();

        // Cumulative sums from both termini, left-to-right
        let mut prefix = vec![0.0; n];
        let mut running = 0.0;
        for (i, mass) in residue_masses.iter().enumerate() {
            running += mass;
            prefix[i] = running;
        }
        let mut suffix = vec![0.0; n];
        let mut running = 0.0;
        for (i, mass) in residue_masses.iter().enumerate().rev() {
            running += mass;
            suffix[i] = running;
        }

        let n_term: f64 = peptidoform.n_term.iter().map(|m| m.mass).sum();
        let c_term: f64 = peptidoform.c_term.iter().map(|m| m.mass).sum();

        let mut ions = Vec::new();
        for series in &self.ion_series {
            match series {
                IonSeries::Immonium => {
                    let mut seen: Vec<char> = Vec::new();
                    for (i, residue) in peptidoform.residues.iter().enumerate() {
                        if seen.contains(&residue.code) {
                            continue;
                        }
                        seen.push(residue.code);
                        let neutral = residue.monoisotopic_mass() + IonSeries::Immonium.mass_offset();
                        if neutral <= 0.0 {
                            continue;
                        }
                        ions.push(TheoreticalIon {
                            label: format!("I{}", residue.code),
                            series: IonSeries::Immonium,
                            position: i + 1,
                            loss: None,
                            charge: 1,
                            mz: calculate_mz(neutral, 1),
                            peptidoform_index,
                        });
                    }
                }
                IonSeries::Precursor => {
                    let neutral = peptidoform.neutral_mass();
                    self.emit(
                        &mut ions,
                        IonSeries::Precursor,
                        n,
                        neutral,
                        max_charge,
                        peptidoform_index,
                    );
                }
                series if series.is_n_terminal() => {
                    for position in 1..n {
                        let neutral = n_term + prefix[position - 1] + series.mass_offset();
                        self.emit(&mut ions, *series, position, neutral, max_charge, peptidoform_index);
                    }
                }
                series => {
                    for position in 1..n {
                        let neutral = c_term + suffix[n - position] + series.mass_offset();
                        self.emit(&mut ions, *series, position, neutral, max_charge, peptidoform_index);
                    }
                }
            }
        }
        Ok(ions)
    }

    fn emit(
        &self,
        ions: &mut Vec<TheoreticalIon>,
        series: IonSeries,
        position: usize,
        neutral: f64,
        max_charge: i32,
        peptidoform_index: usize,
    ) {
        for charge in 1..=max_charge {
            for loss in std::iter::once(None).chain(self.neutral_losses.iter().copied().map(Some)) {
                let mass = neutral - loss.map_or(0.0, |l| l.mass());
                if mass <= 0.0 {
                    continue;
                }
                ions.push(TheoreticalIon {
                    label: format_label(series, position, loss, charge),
                    series,
                    position,
                    loss,
                    charge,
                    mz: calculate_mz(mass, charge),
                    peptidoform_index,
                });
            }
        }
    }
}

/// Annotation label of a fragment ion, e.g. `b3`, `y5-H2O` or `y3-NH3^2+`.
/// Singly charged ions carry no charge suffix.
pub fn format_label(
    series: IonSeries,
    position: usize,
    loss: Option<NeutralLoss>,
    charge: i32,
) -> String {
    let mut label = match series {
        IonSeries::Precursor => "p".to_string(),
        _ => format!("{}{}", series.label_prefix(), position),
    };
    if let Some(loss) = loss {
        label.push('-');
        label.push_str(loss.label());
    }
    if charge > 1 {
        label.push_str(&format!("^{}+", charge));
    }
    label
}
