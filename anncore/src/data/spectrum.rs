use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};

use bincode::{Decode, Encode};
use itertools::izip;
use serde::{Deserialize, Serialize};

use crate::errors::{AnnotatorError, Result};

/// The closed set of supported scan-level attributes, each backed by its
/// PSI-MS controlled-vocabulary accession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Encode, Decode)]
pub enum ScanAttribute {
    SelectedIonMz,
    ChargeState,
    SpectrumTitle,
    MsLevel,
    ScanNumber,
    NumberOfPeaks,
    IsolationWindowTargetMz,
}

impl ScanAttribute {
    pub fn accession(&self) -> &'static str {
        match self {
            ScanAttribute::SelectedIonMz => "MS:1000744",
            ScanAttribute::ChargeState => "MS:1000041",
            ScanAttribute::SpectrumTitle => "MS:1000796",
            ScanAttribute::MsLevel => "MS:1000511",
            ScanAttribute::ScanNumber => "MS:1003057",
            ScanAttribute::NumberOfPeaks => "MS:1003059",
            ScanAttribute::IsolationWindowTargetMz => "MS:1000827",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScanAttribute::SelectedIonMz => "selected ion m/z",
            ScanAttribute::ChargeState => "charge state",
            ScanAttribute::SpectrumTitle => "spectrum title",
            ScanAttribute::MsLevel => "ms level",
            ScanAttribute::ScanNumber => "scan number",
            ScanAttribute::NumberOfPeaks => "number of peaks",
            ScanAttribute::IsolationWindowTargetMz => "isolation window target m/z",
        }
    }
}

impl Display for ScanAttribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Tagged attribute payload, fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub enum AttributeValue {
    Float(f64),
    Int(i64),
    Text(String),
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Float(value) => write!(f, "{}", value),
            AttributeValue::Int(value) => write!(f, "{}", value),
            AttributeValue::Text(value) => write!(f, "{}", value),
        }
    }
}

/// The interpretation written onto a matched peak: the winning label, its
/// mass error and any alternative interpretations that also fell within
/// tolerance, ordered by decreasing plausibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct PeakAnnotation {
    pub label: String,
    pub mass_error_da: f64,
    pub mass_error_ppm: f64,
    pub alternatives: Vec<String>,
}

/// One observed peak. `annotation` is `None` until an annotation pass
/// matches the peak, re-annotation overwrites rather than appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Peak {
    pub index: usize,
    pub mz: f64,
    pub intensity: f64,
    pub annotation: Option<PeakAnnotation>,
}

/// An observed spectrum: the peak list in acquisition order plus scan-level
/// attributes. The annotator mutates peak annotations only, never m/z,
/// intensity or the attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Spectrum {
    pub peak_list: Vec<Peak>,
    pub attributes: BTreeMap<ScanAttribute, AttributeValue>,
}

impl Spectrum {
    pub fn new() -> Self {
        Spectrum::default()
    }

    /// Replace the peak list and scan attributes from parallel m/z and
    /// intensity arrays.
    ///
    /// Fails with `LengthMismatch` when the arrays differ in length and with
    /// `NonMonotonicPeakList` when the m/z values are not in non-decreasing
    /// acquisition order; in both cases the spectrum is left untouched. The
    /// annotator relies on the ordering for its binary search, callers with
    /// unsorted data must sort before filling.
    ///
    /// # Example
    ///
    /// ```
    /// use anncore::data::spectrum::Spectrum;
    ///
    /// let mut spectrum = Spectrum::new();
    /// spectrum.fill(vec![100.0, 200.0], vec![500.0, 600.0], 418.2175, 2, None).unwrap();
    /// assert_eq!(spectrum.peak_list.len(), 2);
    /// assert_eq!(spectrum.charge_state(), Some(2));
    /// ```
    pub fn fill(
        &mut self,
        mzs: Vec<f64>,
        intensities: Vec<f64>,
        precursor_mz: f64,
        charge_state: i32,
        attributes: Option<Vec<(ScanAttribute, AttributeValue)>>,
    ) -> Result<()> {
        if mzs.len() != intensities.len() {
            return Err(AnnotatorError::LengthMismatch {
                mzs: mzs.len(),
                intensities: intensities.len(),
            });
        }
        for (index, window) in mzs.windows(2).enumerate() {
            if window[1] < window[0] {
                return Err(AnnotatorError::NonMonotonicPeakList {
                    index: index + 1,
                    mz: window[1],
                    previous: window[0],
                });
            }
        }

        self.peak_list = izip!(mzs.iter(), intensities.iter())
            .enumerate()
            .map(|(index, (&mz, &intensity))| Peak {
                index,
                mz,
                intensity,
                annotation: None,
            })
            .collect();

        self.attributes.insert(
            ScanAttribute::SelectedIonMz,
            AttributeValue::Float(precursor_mz),
        );
        self.attributes.insert(
            ScanAttribute::ChargeState,
            AttributeValue::Int(charge_state as i64),
        );
        self.attributes.insert(
            ScanAttribute::NumberOfPeaks,
            AttributeValue::Int(self.peak_list.len() as i64),
        );
        for (attribute, value) in attributes.unwrap_or_default() {
            self.attributes.insert(attribute, value);
        }
        Ok(())
    }

    pub fn precursor_mz(&self) -> Option<f64> {
        match self.attributes.get(&ScanAttribute::SelectedIonMz) {
            Some(AttributeValue::Float(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn charge_state(&self) -> Option<i32> {
        match self.attributes.get(&ScanAttribute::ChargeState) {
            Some(AttributeValue::Int(value)) => Some(*value as i32),
            _ => None,
        }
    }

    /// Human readable rendering of the peak list with the current
    /// annotations, unmatched peaks shown as `?`. Presentation only.
    pub fn show(&self) -> String {
        let mut out = String::new();
        for (attribute, value) in &self.attributes {
            out.push_str(&format!("# {} = {}\n", attribute, value));
        }
        out.push_str(&format!(
            "{:>5}  {:>12}  {:>12}  {}\n",
            "index", "m/z", "intensity", "annotation"
        ));
        for peak in &self.peak_list {
            let label = match &peak.annotation {
                Some(annotation) => annotation.label.as_str(),
                None => "?",
            };
            out.push_str(&format!(
                "{:>5}  {:>12.4}  {:>12.1}  {}\n",
                peak.index, peak.mz, peak.intensity, label
            ));
        }
        out
    }
}

/// Formats the `Spectrum` for display.
impl Display for Spectrum {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let base_peak = self
            .peak_list
            .iter()
            .max_by(|a, b| a.intensity.partial_cmp(&b.intensity).unwrap_or(std::cmp::Ordering::Equal));
        match base_peak {
            Some(peak) => write!(
                f,
                "Spectrum(data points: {}, max by intensity: ({:.4}, {}))",
                self.peak_list.len(),
                peak.mz,
                peak.intensity
            ),
            None => write!(f, "Spectrum(empty)"),
        }
    }
}
