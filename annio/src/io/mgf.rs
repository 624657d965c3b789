use anncore::data::spectrum::{AttributeValue, ScanAttribute, Spectrum};
use anncore::errors::AnnotatorError;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Failures while importing MGF style peak list text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MgfError {
    #[error("peak line {line_number} is malformed: {line:?}")]
    MalformedPeakLine { line_number: usize, line: String },

    #[error("unparseable {key} value {value:?} on line {line_number}")]
    MalformedHeader {
        key: String,
        value: String,
        line_number: usize,
    },

    #[error("END IONS on line {line_number} has no matching BEGIN IONS")]
    UnexpectedEnd { line_number: usize },

    #[error("unterminated BEGIN IONS block starting at line {line_number}")]
    UnterminatedBlock { line_number: usize },

    #[error("block {title:?} is missing a {field} header")]
    MissingHeader { title: String, field: &'static str },

    #[error(transparent)]
    Spectrum(#[from] AnnotatorError),
}

/// One `BEGIN IONS`/`END IONS` block: scan headers plus the parallel peak
/// arrays, a pure transform on the way into [`Spectrum::fill`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MgfRecord {
    pub title: Option<String>,
    pub precursor_mz: Option<f64>,
    pub charge: Option<i32>,
    pub comments: Vec<String>,
    pub mzs: Vec<f64>,
    pub intensities: Vec<f64>,
}

impl MgfRecord {
    /// Build a [`Spectrum`] from this record.
    ///
    /// Requires the precursor m/z and charge headers to be present, the
    /// peak arrays are handed to `fill` unchanged so its length and ordering
    /// validation applies.
    pub fn to_spectrum(&self) -> Result<Spectrum, MgfError> {
        let precursor_mz = self.precursor_mz.ok_or_else(|| MgfError::MissingHeader {
            title: self.title.clone().unwrap_or_default(),
            field: "PEPMASS",
        })?;
        let charge = self.charge.ok_or_else(|| MgfError::MissingHeader {
            title: self.title.clone().unwrap_or_default(),
            field: "CHARGE",
        })?;

        let mut attributes = Vec::new();
        if let Some(title) = &self.title {
            attributes.push((
                ScanAttribute::SpectrumTitle,
                AttributeValue::Text(title.clone()),
            ));
        }

        let mut spectrum = Spectrum::new();
        spectrum.fill(
            self.mzs.clone(),
            self.intensities.clone(),
            precursor_mz,
            charge,
            Some(attributes),
        )?;
        Ok(spectrum)
    }
}

/// Parse MGF text into one record per `BEGIN IONS`/`END IONS` block.
///
/// Recognized headers are `TITLE`, `PEPMASS` (first token), `PRECURSOR`
/// (overrides `PEPMASS`), `CHARGE` (`3+`, `2-`) and `COM`; other headers are
/// ignored. Peak lines carry whitespace separated m/z and intensity columns.
///
/// # Example
///
/// ```
/// use annio::io::mgf::parse_mgf;
///
/// let text = "BEGIN IONS\nTITLE=demo\nPEPMASS=418.2175\nCHARGE=2+\n101.07 1467.2\nEND IONS\n";
/// let records = parse_mgf(text).unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].charge, Some(2));
/// ```
pub fn parse_mgf(text: &str) -> Result<Vec<MgfRecord>, MgfError> {
    let charge_pattern = Regex::new(r"^(\d+)([+-])?$").unwrap();

    let mut records = Vec::new();
    let mut current: Option<MgfRecord> = None;
    let mut block_start = 0;

    for (line_index, raw_line) in text.lines().enumerate() {
        let line_number = line_index + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if line == "BEGIN IONS" {
            if current.is_some() {
                return Err(MgfError::UnterminatedBlock {
                    line_number: block_start,
                });
            }
            block_start = line_number;
            current = Some(MgfRecord::default());
            continue;
        }
        if line == "END IONS" {
            match current.take() {
                Some(record) => records.push(record),
                None => return Err(MgfError::UnexpectedEnd { line_number }),
            }
            continue;
        }

        let record = match current.as_mut() {
            Some(record) => record,
            None => {
                warn!("skipping content outside of a BEGIN IONS block on line {}", line_number);
                continue;
            }
        };

        if let Some((key, value)) = line.split_once('=') {
            match key {
                "TITLE" => record.title = Some(value.to_owned()),
                "PEPMASS" => {
                    // PEPMASS may carry an intensity in its second column and
                    // is superseded by an explicit PRECURSOR header
                    if record.precursor_mz.is_none() {
                        let first = value.split_whitespace().next().unwrap_or(value);
                        record.precursor_mz =
                            Some(first.parse().map_err(|_| MgfError::MalformedHeader {
                                key: key.to_owned(),
                                value: value.to_owned(),
                                line_number,
                            })?);
                    }
                }
                "PRECURSOR" => {
                    record.precursor_mz =
                        Some(value.parse().map_err(|_| MgfError::MalformedHeader {
                            key: key.to_owned(),
                            value: value.to_owned(),
                            line_number,
                        })?);
                }
                "CHARGE" => {
                    let captures =
                        charge_pattern
                            .captures(value)
                            .ok_or_else(|| MgfError::MalformedHeader {
                                key: key.to_owned(),
                                value: value.to_owned(),
                                line_number,
                            })?;
                    let magnitude: i32 =
                        captures[1].parse().map_err(|_| MgfError::MalformedHeader {
                            key: key.to_owned(),
                            value: value.to_owned(),
                            line_number,
                        })?;
                    let sign = match captures.get(2).map(|m| m.as_str()) {
                        Some("-") => -1,
                        _ => 1,
                    };
                    record.charge = Some(sign * magnitude);
                }
                "COM" => record.comments.push(value.to_owned()),
                _ => debug!("ignoring header {} on line {}", key, line_number),
            }
        } else {
            let mut columns = line.split_whitespace();
            let mz: f64 = columns
                .next()
                .and_then(|column| column.parse().ok())
                .ok_or_else(|| MgfError::MalformedPeakLine {
                    line_number,
                    line: line.to_owned(),
                })?;
            let intensity: f64 = columns
                .next()
                .and_then(|column| column.parse().ok())
                .ok_or_else(|| MgfError::MalformedPeakLine {
                    line_number,
                    line: line.to_owned(),
                })?;
            record.mzs.push(mz);
            record.intensities.push(intensity);
        }
    }

    if current.is_some() {
        return Err(MgfError::UnterminatedBlock {
            line_number: block_start,
        });
    }
    Ok(records)
}

/// Render records as a PROXI style JSON document: per spectrum an attribute
/// list keyed by controlled-vocabulary accession plus the peak arrays.
pub fn to_proxi_json(records: &[MgfRecord]) -> serde_json::Result<String> {
    let spectra: Vec<serde_json::Value> = records
        .iter()
        .map(|record| {
            let mut attributes = Vec::new();
            if let Some(charge) = record.charge {
                attributes.push(json!({
                    "accession": ScanAttribute::ChargeState.accession(),
                    "name": ScanAttribute::ChargeState.name(),
                    "value": charge,
                }));
            }
            if let Some(precursor_mz) = record.precursor_mz {
                attributes.push(json!({
                    "accession": ScanAttribute::SelectedIonMz.accession(),
                    "name": ScanAttribute::SelectedIonMz.name(),
                    "value": precursor_mz,
                }));
            }
            if let Some(title) = &record.title {
                attributes.push(json!({
                    "accession": ScanAttribute::SpectrumTitle.accession(),
                    "name": ScanAttribute::SpectrumTitle.name(),
                    "value": title,
                }));
            }
            json!({
                "attributes": attributes,
                "mzs": record.mzs,
                "intensities": record.intensities,
            })
        })
        .collect();
    serde_json::to_string_pretty(&spectra)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "BEGIN IONS\n\
TITLE=Spectrum 1\n\
PRECURSOR=418.2175\n\
PEPMASS=1251.63067059936\n\
CHARGE=3+\n\
COM=mzspec:PXD006201:20150913SL_Qe2_HEP2:scan:04132:SDGVSPK[UNIMOD:121]HVGR/3\n\
101.0714\t1467.2856\n\
102.0552\t1873.2421\n\
105.066   1440.8665\n\
END IONS";

    #[test]
    fn sample_block_is_parsed() {
        let records = parse_mgf(SAMPLE).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.title.as_deref(), Some("Spectrum 1"));
        // the explicit PRECURSOR header wins over PEPMASS
        assert_eq!(record.precursor_mz, Some(418.2175));
        assert_eq!(record.charge, Some(3));
        assert_eq!(record.comments.len(), 1);
        assert_eq!(record.mzs.len(), 3);
        assert_eq!(record.intensities.len(), 3);
        assert!((record.mzs[2] - 105.066).abs() < 1e-9);
    }

    #[test]
    fn record_converts_to_spectrum() {
        let records = parse_mgf(SAMPLE).unwrap();
        let spectrum = records[0].to_spectrum().unwrap();
        assert_eq!(spectrum.peak_list.len(), 3);
        assert_eq!(spectrum.precursor_mz(), Some(418.2175));
        assert_eq!(spectrum.charge_state(), Some(3));
    }

    #[test]
    fn pepmass_alone_sets_the_precursor() {
        let text = "BEGIN IONS\nPEPMASS=512.25 1000.0\nCHARGE=2+\n100.0 1.0\nEND IONS";
        let records = parse_mgf(text).unwrap();
        assert_eq!(records[0].precursor_mz, Some(512.25));
    }

    #[test]
    fn negative_charge_token() {
        let text = "BEGIN IONS\nPEPMASS=512.25\nCHARGE=2-\n100.0 1.0\nEND IONS";
        let records = parse_mgf(text).unwrap();
        assert_eq!(records[0].charge, Some(-2));
    }

    #[test]
    fn multiple_blocks_yield_multiple_records() {
        let text = "BEGIN IONS\nPEPMASS=100.0\nCHARGE=1+\n50.0 1.0\nEND IONS\n\
BEGIN IONS\nPEPMASS=200.0\nCHARGE=2+\n60.0 1.0\nEND IONS";
        let records = parse_mgf(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].precursor_mz, Some(200.0));
    }

    #[test]
    fn malformed_peak_line_is_rejected() {
        let text = "BEGIN IONS\nPEPMASS=100.0\n50.0\nEND IONS";
        let result = parse_mgf(text);
        assert!(matches!(
            result,
            Err(MgfError::MalformedPeakLine { line_number: 3, .. })
        ));
    }

    #[test]
    fn unterminated_block_is_rejected() {
        let text = "BEGIN IONS\nPEPMASS=100.0\n50.0 1.0";
        assert_eq!(
            parse_mgf(text),
            Err(MgfError::UnterminatedBlock { line_number: 1 })
        );
    }

    #[test]
    fn stray_end_is_rejected() {
        let text = "END IONS";
        assert_eq!(parse_mgf(text), Err(MgfError::UnexpectedEnd { line_number: 1 }));
    }

    #[test]
    fn missing_charge_blocks_spectrum_conversion() {
        let text = "BEGIN IONS\nTITLE=t\nPEPMASS=100.0\n50.0 1.0\nEND IONS";
        let records = parse_mgf(text).unwrap();
        assert_eq!(
            records[0].to_spectrum(),
            Err(MgfError::MissingHeader {
                title: "t".to_string(),
                field: "CHARGE"
            })
        );
    }

    #[test]
    fn proxi_json_carries_accessions() {
        let records = parse_mgf(SAMPLE).unwrap();
        let json = to_proxi_json(&records).unwrap();
        assert!(json.contains("MS:1000041"));
        assert!(json.contains("MS:1000744"));
        assert!(json.contains("418.2175"));
    }
}
