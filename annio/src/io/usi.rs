use std::fmt;
use std::fmt::{Display, Formatter};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures of universal spectrum identifier strings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UsiError {
    #[error("a universal spectrum identifier must start with the scheme 'mzspec', found {found:?}")]
    InvalidScheme { found: String },

    #[error("universal spectrum identifier is missing its {field} field")]
    MissingField { field: &'static str },

    #[error("the {field} field of a universal spectrum identifier must not be empty")]
    EmptyField { field: &'static str },

    #[error("the index type must be one of scan, index or nativeId, found {found:?}")]
    InvalidIndexType { found: String },

    #[error("unparseable charge {text:?} in the interpretation field")]
    InvalidCharge { text: String },
}

/// How the index field addresses a spectrum within its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsiIndexType {
    Scan,
    Index,
    NativeId,
}

impl Display for UsiIndexType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            UsiIndexType::Scan => write!(f, "scan"),
            UsiIndexType::Index => write!(f, "index"),
            UsiIndexType::NativeId => write!(f, "nativeId"),
        }
    }
}

/// A validated universal spectrum identifier of the form
/// `mzspec:{collection}:{run}:{index type}:{index}[:{interpretation}[/charge]]`.
///
/// Validation is purely lexical, nothing is fetched. The optional
/// interpretation carries the peptidoform notation consumed by the
/// annotation core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniversalSpectrumIdentifier {
    pub usi_string: String,
    pub collection: String,
    pub ms_run_name: String,
    pub index_type: UsiIndexType,
    pub index: String,
    pub interpretation: Option<String>,
    pub peptidoform_string: Option<String>,
    pub charge: Option<i32>,
}

impl UniversalSpectrumIdentifier {
    /// Parse and validate a universal spectrum identifier string.
    ///
    /// # Example
    ///
    /// ```
    /// use annio::io::usi::UniversalSpectrumIdentifier;
    ///
    /// let usi = UniversalSpectrumIdentifier::parse(
    ///     "mzspec:PXD015223:QExHF06277:scan:4202:HAEEQPTM[Oxidation]PR/2",
    /// ).unwrap();
    /// assert_eq!(usi.collection, "PXD015223");
    /// assert_eq!(usi.peptidoform_string.as_deref(), Some("HAEEQPTM[Oxidation]PR"));
    /// assert_eq!(usi.charge, Some(2));
    /// ```
    pub fn parse(usi_string: &str) -> Result<Self, UsiError> {
        let parts: Vec<&str> = usi_string.split(':').collect();

        if parts[0] != "mzspec" {
            return Err(UsiError::InvalidScheme {
                found: parts[0].to_owned(),
            });
        }

        let collection = field(&parts, 1, "collection")?;
        let ms_run_name = field(&parts, 2, "ms run name")?;
        let index_type = match field(&parts, 3, "index type")? {
            "scan" => UsiIndexType::Scan,
            "index" => UsiIndexType::Index,
            "nativeId" => UsiIndexType::NativeId,
            found => {
                return Err(UsiError::InvalidIndexType {
                    found: found.to_owned(),
                })
            }
        };
        let index = field(&parts, 4, "index")?;

        // The interpretation may itself contain colons (UNIMOD accessions),
        // everything past the index belongs to it
        let interpretation = if parts.len() > 5 {
            let joined = parts[5..].join(":");
            if joined.is_empty() {
                return Err(UsiError::EmptyField {
                    field: "interpretation",
                });
            }
            Some(joined)
        } else {
            None
        };

        let (peptidoform_string, charge) = match &interpretation {
            Some(interpretation) => match interpretation.rsplit_once('/') {
                Some((sequence, charge_text)) => {
                    let charge: i32 = charge_text.parse().map_err(|_| UsiError::InvalidCharge {
                        text: charge_text.to_owned(),
                    })?;
                    if charge <= 0 {
                        return Err(UsiError::InvalidCharge {
                            text: charge_text.to_owned(),
                        });
                    }
                    (Some(sequence.to_owned()), Some(charge))
                }
                None => (Some(interpretation.clone()), None),
            },
            None => (None, None),
        };

        debug!(
            "parsed universal spectrum identifier for collection {} run {}",
            collection, ms_run_name
        );

        Ok(UniversalSpectrumIdentifier {
            usi_string: usi_string.to_owned(),
            collection: collection.to_owned(),
            ms_run_name: ms_run_name.to_owned(),
            index_type,
            index: index.to_owned(),
            interpretation,
            peptidoform_string,
            charge,
        })
    }
}

impl Display for UniversalSpectrumIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.usi_string)
    }
}

fn field<'a>(parts: &[&'a str], position: usize, name: &'static str) -> Result<&'a str, UsiError> {
    match parts.get(position) {
        Some(&part) if !part.is_empty() => Ok(part),
        Some(_) => Err(UsiError::EmptyField { field: name }),
        None => Err(UsiError::MissingField { field: name }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_identifier_with_interpretation() {
        let usi = UniversalSpectrumIdentifier::parse(
            "mzspec:PXD005336:Varlitinib_01410_A01_P014203_B00_A00_R1:scan:19343:LLSILSR/2",
        )
        .unwrap();
        assert_eq!(usi.collection, "PXD005336");
        assert_eq!(usi.ms_run_name, "Varlitinib_01410_A01_P014203_B00_A00_R1");
        assert_eq!(usi.index_type, UsiIndexType::Scan);
        assert_eq!(usi.index, "19343");
        assert_eq!(usi.peptidoform_string.as_deref(), Some("LLSILSR"));
        assert_eq!(usi.charge, Some(2));
    }

    #[test]
    fn interpretation_with_unimod_accession_keeps_its_colon() {
        let usi = UniversalSpectrumIdentifier::parse(
            "mzspec:PXD006201:20150913SL_Qe2_HEP2:scan:04132:SDGVSPK[UNIMOD:121]HVGR/3",
        )
        .unwrap();
        assert_eq!(
            usi.peptidoform_string.as_deref(),
            Some("SDGVSPK[UNIMOD:121]HVGR")
        );
        assert_eq!(usi.charge, Some(3));
    }

    #[test]
    fn identifier_without_interpretation() {
        let usi =
            UniversalSpectrumIdentifier::parse("mzspec:PXD000561:Adult_Frontalcortex:scan:12");
        let usi = usi.unwrap();
        assert_eq!(usi.interpretation, None);
        assert_eq!(usi.peptidoform_string, None);
        assert_eq!(usi.charge, None);
    }

    #[test]
    fn wrong_scheme_is_rejected() {
        let result = UniversalSpectrumIdentifier::parse("mzdata:PXD000561:run:scan:12");
        assert_eq!(
            result,
            Err(UsiError::InvalidScheme {
                found: "mzdata".to_string()
            })
        );
    }

    #[test]
    fn missing_and_empty_fields_are_rejected() {
        assert_eq!(
            UniversalSpectrumIdentifier::parse("mzspec:PXD000561:run:scan"),
            Err(UsiError::MissingField { field: "index" })
        );
        assert_eq!(
            UniversalSpectrumIdentifier::parse("mzspec::run:scan:12"),
            Err(UsiError::EmptyField {
                field: "collection"
            })
        );
    }

    #[test]
    fn unknown_index_type_is_rejected() {
        let result = UniversalSpectrumIdentifier::parse("mzspec:PXD000561:run:frame:12");
        assert_eq!(
            result,
            Err(UsiError::InvalidIndexType {
                found: "frame".to_string()
            })
        );
    }

    #[test]
    fn malformed_charge_is_rejected() {
        let result =
            UniversalSpectrumIdentifier::parse("mzspec:PXD000561:run:scan:12:PEPTIDE/two");
        assert_eq!(
            result,
            Err(UsiError::InvalidCharge {
                text: "two".to_string()
            })
        );
        let result = UniversalSpectrumIdentifier::parse("mzspec:PXD000561:run:scan:12:PEPTIDE/0");
        assert_eq!(
            result,
            Err(UsiError::InvalidCharge {
                text: "0".to_string()
            })
        );
    }
}
