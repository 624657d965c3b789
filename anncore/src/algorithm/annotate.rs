use log::debug;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::algorithm::fragment::{IonSeriesGenerator, TheoreticalIon};
use crate::data::peptide::Peptidoform;
use crate::data::spectrum::{PeakAnnotation, Spectrum};
use crate::errors::Result;

/// Matching tolerance with an absolute and a relative component. An observed
/// and a theoretical m/z match when their distance is strictly below
/// `max(da, observed_mz * ppm * 1e-6)`, so an ion sitting exactly on the
/// window edge does not match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tolerance {
    pub da: f64,
    pub ppm: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance { da: 0.01, ppm: 10.0 }
    }
}

impl Tolerance {
    pub fn new(da: f64, ppm: f64) -> Self {
        Tolerance { da, ppm }
    }

    /// Width of the matching window at the given observed m/z.
    pub fn window(&self, observed_mz: f64) -> f64 {
        self.da.max(observed_mz * self.ppm * 1e-6)
    }

    /// Whether an observed m/z falls within tolerance of a theoretical m/z.
    ///
    /// # Example
    ///
    /// ```
    /// use anncore::algorithm::annotate::Tolerance;
    ///
    /// let tolerance = Tolerance::new(0.25, 0.0);
    /// assert!(tolerance.contains(500.25 - 0.001, 500.0));
    /// assert!(!tolerance.contains(500.25, 500.0));
    /// ```
    pub fn contains(&self, theoretical_mz: f64, observed_mz: f64) -> bool {
        (observed_mz - theoretical_mz).abs() < self.window(observed_mz)
    }

    // Radius around a theoretical m/z that covers every peak whose own
    // window could still contain it. The window is evaluated at the observed
    // m/z, so the relative component is widened accordingly.
    fn search_radius(&self, theoretical_mz: f64) -> f64 {
        let relative = self.ppm * 1e-6;
        self.da.max(theoretical_mz * relative / (1.0 - relative))
    }
}

/// One theoretical-observed pairing within tolerance. Transient: consumed by
/// the resolution step and exposed for introspection, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotationMatch {
    pub peak_index: usize,
    /// Index into the ion pool of the call that produced this match.
    pub ion_index: usize,
    /// Observed minus theoretical m/z.
    pub mass_error_da: f64,
    pub mass_error_ppm: f64,
}

/// Everything one annotation call computed: the merged theoretical ion pool
/// and the full match table, before ambiguity resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationResult {
    pub ion_pool: Vec<TheoreticalIon>,
    pub matches: Vec<AnnotationMatch>,
}

/// Annotates observed spectra with theoretical fragment ion identities.
///
/// One call builds the merged ion table for all candidate peptidoforms,
/// matches it against the peak list and writes the winning interpretation
/// onto each peak. Only peak annotations are mutated, m/z, intensity and the
/// scan attributes are left untouched, and every annotation slot is
/// rewritten on each pass so repeated calls do not accumulate labels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpectrumAnnotator {
    pub generator: IonSeriesGenerator,
    pub tolerance: Tolerance,
}

impl SpectrumAnnotator {
    pub fn new() -> Self {
        SpectrumAnnotator::default()
    }

    pub fn with_config(generator: IonSeriesGenerator, tolerance: Tolerance) -> Self {
        SpectrumAnnotator {
            generator,
            tolerance,
        }
    }

    /// Annotate a spectrum against candidate peptidoforms with their
    /// associated charge states.
    ///
    /// Fails with `InvalidCharge` before any peak is touched when a
    /// candidate charge is not positive. Absence of matches is not an error,
    /// unmatched peaks keep the `None` annotation.
    ///
    /// # Example
    ///
    /// ```
    /// use anncore::algorithm::annotate::SpectrumAnnotator;
    /// use anncore::data::peptide::Peptidoform;
    /// use anncore::data::spectrum::Spectrum;
    ///
    /// let mut spectrum = Spectrum::new();
    /// spectrum.fill(vec![227.1026, 500.0], vec![100.0, 10.0], 400.6873, 2, None).unwrap();
    /// let peptidoform = Peptidoform::parse("PEPTIDE").unwrap();
    ///
    /// let annotator = SpectrumAnnotator::new();
    /// annotator.annotate(&mut spectrum, &[(peptidoform, 2)]).unwrap();
    /// let annotation = spectrum.peak_list[0].annotation.as_ref().unwrap();
    /// assert_eq!(annotation.label, "b2");
    /// assert!(spectrum.peak_list[1].annotation.is_none());
    /// ```
    pub fn annotate(
        &self,
        spectrum: &mut Spectrum,
        candidates: &[(Peptidoform, i32)],
    ) -> Result<AnnotationResult> {
        // Table build across candidates, merged in candidate order. Errors
        // surface here, before any peak is mutated.
        let tables: Result<Vec<Vec<TheoreticalIon>>> = candidates
            .par_iter()
            .enumerate()
            .map(|(index, (peptidoform, charge))| {
                self.generator.generate(peptidoform, *charge, index)
            })
            .collect();
        let ion_pool: Vec<TheoreticalIon> = tables?.into_iter().flatten().collect();
        debug!(
            "built {} theoretical ions from {} candidate peptidoforms",
            ion_pool.len(),
            candidates.len()
        );

        let matches = self.match_ions(&ion_pool, spectrum);
        debug!(
            "{} matches across {} peaks",
            matches.len(),
            spectrum.peak_list.len()
        );

        let mut per_peak: Vec<Vec<usize>> = vec![Vec::new(); spectrum.peak_list.len()];
        for (match_index, m) in matches.iter().enumerate() {
            per_peak[m.peak_index].push(match_index);
        }

        // Each peak owns its own annotation slot, resolution is independent
        spectrum
            .peak_list
            .par_iter_mut()
            .zip(per_peak.par_iter())
            .for_each(|(peak, match_ids)| {
                peak.annotation = resolve(&ion_pool, &matches, match_ids);
            });

        Ok(AnnotationResult { ion_pool, matches })
    }

    // For every ion, binary search the sorted peak list for the window
    // start, then scan forward. One ion may match several peaks.
    fn match_ions(&self, ion_pool: &[TheoreticalIon], spectrum: &Spectrum) -> Vec<AnnotationMatch> {
        let peaks = &spectrum.peak_list;
        let mut matches = Vec::new();
        for (ion_index, ion) in ion_pool.iter().enumerate() {
            let radius = self.tolerance.search_radius(ion.mz);
            let lower = ion.mz - radius;
            let start = peaks.partition_point(|peak| peak.mz < lower);
            for peak in &peaks[start..] {
                if peak.mz > ion.mz + radius {
                    break;
                }
                if self.tolerance.contains(ion.mz, peak.mz) {
                    let error = peak.mz - ion.mz;
                    matches.push(AnnotationMatch {
                        peak_index: peak.index,
                        ion_index,
                        mass_error_da: error,
                        mass_error_ppm: error / ion.mz * 1e6,
                    });
                }
            }
        }
        matches
    }
}

// Rank the matches of one peak and turn the winner into its annotation.
// Ties on absolute mass error resolve by the fixed series priority, then
// lower charge, then lexicographic label order.
fn resolve(
    ion_pool: &[TheoreticalIon],
    matches: &[AnnotationMatch],
    match_ids: &[usize],
) -> Option<PeakAnnotation> {
    if match_ids.is_empty() {
        return None;
    }
    let mut ranked: Vec<&AnnotationMatch> = match_ids.iter().map(|&i| &matches[i]).collect();
    ranked.sort_by(|a, b| {
        let ion_a = &ion_pool[a.ion_index];
        let ion_b = &ion_pool[b.ion_index];
        (
            OrderedFloat(a.mass_error_da.abs()),
            ion_a.series.priority(),
            ion_a.charge,
            &ion_a.label,
        )
            .cmp(&(
                OrderedFloat(b.mass_error_da.abs()),
                ion_b.series.priority(),
                ion_b.charge,
                &ion_b.label,
            ))
    });

    let best = ranked[0];
    let best_ion = &ion_pool[best.ion_index];
    Some(PeakAnnotation {
        label: best_ion.label.clone(),
        mass_error_da: best.mass_error_da,
        mass_error_ppm: best.mass_error_ppm,
        alternatives: ranked[1..]
            .iter()
            .map(|m| ion_pool[m.ion_index].label.clone())
            .collect(),
    })
}

/// Annotate a collection of spectra against per-spectrum candidate lists on
/// a thread pool of the given size. Spectra and candidate lists are paired
/// positionally.
pub fn annotate_collection(
    annotator: &SpectrumAnnotator,
    spectra: &mut [Spectrum],
    candidates: &[Vec<(Peptidoform, i32)>],
    num_threads: usize,
) -> Result<Vec<AnnotationResult>> {
    let thread_pool = ThreadPoolBuilder::new().num_threads(num_threads).build().unwrap();
    thread_pool.install(|| {
        spectra
            .par_iter_mut()
            .zip(candidates.par_iter())
            .map(|(spectrum, spectrum_candidates)| annotator.annotate(spectrum, spectrum_candidates))
            .collect()
    })
}
