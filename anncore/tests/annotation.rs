use anncore::algorithm::annotate::SpectrumAnnotator;
use anncore::algorithm::fragment::IonSeriesGenerator;
use anncore::data::peptide::Peptidoform;
use anncore::data::spectrum::{AttributeValue, ScanAttribute, Spectrum};

fn filled(mzs: Vec<f64>) -> Spectrum {
    let intensities = vec![100.0; mzs.len()];
    let mut spectrum = Spectrum::new();
    spectrum
        .fill(
            mzs,
            intensities,
            440.6704,
            2,
            Some(vec![(
                ScanAttribute::SpectrumTitle,
                AttributeValue::Text("synthetic".to_string()),
            )]),
        )
        .unwrap();
    spectrum
}

#[test]
fn phospho_peptide_scenario() {
    // 147.1134 sits far from every PEPT[Phospho]IDE fragment, while the
    // second peak is the b2 ion of the unmodified PE prefix
    let mut spectrum = filled(vec![147.1134, 227.1026]);
    let peptidoform = Peptidoform::parse("PEPT[Phospho]IDE").unwrap();

    let annotator = SpectrumAnnotator::with_config(
        IonSeriesGenerator::exhaustive(),
        Default::default(),
    );
    annotator.annotate(&mut spectrum, &[(peptidoform, 2)]).unwrap();

    assert!(spectrum.peak_list[0].annotation.is_none());
    let annotation = spectrum.peak_list[1].annotation.as_ref().unwrap();
    assert_eq!(annotation.label, "b2");
    assert!(annotation.mass_error_da.abs() < 0.01);
}

#[test]
fn annotation_results_are_reproducible() {
    let peptidoform = Peptidoform::parse("PEPT[Phospho]IDER").unwrap();
    let annotator = SpectrumAnnotator::new();

    let mut first = filled(vec![175.1190, 227.1026, 600.0]);
    let mut second = filled(vec![175.1190, 227.1026, 600.0]);
    let result_a = annotator.annotate(&mut first, &[(peptidoform.clone(), 2)]).unwrap();
    let result_b = annotator.annotate(&mut second, &[(peptidoform, 2)]).unwrap();

    assert_eq!(result_a.matches, result_b.matches);
    let labels = |spectrum: &Spectrum| {
        spectrum
            .peak_list
            .iter()
            .map(|p| p.annotation.as_ref().map(|a| a.label.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(labels(&first), labels(&second));
}

#[test]
fn candidate_pool_is_tagged_by_peptidoform() {
    // 175.1190 is y1 of the arginine-terminated candidate only
    let mut spectrum = filled(vec![175.1190, 227.1026]);
    let with_arg = Peptidoform::parse("PEPTIDER").unwrap();
    let without_arg = Peptidoform::parse("PEPTIDE").unwrap();

    let annotator = SpectrumAnnotator::new();
    let result = annotator
        .annotate(&mut spectrum, &[(without_arg, 1), (with_arg, 1)])
        .unwrap();

    let y1_match = result
        .matches
        .iter()
        .find(|m| m.peak_index == 0)
        .expect("y1 of PEPTIDER should match");
    assert_eq!(result.ion_pool[y1_match.ion_index].peptidoform_index, 1);
    assert_eq!(
        spectrum.peak_list[0].annotation.as_ref().unwrap().label,
        "y1"
    );
    // the shared b2 prefix is produced by both candidates, the second
    // interpretation is kept as an alternative
    let b2 = spectrum.peak_list[1].annotation.as_ref().unwrap();
    assert_eq!(b2.label, "b2");
    assert_eq!(b2.alternatives, vec!["b2".to_string()]);
}

#[test]
fn show_renders_labels_and_placeholders() {
    let mut spectrum = filled(vec![227.1026, 600.0]);
    let peptidoform = Peptidoform::parse("PEPTIDE").unwrap();

    let annotator = SpectrumAnnotator::new();
    annotator.annotate(&mut spectrum, &[(peptidoform, 1)]).unwrap();

    let rendering = spectrum.show();
    assert!(rendering.contains("spectrum title = synthetic"));
    assert!(rendering.contains("b2"));
    assert!(rendering.lines().any(|line| line.ends_with('?')));
}
