use anncore::algorithm::annotate::SpectrumAnnotator;
use anncore::data::peptide::Peptidoform;
use anncore::data::spectrum::Spectrum;

fn main() {
    let mzs = vec![147.1134, 175.1190, 227.1026, 440.6704];
    let intensities = vec![100.0, 45.2, 78.9, 23.1];

    let mut spectrum = Spectrum::new();
    spectrum.fill(mzs, intensities, 440.6704, 2, None).unwrap();

    let peptidoform = Peptidoform::parse("PEPT[Phospho]IDE").unwrap();
    let annotator = SpectrumAnnotator::new();
    annotator.annotate(&mut spectrum, &[(peptidoform, 2)]).unwrap();

    print!("{}", spectrum.show());
}
