use anncore::algorithm::annotate::SpectrumAnnotator;
use anncore::data::peptide::Peptidoform;
use annio::io::mgf::parse_mgf;
use annio::io::usi::UniversalSpectrumIdentifier;

const MGF: &str = "BEGIN IONS\n\
TITLE=Spectrum 1\n\
PEPMASS=483.59075\n\
CHARGE=3+\n\
COM=mzspec:PXD006201:20150913SL_Qe2_HEP2:scan:04132:SDGVSPK[UNIMOD:121]HVGR/3\n\
101.0714 1467.2856\n\
175.1190 1873.2421\n\
END IONS";

// MGF block -> spectrum, COM header -> identifier -> peptidoform, then the
// annotation core ties both ends together.
#[test]
fn mgf_and_usi_feed_the_annotator() {
    let records = parse_mgf(MGF).unwrap();
    let mut spectrum = records[0].to_spectrum().unwrap();
    assert_eq!(spectrum.peak_list.len(), 2);

    let usi = UniversalSpectrumIdentifier::parse(&records[0].comments[0]).unwrap();
    let notation = usi.peptidoform_string.as_deref().unwrap();
    let peptidoform = Peptidoform::parse(notation).unwrap();
    let charge = usi.charge.unwrap();
    assert_eq!(charge, 3);

    let annotator = SpectrumAnnotator::new();
    let result = annotator
        .annotate(&mut spectrum, &[(peptidoform, charge)])
        .unwrap();
    assert!(!result.ion_pool.is_empty());

    // the second peak is the y1 ion of the arginine C-terminus
    let annotation = spectrum.peak_list[1].annotation.as_ref().unwrap();
    assert_eq!(annotation.label, "y1");
    assert!(annotation.mass_error_da.abs() < 0.01);

    // annotation never touches the observed values
    assert_eq!(spectrum.peak_list[0].mz, 101.0714);
    assert_eq!(spectrum.peak_list[1].intensity, 1873.2421);
}
