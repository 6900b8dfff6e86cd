use crate::errors::SpectrumReadingError;
use crate::models::{
    ChargeState,
    MsmsSpectrum,
    Peak,
};
use mzdata::prelude::*;
use mzdata::spectrum::MultiLayerSpectrum;

/// Scan range of a spectrum.
///
/// Taken from an mgf `SCANS` entry, then from a `scan=` token of the native
/// id (mzML), falling back to the 1-based position in the file.
fn scan_range(spectrum: &MultiLayerSpectrum) -> (u32, u32) {
    let from_param = spectrum
        .params()
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case("scans"))
        .and_then(|p| {
            let value = p.value.to_string();
            let (first, last) = value
                .split_once('-')
                .unwrap_or((value.as_str(), value.as_str()));
            Some((first.trim().parse().ok()?, last.trim().parse().ok()?))
        });
    if let Some(range) = from_param {
        return range;
    }
    let from_id = spectrum
        .id()
        .split_whitespace()
        .find_map(|token| token.strip_prefix("scan="))
        .and_then(|n| n.parse().ok());
    let scan = from_id.unwrap_or(spectrum.index() as u32 + 1);
    (scan, scan)
}

/// Converts a spectrum read by `mzdata` into the form the matcher writes back.
///
/// Only centroided MS2 data can be carried over, other MS levels keep their
/// metadata and come without peaks.
pub fn convert_spectrum(
    mut spectrum: MultiLayerSpectrum,
) -> Result<MsmsSpectrum, SpectrumReadingError> {
    let (first_scan, last_scan) = scan_range(&spectrum);
    let precursor_mz = spectrum.precursor().map(|p| p.mz()).unwrap_or(0.0);
    let mut out = MsmsSpectrum::new(first_scan, last_scan, precursor_mz);
    out.ms_level = spectrum.ms_level();
    out.retention_time = spectrum.start_time() as f32;
    if !spectrum.id().is_empty() {
        out.title = Some(spectrum.id().to_string());
    }
    if let Some(precursor) = spectrum.precursor() {
        out.charge_states = precursor
            .ions
            .iter()
            .filter_map(|ion| ion.charge.map(|z| ChargeState::from_mz(z, ion.mz)))
            .collect();
    }
    if out.ms_level != 2 {
        return Ok(out);
    }

    let id = spectrum.id().to_string();
    let peaks = spectrum
        .try_build_centroids()
        .map_err(|_| SpectrumReadingError::Conversion {
            id,
            reason: "no centroided peak data",
        })?;
    out.peaks = peaks
        .iter()
        .map(|p| Peak {
            mz: p.mz,
            intensity: p.intensity,
        })
        .collect();
    Ok(out)
}

/// Adapts any `mzdata` spectrum source (mgf, mzML) to the spectrum stream
/// the pipeline consumes.
pub struct MzSpectrumReader<I: Iterator<Item = MultiLayerSpectrum>> {
    inner: I,
    finished: bool,
}

impl<I: Iterator<Item = MultiLayerSpectrum>> MzSpectrumReader<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            finished: false,
        }
    }
}

impl<I: Iterator<Item = MultiLayerSpectrum>> Iterator for MzSpectrumReader<I> {
    type Item = Result<MsmsSpectrum, SpectrumReadingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let res = convert_spectrum(self.inner.next()?);
        if res.is_err() {
            self.finished = true;
        }
        Some(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PROTON_MASS;
    use mzdata::MGFReader;

    const MGF: &str = "BEGIN IONS
TITLE=run.100.100.2
PEPMASS=501.0073 12000.0
CHARGE=2+
RTINSECONDS=600
SCANS=100
120.5 10
220.5 20
END IONS

BEGIN IONS
TITLE=second
PEPMASS=700.5
CHARGE=3+
300.0 5
END IONS
";

    #[test]
    fn test_read_mgf_through_mzdata() {
        let mut reader = MzSpectrumReader::new(MGFReader::new(MGF.as_bytes()));
        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.title.as_deref(), Some("run.100.100.2"));
        assert_eq!(first.ms_level, 2);
        assert_eq!((first.first_scan, first.last_scan), (100, 100));
        assert!((first.precursor_mz - 501.0073).abs() < 1e-6);
        assert!((first.retention_time - 10.0).abs() < 1e-4);
        assert_eq!(first.peaks.len(), 2);
        assert_eq!(first.charge_states.len(), 1);
        let mh = first.charge_states[0].mh;
        assert!((mh - (501.0073 * 2.0 - PROTON_MASS)).abs() < 1e-6);

        let second = reader.next().unwrap().unwrap();
        // No SCANS entry, numbered by position
        assert_eq!(second.first_scan, 2);
        assert_eq!(second.charge_states[0].charge, 3);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_scan_number_from_native_id() {
        let mut spectrum = MultiLayerSpectrum::default();
        spectrum.description.id = "controllerType=0 controllerNumber=1 scan=4321".to_string();
        spectrum.description.index = 7;
        spectrum.description.ms_level = 1;
        let converted = convert_spectrum(spectrum).unwrap();
        assert_eq!((converted.first_scan, converted.last_scan), (4321, 4321));
        assert_eq!(converted.ms_level, 1);
        assert!(converted.peaks.is_empty());

        let mut spectrum = MultiLayerSpectrum::default();
        spectrum.description.index = 7;
        spectrum.description.ms_level = 1;
        assert_eq!(convert_spectrum(spectrum).unwrap().first_scan, 8);
    }
}
