use crate::errors::{
    KronikError,
    Result,
};
use crate::models::{
    Detection,
    Modifications,
    ScanRecord,
};
use crate::store::ScanDetectionStore;
use csv::StringRecord;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

const SCAN_FIELDS: usize = 4;
const DETECTION_FIELDS: usize = 9;

/// Reads a Hardklör style detection feed.
///
/// The feed is a sequence of tab separated lines, a scan header
/// `S  scan  rt  file` followed by the detections of that scan
/// `P  monoMass  charge  intensity  basePeak  low-high  aux  mods  corr`.
pub fn read_detection_feed<T: AsRef<Path>>(path: T) -> Result<ScanDetectionStore> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| KronikError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    info!("Reading detections from {}", path.display());
    parse_detection_feed(file, &path.display().to_string())
}

/// Same as [`read_detection_feed`] over any reader, `source_name` is
/// only used in error messages.
pub fn parse_detection_feed<R: Read>(reader: R, source_name: &str) -> Result<ScanDetectionStore> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut store = ScanDetectionStore::default();
    let mut current: Option<ScanRecord> = None;
    let mut num_detections = 0usize;
    let mut record = StringRecord::new();

    while rdr.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let tag = record.get(0).map(str::trim).unwrap_or("");
        match tag {
            "" if record.len() <= 1 => continue,
            "S" => {
                if let Some(done) = current.take() {
                    store.push(done);
                }
                current = Some(parse_scan_line(&record, source_name, line)?);
            }
            "P" => {
                let Some(scan) = current.as_mut() else {
                    return Err(KronikError::malformed(
                        source_name,
                        line,
                        "detection found before any scan header",
                    ));
                };
                scan.push(parse_detection_line(&record, source_name, line)?);
                num_detections += 1;
            }
            other => {
                return Err(KronikError::malformed(
                    source_name,
                    line,
                    format!("unknown line tag '{}'", other),
                ));
            }
        }
    }
    if let Some(done) = current.take() {
        store.push(done);
    }

    info!("{} detections from {} scans", num_detections, store.len());
    Ok(store)
}

fn field<'a>(record: &'a StringRecord, idx: usize) -> &'a str {
    record.get(idx).map(str::trim).unwrap_or("")
}

fn parse_field<T: FromStr>(
    record: &StringRecord,
    idx: usize,
    name: &str,
    source_name: &str,
    line: u64,
) -> Result<T> {
    let raw = field(record, idx);
    raw.parse().map_err(|_| {
        KronikError::malformed(source_name, line, format!("invalid {} '{}'", name, raw))
    })
}

/// Like [`parse_field`], rejecting `NaN` and infinities.
fn parse_finite<T: FromStr + Into<f64> + Copy>(
    record: &StringRecord,
    idx: usize,
    name: &str,
    source_name: &str,
    line: u64,
) -> Result<T> {
    let value: T = parse_field(record, idx, name, source_name, line)?;
    if !value.into().is_finite() {
        return Err(KronikError::malformed(
            source_name,
            line,
            format!("non finite {} '{}'", name, field(record, idx)),
        ));
    }
    Ok(value)
}

fn is_finite_number(raw: &str) -> bool {
    raw.parse::<f64>().is_ok_and(f64::is_finite)
}

fn parse_scan_line(record: &StringRecord, source_name: &str, line: u64) -> Result<ScanRecord> {
    if record.len() < SCAN_FIELDS {
        return Err(KronikError::malformed(
            source_name,
            line,
            format!(
                "scan header has {} fields, expected {}",
                record.len(),
                SCAN_FIELDS
            ),
        ));
    }
    let scan_number: u32 = parse_field(record, 1, "scan number", source_name, line)?;
    let retention_time: f32 = parse_finite(record, 2, "retention time", source_name, line)?;
    Ok(ScanRecord::new(
        scan_number,
        retention_time,
        field(record, 3),
    ))
}

fn parse_detection_line(record: &StringRecord, source_name: &str, line: u64) -> Result<Detection> {
    if record.len() < DETECTION_FIELDS {
        return Err(KronikError::malformed(
            source_name,
            line,
            format!(
                "detection has {} fields, expected {}",
                record.len(),
                DETECTION_FIELDS
            ),
        ));
    }
    let mono_mass: f64 = parse_finite(record, 1, "monoisotopic mass", source_name, line)?;
    let charge: i32 = parse_field(record, 2, "charge", source_name, line)?;
    let intensity: f32 = parse_finite(record, 3, "intensity", source_name, line)?;
    let base_peak_mz: f64 = parse_finite(record, 4, "base peak", source_name, line)?;

    // The m/z window and the aux column are not used, they still have to be numbers.
    let window = field(record, 5);
    let window_ok = window
        .split_once('-')
        .is_some_and(|(lo, hi)| is_finite_number(lo) && is_finite_number(hi));
    if !window_ok {
        return Err(KronikError::malformed(
            source_name,
            line,
            format!("invalid m/z window '{}'", window),
        ));
    }
    let _aux: f64 = parse_finite(record, 6, "auxiliary value", source_name, line)?;

    let mods = Modifications::try_new(field(record, 7))
        .map_err(|e| KronikError::malformed(source_name, line, e.to_string()))?;
    let xcorr: f64 = parse_finite(record, 8, "correlation score", source_name, line)?;

    Ok(Detection::new(mono_mass, charge, intensity, base_peak_mz)
        .with_xcorr(xcorr)
        .with_mods(mods))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = "S\t1\t0.50\tsample.ms1
P\t1000.0000\t2\t15000.0\t501.0073\t500.5000-503.5000\t0.0000\t_\t0.9500
P\t1500.5000\t3\t9000.0\t501.1740\t500.9000-504.2000\t0.0000\tOx\t0.8800
S\t2\t0.55\tsample.ms1

S\t3\t0.60\tsample.ms1
P\t1000.0020\t2\t17000.0\t501.0083\t500.5000-503.5000\t0.0000\t_\t0.9700
";

    #[test]
    fn test_parse_feed() {
        let store = parse_detection_feed(FEED.as_bytes(), "mem").unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.num_detections(), 3);
        let first = &store.scans()[0];
        assert_eq!(first.scan_number, 1);
        assert_eq!(&*first.source_file, "sample.ms1");
        assert_eq!(first.detections()[1].charge, 3);
        assert_eq!(first.detections()[1].mods.as_str(), "Ox");
        assert!((first.detections()[0].xcorr - 0.95).abs() < 1e-9);
        assert!(store.scans()[1].is_empty());
        assert_eq!(store.retention_time(3), Some(0.60));
    }

    #[test]
    fn test_detection_before_scan_is_malformed() {
        let feed = "P\t1000.0\t2\t1.0\t501.0\t500.0-503.0\t0.0\t_\t0.9\n";
        match parse_detection_feed(feed.as_bytes(), "bad.hk") {
            Err(KronikError::MalformedInput { line, path, .. }) => {
                assert_eq!(line, 1);
                assert_eq!(path, "bad.hk");
            }
            other => panic!("Expected malformed input, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_mass_reports_line() {
        let feed = "S\t1\t0.5\tf\nP\tabc\t2\t1.0\t501.0\t500.0-503.0\t0.0\t_\t0.9\n";
        match parse_detection_feed(feed.as_bytes(), "bad.hk") {
            Err(KronikError::MalformedInput { line, reason, .. }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("monoisotopic mass"), "{}", reason);
            }
            other => panic!("Expected malformed input, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_values_are_malformed() {
        let cases = [
            ("P\t1000.0\t2\tNaN\t501.0\t500.0-503.0\t0.0\t_\t0.9\n", "intensity"),
            ("P\tinf\t2\t1.0\t501.0\t500.0-503.0\t0.0\t_\t0.9\n", "monoisotopic mass"),
            ("P\t1000.0\t2\t1.0\t-inf\t500.0-503.0\t0.0\t_\t0.9\n", "base peak"),
            ("P\t1000.0\t2\t1.0\t501.0\t500.0-503.0\tNaN\t_\t0.9\n", "auxiliary value"),
            ("P\t1000.0\t2\t1.0\t501.0\t500.0-503.0\t0.0\t_\tnan\n", "correlation score"),
            ("P\t1000.0\t2\t1.0\t501.0\t500.0-NaN\t0.0\t_\t0.9\n", "m/z window"),
        ];
        for (detection, name) in cases {
            let feed = format!("S\t1\t0.5\tf\n{}", detection);
            match parse_detection_feed(feed.as_bytes(), "nan.hk") {
                Err(KronikError::MalformedInput { line, reason, .. }) => {
                    assert_eq!(line, 2);
                    assert!(reason.contains(name), "{}", reason);
                }
                other => panic!("Expected malformed {}, got {:?}", name, other),
            }
        }

        let bad_rt = "S\t1\tNaN\tf\n";
        assert!(matches!(
            parse_detection_feed(bad_rt.as_bytes(), "nan.hk"),
            Err(KronikError::MalformedInput { line: 1, .. })
        ));
    }

    #[test]
    fn test_missing_fields_and_long_mods() {
        let short = "S\t1\t0.5\tf\nP\t1000.0\t2\t1.0\n";
        assert!(matches!(
            parse_detection_feed(short.as_bytes(), "x"),
            Err(KronikError::MalformedInput { line: 2, .. })
        ));

        let long_mods = format!(
            "S\t1\t0.5\tf\nP\t1000.0\t2\t1.0\t501.0\t500.0-503.0\t0.0\t{}\t0.9\n",
            "m".repeat(32)
        );
        assert!(matches!(
            parse_detection_feed(long_mods.as_bytes(), "x"),
            Err(KronikError::MalformedInput { line: 2, .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let res = read_detection_feed("/definitely/not/here.hk");
        assert!(matches!(res, Err(KronikError::Io { .. })));
    }
}
