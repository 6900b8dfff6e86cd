use crate::errors::{
    KronikError,
    Result,
};
use crate::models::Profile;
use crate::store::ProfileStore;
use serde::{
    Serialize,
    Serializer,
};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Placeholder written in the `File` column.
const SOURCE_FILE_PLACEHOLDER: &str = "NULL";

const REPORT_HEADER: [&str; 14] = [
    "File",
    "First Scan",
    "Last Scan",
    "Num of Scans",
    "Charge",
    "Monoisotopic Mass",
    "Base Isotope Peak",
    "Best Intensity",
    "Summed Intensity",
    "First RTime",
    "Last RTime",
    "Best RTime",
    "Best Correlation",
    "Modifications",
];

fn six_decimals<S: Serializer, T: Into<f64> + Copy>(
    v: &T,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{:.6}", (*v).into()))
}

/// One row of the persistent profile report.
#[derive(Debug, Serialize)]
struct ProfileReportRow<'a> {
    #[serde(rename = "File")]
    file: &'static str,
    #[serde(rename = "First Scan")]
    first_scan: u32,
    #[serde(rename = "Last Scan")]
    last_scan: u32,
    #[serde(rename = "Num of Scans")]
    num_scans: usize,
    #[serde(rename = "Charge")]
    charge: i32,
    #[serde(rename = "Monoisotopic Mass", serialize_with = "six_decimals")]
    mono_mass: f64,
    #[serde(rename = "Base Isotope Peak", serialize_with = "six_decimals")]
    base_peak: f64,
    #[serde(rename = "Best Intensity", serialize_with = "six_decimals")]
    best_intensity: f32,
    #[serde(rename = "Summed Intensity", serialize_with = "six_decimals")]
    summed_intensity: f32,
    #[serde(rename = "First RTime", serialize_with = "six_decimals")]
    first_rt: f32,
    #[serde(rename = "Last RTime", serialize_with = "six_decimals")]
    last_rt: f32,
    #[serde(rename = "Best RTime", serialize_with = "six_decimals")]
    best_rt: f32,
    #[serde(rename = "Best Correlation", serialize_with = "six_decimals")]
    best_correlation: f64,
    #[serde(rename = "Modifications")]
    mods: &'a str,
}

impl<'a> From<&'a Profile> for ProfileReportRow<'a> {
    fn from(p: &'a Profile) -> Self {
        Self {
            file: SOURCE_FILE_PLACEHOLDER,
            first_scan: p.low_scan,
            last_scan: p.high_scan,
            num_scans: p.num_scans(),
            charge: p.charge,
            mono_mass: p.mono_mass,
            base_peak: p.base_peak_mz,
            best_intensity: p.intensity,
            summed_intensity: p.sum_intensity(),
            first_rt: p.first_retention_time,
            last_rt: p.last_retention_time,
            best_rt: p.retention_time,
            best_correlation: p.xcorr,
            mods: p.mods.as_str(),
        }
    }
}

/// Writes one tab separated row per profile, with a header line.
pub fn write_profile_report<W: Write>(profiles: &ProfileStore, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);
    if profiles.is_empty() {
        // serde only emits the header along with the first row
        wtr.write_record(REPORT_HEADER)?;
    }
    for profile in profiles {
        wtr.serialize(ProfileReportRow::from(profile))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_profile_report_file<T: AsRef<Path>>(profiles: &ProfileStore, path: T) -> Result<()> {
    let start = Instant::now();
    let path = path.as_ref();
    let file = std::fs::File::create(path).map_err(|source| KronikError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    write_profile_report(profiles, std::io::BufWriter::new(file))?;
    info!(
        "Writing {} profiles took {:?} -> {}",
        profiles.len(),
        start.elapsed(),
        path.display()
    );
    Ok(())
}
