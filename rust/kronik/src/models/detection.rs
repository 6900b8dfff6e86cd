use serde::{
    Deserialize,
    Serialize,
};
use std::fmt::Display;
use std::sync::Arc;

/// Longest modification tag accepted from a detection feed.
pub const MAX_MODS_LEN: usize = 31;

/// Modification tag attached to a detection (eg. `_` or `Ox`).
///
/// Cheap to clone, since the same tag gets copied into every profile
/// seeded by the detection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifications(Arc<str>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModsTooLong(pub usize);

impl Display for ModsTooLong {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "modification tag has {} characters, at most {} are allowed",
            self.0, MAX_MODS_LEN
        )
    }
}

impl Modifications {
    pub fn try_new(tag: &str) -> Result<Self, ModsTooLong> {
        let nchars = tag.chars().count();
        if nchars > MAX_MODS_LEN {
            return Err(ModsTooLong(nchars));
        }
        Ok(Self(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Modifications {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single isotope envelope observed in a single MS1 scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub charge: i32,
    pub intensity: f32,
    pub mono_mass: f64,
    pub base_peak_mz: f64,
    pub xcorr: f64,
    pub mods: Modifications,
}

impl Detection {
    pub fn new(mono_mass: f64, charge: i32, intensity: f32, base_peak_mz: f64) -> Self {
        Self {
            charge,
            intensity,
            mono_mass,
            base_peak_mz,
            xcorr: 0.0,
            mods: Modifications::default(),
        }
    }

    pub fn with_xcorr(mut self, xcorr: f64) -> Self {
        self.xcorr = xcorr;
        self
    }

    pub fn with_mods(mut self, mods: Modifications) -> Self {
        self.mods = mods;
        self
    }

    /// Same charge and within `ppm_tolerance` of `mass` (relative to `mass`).
    pub fn matches(&self, mass: f64, charge: i32, ppm_tolerance: f64) -> bool {
        let ppm = (self.mono_mass - mass) / mass * 1e6;
        ppm.abs() < ppm_tolerance && self.charge == charge
    }
}

/// All the detections of one MS1 scan.
///
/// The record outlives its detections: once the tracker drains it,
/// it still answers retention time lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub scan_number: u32,
    pub retention_time: f32,
    pub source_file: Arc<str>,
    detections: Vec<Detection>,
}

impl ScanRecord {
    pub fn new(scan_number: u32, retention_time: f32, source_file: impl Into<Arc<str>>) -> Self {
        Self {
            scan_number,
            retention_time,
            source_file: source_file.into(),
            detections: Vec::new(),
        }
    }

    pub fn push(&mut self, detection: Detection) {
        self.detections.push(detection);
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Stable sort, most intense first.
    pub fn sort_descending_intensity(&mut self) {
        self.detections
            .sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
    }

    /// Index of the first detection matching mass and charge.
    pub fn find_match(&self, mass: f64, charge: i32, ppm_tolerance: f64) -> Option<usize> {
        self.detections
            .iter()
            .position(|d| d.matches(mass, charge, ppm_tolerance))
    }

    pub(crate) fn remove(&mut self, index: usize) -> Detection {
        self.detections.remove(index)
    }
}
