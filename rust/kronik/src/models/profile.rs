use super::detection::{
    Detection,
    Modifications,
};
use serde::{
    Deserialize,
    Serialize,
};

/// One scan's contribution to a persistent profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    pub scan_number: u32,
    pub retention_time: f32,
    pub intensity: f32,
    pub mono_mass: f64,
    pub xcorr: f64,
    pub interpolated: bool,
}

impl ProfilePoint {
    pub fn observed(scan_number: u32, retention_time: f32, detection: &Detection) -> Self {
        Self {
            scan_number,
            retention_time,
            intensity: detection.intensity,
            mono_mass: detection.mono_mass,
            xcorr: detection.xcorr,
            interpolated: false,
        }
    }

    pub fn interpolated(
        scan_number: u32,
        retention_time: f32,
        intensity: f32,
        mono_mass: f64,
    ) -> Self {
        Self {
            scan_number,
            retention_time,
            intensity,
            mono_mass,
            xcorr: 0.0,
            interpolated: true,
        }
    }
}

/// A persistent peptide isotope distribution (PPID): one peptide elution
/// event tracked over consecutive MS1 scans.
///
/// Summary fields describe the seed (most intense) detection, the scan
/// bounds describe the whole run. Points are sorted by scan number and
/// `sum_intensity` always equals the sum of the point intensities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub low_scan: u32,
    pub high_scan: u32,
    pub best_scan: u32,
    pub charge: i32,
    pub ms2_event_count: u32,
    pub retention_time: f32,
    pub first_retention_time: f32,
    pub last_retention_time: f32,
    pub intensity: f32,
    pub mono_mass: f64,
    pub base_peak_mz: f64,
    pub xcorr: f64,
    pub mods: Modifications,
    sum_intensity: f32,
    points: Vec<ProfilePoint>,
}

/// Scan number and retention time of one end of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanBound {
    pub scan_number: u32,
    pub retention_time: f32,
}

impl Profile {
    pub fn new(
        seed: &Detection,
        seed_bound: ScanBound,
        low: ScanBound,
        high: ScanBound,
        mut points: Vec<ProfilePoint>,
    ) -> Self {
        points.sort_by_key(|p| p.scan_number);
        let sum_intensity = points.iter().map(|p| p.intensity).sum();
        Self {
            low_scan: low.scan_number,
            high_scan: high.scan_number,
            best_scan: seed_bound.scan_number,
            charge: seed.charge,
            ms2_event_count: 0,
            retention_time: seed_bound.retention_time,
            first_retention_time: low.retention_time,
            last_retention_time: high.retention_time,
            intensity: seed.intensity,
            mono_mass: seed.mono_mass,
            base_peak_mz: seed.base_peak_mz,
            xcorr: seed.xcorr,
            mods: seed.mods.clone(),
            sum_intensity,
            points,
        }
    }

    pub fn points(&self) -> &[ProfilePoint] {
        &self.points
    }

    pub fn sum_intensity(&self) -> f32 {
        self.sum_intensity
    }

    pub fn num_scans(&self) -> usize {
        self.points.len()
    }

    /// Elution duration, the quantity the contaminant filter thresholds.
    pub fn retention_span(&self) -> f32 {
        self.last_retention_time - self.first_retention_time
    }

    pub fn num_interpolated(&self) -> usize {
        self.points.iter().filter(|p| p.interpolated).count()
    }

    /// Index of the most intense point, first one wins on ties.
    pub fn apex_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, p) in self.points.iter().enumerate() {
            match best {
                Some((_, inten)) if p.intensity <= inten => {}
                _ => best = Some((i, p.intensity)),
            }
        }
        best.map(|(i, _)| i)
    }
}
