use serde::{
    Deserialize,
    Serialize,
};

/// Settings for stitching detections into persistent profiles.
///
/// Example:
/// ```
/// use kronik::TrackerConfig;
///
/// let conf: TrackerConfig = serde_json::from_str(r#"{"ppm_tolerance": 5.0}"#).unwrap();
/// assert_eq!(conf.ppm_tolerance, 5.0);
/// assert_eq!(conf.gap_tolerance, 1);
/// assert_eq!(conf.match_run_length, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Mass tolerance (+/- ppm) between detections in neighbouring scans.
    pub ppm_tolerance: f64,
    /// Consecutive scans allowed to miss the signal inside a run.
    pub gap_tolerance: usize,
    /// Minimum number of matched scans (seed included) to accept a run.
    pub match_run_length: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            ppm_tolerance: 10.0,
            gap_tolerance: 1,
            match_run_length: 3,
        }
    }
}
