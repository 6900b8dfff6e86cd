use serde::{
    Deserialize,
    Serialize,
};

/// Tolerances used when assigning profiles to MS/MS precursors.
///
/// ```
/// use bullseye::MatcherConfig;
///
/// let conf: MatcherConfig = serde_json::from_str(r#"{"exact_match_only": true}"#).unwrap();
/// assert!(conf.exact_match_only);
/// assert_eq!(conf.ppm_tolerance, 10.0);
/// assert_eq!(conf.rt_tolerance, 0.5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatcherConfig {
    /// +/- ppm between the precursor m/z and a profile's base isotope peak.
    pub ppm_tolerance: f64,
    /// +/- minutes around a profile's elution window.
    pub rt_tolerance: f64,
    /// Skips the isolation window pass, only base peak matches count.
    pub exact_match_only: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            ppm_tolerance: 10.0,
            rt_tolerance: 0.5,
            exact_match_only: false,
        }
    }
}

/// Filters applied to the tracked profiles before matching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileFilters {
    /// Profiles eluting this long (or longer) are treated as contaminants.
    pub max_persist: f32,
    pub min_mass: f64,
    pub max_mass: f64,
}

impl Default for ProfileFilters {
    fn default() -> Self {
        Self {
            max_persist: 2.0,
            min_mass: 600.0,
            max_mass: 8000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputOptions {
    /// Spectra buffered per output before they get written.
    pub batch_size: usize,
    /// Decimal places for m/z values in the written spectra.
    pub mz_precision: usize,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            batch_size: 500,
            mz_precision: 4,
        }
    }
}
