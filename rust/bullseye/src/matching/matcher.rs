use super::lookup::MzLookup;
use crate::models::{
    MatchOutcome,
    MatcherConfig,
    MsmsSpectrum,
    PROTON_MASS,
    PrecursorAssignment,
};
use kronik::{
    Profile,
    ProfileStore,
};
use tracing::{
    info,
    warn,
};

/// Bounds of the m/z window a profile can be isolated in, for `charge >= 1`.
///
/// The window starts slightly below the monoisotopic m/z and extends over
/// the isotope envelope. Integer division on the charge is intended:
/// +3 and +4 reach one extra unit, higher charges do not.
pub fn isolation_window(mono_mass: f64, charge: i32) -> Option<(f64, f64)> {
    if charge <= 0 {
        return None;
    }
    let mono_mz = (mono_mass + charge as f64 * PROTON_MASS) / charge as f64;
    let upper_offset = match charge {
        1 => 3.10,
        2 => 2.10,
        z => (4 / z) as f64 + 0.05,
    };
    Some((mono_mz - 0.05, mono_mz + upper_offset))
}

/// Assigns persistent profiles to MS/MS spectra by precursor m/z and
/// retention time.
#[derive(Debug, Clone)]
pub struct PrecursorMatcher {
    profiles: ProfileStore,
    lookup: MzLookup,
    config: MatcherConfig,
}

impl PrecursorMatcher {
    /// Sorts the profiles by base peak and indexes them.
    pub fn new(mut profiles: ProfileStore, config: MatcherConfig) -> Self {
        if profiles.is_empty() {
            warn!("No persistent profiles to match against, every spectrum will be unmatched");
        }
        info!("Sorting {} persistent profiles by base peak", profiles.len());
        profiles.sort_base_peak();
        let lookup = MzLookup::build(&profiles);
        Self {
            profiles,
            lookup,
            config,
        }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn into_profiles(self) -> ProfileStore {
        self.profiles
    }

    fn within_rt(&self, profile: &Profile, rt: f64) -> bool {
        let tol = self.config.rt_tolerance;
        rt > profile.first_retention_time as f64 - tol
            && rt < profile.last_retention_time as f64 + tol
    }

    /// Profiles whose base isotope peak is within ppm of `mz` and whose
    /// elution window (widened by the rt tolerance) contains `rt`.
    pub fn base_peak_hits(&self, mz: f64, rt: f64) -> Vec<usize> {
        if self.profiles.is_empty() {
            return Vec::new();
        }
        self.lookup
            .candidate_range(mz)
            .filter(|&i| {
                let p = &self.profiles[i];
                let ppm = (p.base_peak_mz - mz) / mz * 1e6;
                ppm.abs() < self.config.ppm_tolerance && self.within_rt(p, rt)
            })
            .collect()
    }

    /// Full pass over all profiles testing whether `mz` lies in their
    /// isolation window, see [`isolation_window`].
    pub fn isolation_window_hits(&self, mz: f64, rt: f64) -> Vec<usize> {
        self.profiles
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                isolation_window(p.mono_mass, p.charge)
                    .is_some_and(|(low, high)| mz > low && mz < high)
                    && self.within_rt(p, rt)
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Candidate profile indices for a precursor, before deduplication.
    pub fn candidate_hits(&self, mz: f64, rt: f64) -> Vec<usize> {
        let mut hits = self.base_peak_hits(mz, rt);
        if !self.config.exact_match_only {
            for i in self.isolation_window_hits(mz, rt) {
                if !hits.contains(&i) {
                    hits.push(i);
                }
            }
        }
        hits
    }

    /// Collapses hits of the same charge whose (M+H) agree to two decimals,
    /// keeping the more intense one (the earlier one on ties).
    pub fn deduplicate(&self, hits: &mut Vec<usize>) {
        let key = |i: usize| format!("{:.2}", self.profiles[i].mono_mass + PROTON_MASS);
        let mut i = 0;
        while i < hits.len() {
            let mut j = i + 1;
            while j < hits.len() {
                let (a, b) = (&self.profiles[hits[i]], &self.profiles[hits[j]]);
                if a.charge == b.charge && key(hits[i]) == key(hits[j]) {
                    if a.intensity < b.intensity {
                        hits[i] = hits[j];
                    }
                    hits.remove(j);
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
    }

    /// Finds the precursor assignments of a spectrum.
    ///
    /// Only MS2 spectra are matched, anything else is unmatched.
    pub fn match_spectrum(&self, spectrum: &MsmsSpectrum) -> MatchOutcome {
        if spectrum.ms_level != 2 {
            return MatchOutcome::Unmatched;
        }
        let mut hits = self.candidate_hits(spectrum.precursor_mz, spectrum.retention_time as f64);
        self.deduplicate(&mut hits);
        MatchOutcome::from_assignments(
            hits.into_iter()
                .map(|i| PrecursorAssignment::from_profile(i, &self.profiles[i]))
                .collect(),
        )
    }

    /// Bumps the MS2 event count of every profile the outcome assigned.
    pub fn record_ms2_events(&mut self, outcome: &MatchOutcome) {
        for a in outcome.assignments() {
            if let Some(p) = self.profiles.get_mut(a.profile_index) {
                p.ms2_event_count += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kronik::{
        Detection,
        ProfilePoint,
        ScanBound,
    };

    fn profile(mono_mass: f64, charge: i32, intensity: f32, rt: (f32, f32)) -> Profile {
        let base_peak = (mono_mass + charge as f64 * PROTON_MASS) / charge as f64;
        let seed = Detection::new(mono_mass, charge, intensity, base_peak);
        let low = ScanBound {
            scan_number: 1,
            retention_time: rt.0,
        };
        let high = ScanBound {
            scan_number: 3,
            retention_time: rt.1,
        };
        let points = vec![
            ProfilePoint::observed(1, rt.0, &seed),
            ProfilePoint::observed(3, rt.1, &seed),
        ];
        Profile::new(&seed, low, low, high, points)
    }

    #[test]
    fn test_isolation_window_bounds() {
        let (lo, hi) = isolation_window(1000.0, 1).unwrap();
        assert!((lo - (1001.00727649 - 0.05)).abs() < 1e-9);
        assert!((hi - (1001.00727649 + 3.10)).abs() < 1e-9);

        let mz2 = (1000.0 + 2.0 * PROTON_MASS) / 2.0;
        let (_, hi) = isolation_window(1000.0, 2).unwrap();
        assert!((hi - (mz2 + 2.10)).abs() < 1e-9);

        let mz3 = (1000.0 + 3.0 * PROTON_MASS) / 3.0;
        let (_, hi) = isolation_window(1000.0, 3).unwrap();
        assert!((hi - (mz3 + 1.05)).abs() < 1e-9);

        let mz5 = (1000.0 + 5.0 * PROTON_MASS) / 5.0;
        let (_, hi) = isolation_window(1000.0, 5).unwrap();
        assert!((hi - (mz5 + 0.05)).abs() < 1e-9);

        assert!(isolation_window(1000.0, 0).is_none());
    }

    #[test]
    fn test_rt_window_is_open() {
        let matcher = PrecursorMatcher::new(
            vec![profile(1000.0, 2, 10.0, (10.0, 11.0))].into(),
            MatcherConfig::default(),
        );
        let mz = (1000.0 + 2.0 * PROTON_MASS) / 2.0;
        assert_eq!(matcher.base_peak_hits(mz, 9.6), vec![0]);
        assert!(matcher.base_peak_hits(mz, 9.5).is_empty());
        assert!(matcher.base_peak_hits(mz, 11.5).is_empty());
    }

    #[test]
    fn test_isolation_pass_does_not_duplicate_base_peak_hits() {
        let matcher = PrecursorMatcher::new(
            vec![profile(1000.0, 2, 10.0, (10.0, 11.0))].into(),
            MatcherConfig::default(),
        );
        let mz = (1000.0 + 2.0 * PROTON_MASS) / 2.0;
        assert_eq!(matcher.candidate_hits(mz, 10.5), vec![0]);
        // Second isotope is only caught by the isolation window
        assert!(matcher.base_peak_hits(mz + 0.5, 10.5).is_empty());
        assert_eq!(matcher.candidate_hits(mz + 0.5, 10.5), vec![0]);

        let exact = PrecursorMatcher::new(
            vec![profile(1000.0, 2, 10.0, (10.0, 11.0))].into(),
            MatcherConfig {
                exact_match_only: true,
                ..Default::default()
            },
        );
        assert!(exact.candidate_hits(mz + 0.5, 10.5).is_empty());
    }

    #[test]
    fn test_deduplicate_keeps_most_intense() {
        let matcher = PrecursorMatcher::new(
            vec![
                profile(1000.001, 2, 10.0, (10.0, 11.0)),
                profile(1000.003, 2, 50.0, (10.0, 11.0)),
                profile(1000.002, 3, 5.0, (10.0, 11.0)),
            ]
            .into(),
            MatcherConfig::default(),
        );
        // Order after sorting by base peak: charge 3 first, then the two +2
        let mut hits = vec![1, 2, 0];
        matcher.deduplicate(&mut hits);
        assert_eq!(hits.len(), 2);
        let charges: Vec<i32> = hits.iter().map(|&i| matcher.profiles()[i].charge).collect();
        assert_eq!(charges, vec![2, 3]);
        assert_eq!(matcher.profiles()[hits[0]].intensity, 50.0);
    }

    #[test]
    fn test_record_ms2_events() {
        let mut matcher = PrecursorMatcher::new(
            vec![profile(1000.0, 2, 10.0, (10.0, 11.0))].into(),
            MatcherConfig::default(),
        );
        let mut spec = MsmsSpectrum::new(5, 5, (1000.0 + 2.0 * PROTON_MASS) / 2.0);
        spec.retention_time = 10.2;
        let outcome = matcher.match_spectrum(&spec);
        assert!(matches!(outcome, MatchOutcome::Single(_)));
        matcher.record_ms2_events(&outcome);
        matcher.record_ms2_events(&outcome);
        assert_eq!(matcher.profiles()[0].ms2_event_count, 2);

        spec.ms_level = 3;
        assert_eq!(matcher.match_spectrum(&spec), MatchOutcome::Unmatched);
    }
}
