use crate::models::Profile;
use crate::stats::correlation::{
    CorrelationError,
    CorrelationMode,
    CorrelationResult,
    correlate,
};
use std::cmp::Ordering;
use tracing::debug;

/// Orderings available on a [`ProfileStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSortKey {
    /// Ascending base isotope peak m/z.
    BasePeak,
    /// Ascending monoisotopic mass.
    MonoMass,
    /// Ascending first retention time.
    FirstRetentionTime,
    /// Descending apex intensity.
    IntensityDescending,
}

impl ProfileSortKey {
    fn compare(&self, a: &Profile, b: &Profile) -> Ordering {
        match self {
            Self::BasePeak => a.base_peak_mz.total_cmp(&b.base_peak_mz),
            Self::MonoMass => a.mono_mass.total_cmp(&b.mono_mass),
            Self::FirstRetentionTime => a.first_retention_time.total_cmp(&b.first_retention_time),
            Self::IntensityDescending => b.intensity.total_cmp(&a.intensity),
        }
    }
}

/// Collection of accepted persistent profiles.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profiles: Vec<Profile>,
}

impl From<Vec<Profile>> for ProfileStore {
    fn from(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }
}

impl std::ops::Index<usize> for ProfileStore {
    type Output = Profile;

    fn index(&self, index: usize) -> &Self::Output {
        &self.profiles[index]
    }
}

impl ProfileStore {
    pub fn add(&mut self, profile: Profile) {
        self.profiles.push(profile);
    }

    pub fn get(&self, index: usize) -> Option<&Profile> {
        self.profiles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Profile> {
        self.profiles.get_mut(index)
    }

    pub fn erase(&mut self, index: usize) -> Option<Profile> {
        if index < self.profiles.len() {
            Some(self.profiles.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn clear(&mut self) {
        self.profiles.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Profile> {
        self.profiles.iter()
    }

    pub fn as_slice(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn into_vec(self) -> Vec<Profile> {
        self.profiles
    }

    /// Reorders the whole store. Ties compare as equal and keep their
    /// relative order.
    pub fn sort_by(&mut self, key: ProfileSortKey) {
        self.profiles.sort_by(|a, b| key.compare(a, b));
    }

    pub fn sort_base_peak(&mut self) {
        self.sort_by(ProfileSortKey::BasePeak);
    }

    pub fn sort_mono_mass(&mut self) {
        self.sort_by(ProfileSortKey::MonoMass);
    }

    pub fn sort_first_retention_time(&mut self) {
        self.sort_by(ProfileSortKey::FirstRetentionTime);
    }

    pub fn sort_intensity_descending(&mut self) {
        self.sort_by(ProfileSortKey::IntensityDescending);
    }

    pub fn is_sorted_by(&self, key: ProfileSortKey) -> bool {
        self.profiles
            .windows(2)
            .all(|w| key.compare(&w[0], &w[1]) != Ordering::Greater)
    }

    fn retain_logged(&mut self, filter_name: &str, keep: impl FnMut(&Profile) -> bool) {
        let before = self.profiles.len();
        self.profiles.retain(keep);
        debug!(
            "{} kept {} of {} profiles",
            filter_name,
            self.profiles.len(),
            before
        );
    }

    /// Keeps profiles whose apex retention time lies in `[rt1, rt2]`.
    pub fn filter_retention_time_window(&mut self, rt1: f32, rt2: f32) {
        self.retain_logged("Retention time filter", |p| {
            p.retention_time >= rt1 && p.retention_time <= rt2
        });
    }

    /// Keeps profiles that elute for strictly less than `max_span`.
    pub fn remove_contaminants(&mut self, max_span: f32) {
        self.retain_logged("Contaminant filter", |p| p.retention_span() < max_span);
    }

    /// Keeps profiles whose monoisotopic mass lies in `[m1, m2]`.
    pub fn remove_outside_mass_range(&mut self, m1: f64, m2: f64) {
        self.retain_logged("Mass range filter", |p| {
            p.mono_mass >= m1 && p.mono_mass <= m2
        });
    }

    /// Correlates the intensity profiles of two stored profiles.
    ///
    /// Returns `None` when either index is out of bounds.
    pub fn correlate(
        &self,
        i1: usize,
        i2: usize,
        mode: CorrelationMode,
    ) -> Option<Result<CorrelationResult, CorrelationError>> {
        let a = self.profiles.get(i1)?;
        let b = self.profiles.get(i2)?;
        Some(correlate(a, b, mode))
    }
}

impl<'a> IntoIterator for &'a ProfileStore {
    type Item = &'a Profile;
    type IntoIter = std::slice::Iter<'a, Profile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Detection,
        ProfilePoint,
        ScanBound,
    };

    fn profile(mono_mass: f64, base_peak: f64, intensity: f32, rts: (f32, f32, f32)) -> Profile {
        let seed = Detection::new(mono_mass, 2, intensity, base_peak);
        let (first, best, last) = rts;
        let points = vec![
            ProfilePoint::observed(1, first, &seed),
            ProfilePoint::observed(2, best, &seed),
            ProfilePoint::observed(3, last, &seed),
        ];
        Profile::new(
            &seed,
            ScanBound {
                scan_number: 2,
                retention_time: best,
            },
            ScanBound {
                scan_number: 1,
                retention_time: first,
            },
            ScanBound {
                scan_number: 3,
                retention_time: last,
            },
            points,
        )
    }

    fn sample() -> ProfileStore {
        vec![
            profile(1200.0, 601.0, 10.0, (5.0, 5.5, 6.0)),
            profile(800.0, 401.0, 30.0, (1.0, 1.1, 1.2)),
            profile(1000.0, 501.0, 20.0, (2.0, 2.5, 5.0)),
            profile(9000.0, 4501.0, 20.0, (0.5, 0.6, 0.7)),
        ]
        .into()
    }

    fn masses(store: &ProfileStore) -> Vec<f64> {
        store.iter().map(|p| p.mono_mass).collect()
    }

    #[test]
    fn test_sorts() {
        let mut store = sample();
        store.sort_base_peak();
        assert_eq!(masses(&store), vec![800.0, 1000.0, 1200.0, 9000.0]);
        assert!(store.is_sorted_by(ProfileSortKey::BasePeak));

        store.sort_first_retention_time();
        assert_eq!(masses(&store), vec![9000.0, 800.0, 1000.0, 1200.0]);

        store.sort_intensity_descending();
        assert_eq!(masses(&store), vec![800.0, 9000.0, 1000.0, 1200.0]);
        let once = masses(&store);
        store.sort_intensity_descending();
        assert_eq!(masses(&store), once);

        store.sort_mono_mass();
        assert_eq!(masses(&store), vec![800.0, 1000.0, 1200.0, 9000.0]);
    }

    #[test]
    fn test_filters_keep_relative_order() {
        let mut store = sample();
        store.remove_contaminants(2.0);
        assert_eq!(masses(&store), vec![1200.0, 800.0, 9000.0]);

        store.remove_outside_mass_range(600.0, 8000.0);
        assert_eq!(masses(&store), vec![1200.0, 800.0]);

        store.filter_retention_time_window(1.0, 2.0);
        assert_eq!(masses(&store), vec![800.0]);
    }

    #[test]
    fn test_contaminant_filter_is_strict() {
        let mut store: ProfileStore = vec![profile(1000.0, 501.0, 1.0, (1.0, 1.5, 3.0))].into();
        store.remove_contaminants(2.0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_erase_and_index() {
        let mut store = sample();
        assert_eq!(store.erase(1).map(|p| p.mono_mass), Some(800.0));
        assert!(store.erase(10).is_none());
        assert_eq!(store.len(), 3);
        assert_eq!(store[1].mono_mass, 1000.0);
        assert!(store.correlate(0, 9, CorrelationMode::ByScan).is_none());
        store.clear();
        assert!(store.is_empty());
    }
}
