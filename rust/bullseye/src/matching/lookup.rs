use kronik::ProfileStore;

/// Highest integer m/z covered by the lookup table.
pub const MAX_LOOKUP_MZ: usize = 8000;

/// Coarse index from integer m/z to the first profile (in base peak order)
/// whose base peak is at or above it.
///
/// Must be rebuilt whenever the profile order changes.
#[derive(Debug, Clone)]
pub struct MzLookup {
    first_at_or_above: Vec<usize>,
}

impl MzLookup {
    /// Builds the table with a single forward sweep.
    ///
    /// `profiles` has to be sorted by ascending base peak. Entries past the
    /// last profile's base peak point at the last profile.
    pub fn build(profiles: &ProfileStore) -> Self {
        let mut first_at_or_above = vec![0; MAX_LOOKUP_MZ + 1];
        if profiles.is_empty() {
            return Self { first_at_or_above };
        }
        let last = profiles.len() - 1;
        let mut j = 0;
        for (i, slot) in first_at_or_above.iter_mut().enumerate() {
            while profiles[j].base_peak_mz < i as f64 && j < last {
                j += 1;
            }
            *slot = j;
        }
        Self { first_at_or_above }
    }

    /// Inclusive range of profile indices worth testing against `mz`.
    pub fn candidate_range(&self, mz: f64) -> std::ops::RangeInclusive<usize> {
        let j = ((mz + 0.5) as i64).clamp(1, (MAX_LOOKUP_MZ - 1) as i64) as usize;
        self.first_at_or_above[j - 1]..=self.first_at_or_above[j + 1]
    }

    pub fn get(&self, mz_bin: usize) -> Option<usize> {
        self.first_at_or_above.get(mz_bin).copied()
    }
}
