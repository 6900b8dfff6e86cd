use super::spectrum::PROTON_MASS;
use kronik::Profile;
use serde::Serialize;

/// A profile accepted as the precursor of a spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrecursorAssignment {
    /// Position in the matcher's (base peak sorted) profile store.
    pub profile_index: usize,
    pub charge: i32,
    pub mono_mass: f64,
    pub intensity: f32,
    pub retention_time: f32,
    pub sum_intensity: f32,
}

impl PrecursorAssignment {
    pub fn from_profile(profile_index: usize, profile: &Profile) -> Self {
        Self {
            profile_index,
            charge: profile.charge,
            mono_mass: profile.mono_mass,
            intensity: profile.intensity,
            retention_time: profile.retention_time,
            sum_intensity: profile.sum_intensity(),
        }
    }

    /// Singly protonated mass.
    pub fn mh(&self) -> f64 {
        self.mono_mass + PROTON_MASS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MatchOutcome {
    Unmatched,
    Single(PrecursorAssignment),
    Multiple(Vec<PrecursorAssignment>),
}

impl MatchOutcome {
    pub fn from_assignments(mut assignments: Vec<PrecursorAssignment>) -> Self {
        match assignments.len() {
            0 => Self::Unmatched,
            1 => Self::Single(assignments.remove(0)),
            _ => Self::Multiple(assignments),
        }
    }

    pub fn assignments(&self) -> &[PrecursorAssignment] {
        match self {
            Self::Unmatched => &[],
            Self::Single(a) => std::slice::from_ref(a),
            Self::Multiple(v) => v,
        }
    }

    pub fn is_matched(&self) -> bool {
        !matches!(self, Self::Unmatched)
    }
}
