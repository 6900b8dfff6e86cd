use serde::{
    Deserialize,
    Serialize,
};

pub const PROTON_MASS: f64 = 1.00727649;

/// A precursor charge state hypothesis, as `Z` lines carry it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeState {
    pub charge: i32,
    /// Singly protonated mass (M+H)+.
    pub mh: f64,
}

impl ChargeState {
    /// m/z of the precursor at this charge, `(M + z*p) / z`.
    pub fn mz(&self) -> f64 {
        let z = self.charge as f64;
        (self.mh + (z - 1.0) * PROTON_MASS) / z
    }

    /// Charge state for a precursor observed at `mz`.
    pub fn from_mz(charge: i32, mz: f64) -> Self {
        let z = charge as f64;
        Self {
            charge,
            mh: mz * z - (z - 1.0) * PROTON_MASS,
        }
    }
}

/// Charge state with the persistence evidence behind it (`I EZ` lines).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtendedChargeState {
    pub charge: i32,
    pub mh: f64,
    /// Apex retention time of the supporting profile.
    pub retention_time: f32,
    pub sum_intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub mz: f64,
    pub intensity: f32,
}

/// A tandem mass spectrum, everything needed to match and write it back out.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MsmsSpectrum {
    pub first_scan: u32,
    pub last_scan: u32,
    pub precursor_mz: f64,
    /// Minutes.
    pub retention_time: f32,
    pub ms_level: u8,
    pub compensation_voltage: Option<f64>,
    pub title: Option<String>,
    pub charge_states: Vec<ChargeState>,
    pub ez_states: Vec<ExtendedChargeState>,
    /// Key/value annotations carried through unchanged.
    pub info: Vec<(String, String)>,
    /// `D` lines, verbatim without the tag.
    pub dependent_lines: Vec<String>,
    pub peaks: Vec<Peak>,
}

impl MsmsSpectrum {
    pub fn new(first_scan: u32, last_scan: u32, precursor_mz: f64) -> Self {
        Self {
            first_scan,
            last_scan,
            precursor_mz,
            ms_level: 2,
            ..Default::default()
        }
    }

    /// Replaces every existing charge hypothesis with the given assignments.
    pub fn annotate(&mut self, assignments: &[super::PrecursorAssignment]) {
        self.charge_states.clear();
        self.ez_states.clear();
        for a in assignments {
            self.charge_states.push(ChargeState {
                charge: a.charge,
                mh: a.mh(),
            });
            self.ez_states.push(ExtendedChargeState {
                charge: a.charge,
                mh: a.mh(),
                retention_time: a.retention_time,
                sum_intensity: a.sum_intensity,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_state_mz_conversion() {
        let mono = 1000.0;
        let zs = ChargeState {
            charge: 2,
            mh: mono + PROTON_MASS,
        };
        let expect = (mono + 2.0 * PROTON_MASS) / 2.0;
        assert!((zs.mz() - expect).abs() < 1e-9);

        let back = ChargeState::from_mz(2, expect);
        assert!((back.mh - zs.mh).abs() < 1e-9);
    }
}
