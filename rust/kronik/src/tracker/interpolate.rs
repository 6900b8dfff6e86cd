use crate::models::{
    Detection,
    ProfilePoint,
};

/// Value at `x` on the line through `(x1, y1)` and `(x2, y2)`.
pub fn linear_interpolate(x1: f64, x2: f64, y1: f64, y2: f64, x: f64) -> f64 {
    let m = (y2 - y1) / (x2 - x1);
    let b = y2 - m * x2;
    m * x + b
}

/// An observed point a gap can be interpolated from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub scan_number: u32,
    pub intensity: f32,
    pub mono_mass: f64,
}

impl Anchor {
    pub fn new(scan_number: u32, detection: &Detection) -> Self {
        Self {
            scan_number,
            intensity: detection.intensity,
            mono_mass: detection.mono_mass,
        }
    }

    /// Builds the interpolated point for a missing scan between `self` and `other`.
    ///
    /// Both anchors on the same scan degenerate to copying `self`.
    pub fn interpolate_at(
        &self,
        other: &Anchor,
        scan_number: u32,
        retention_time: f32,
    ) -> ProfilePoint {
        if self.scan_number == other.scan_number {
            return ProfilePoint::interpolated(
                scan_number,
                retention_time,
                self.intensity,
                self.mono_mass,
            );
        }
        let x1 = self.scan_number as f64;
        let x2 = other.scan_number as f64;
        let x = scan_number as f64;
        let intensity = linear_interpolate(
            x1,
            x2,
            self.intensity as f64,
            other.intensity as f64,
            x,
        );
        let mono_mass = linear_interpolate(x1, x2, self.mono_mass, other.mono_mass, x);
        ProfilePoint::interpolated(scan_number, retention_time, intensity as f32, mono_mass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_interpolate() {
        assert_eq!(linear_interpolate(10.0, 13.0, 100.0, 400.0, 11.0), 200.0);
        assert_eq!(linear_interpolate(10.0, 13.0, 100.0, 400.0, 12.0), 300.0);
        // Works the same walking right to left
        assert_eq!(linear_interpolate(13.0, 10.0, 400.0, 100.0, 11.0), 200.0);
    }

    #[test]
    fn test_anchor_interpolation() {
        let near = Anchor {
            scan_number: 10,
            intensity: 100.0,
            mono_mass: 1000.0,
        };
        let far = Anchor {
            scan_number: 12,
            intensity: 300.0,
            mono_mass: 1000.002,
        };
        let pt = near.interpolate_at(&far, 11, 3.3);
        assert!(pt.interpolated);
        assert_eq!(pt.xcorr, 0.0);
        assert_eq!(pt.intensity, 200.0);
        assert!((pt.mono_mass - 1000.001).abs() < 1e-9);
        assert_eq!(pt.retention_time, 3.3);

        let same = near.interpolate_at(&near, 11, 3.3);
        assert_eq!(same.intensity, 100.0);
    }
}
