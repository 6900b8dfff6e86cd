use super::special::incomplete_beta;
use crate::models::Profile;
use serde::Serialize;
use thiserror::Error;

const TINY: f64 = 1.0e-20;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrelationError {
    /// The two profiles share no scan to compare.
    #[error("Profiles have no overlapping scans")]
    NoOverlap,
    /// One of the profiles has no points at all.
    #[error("Cannot correlate an empty profile")]
    EmptyProfile,
}

/// How the points of two profiles get paired up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationMode {
    /// Pair points that share a scan number.
    ByScan,
    /// Pair points at equal offsets from each profile's apex.
    /// When interpolated points are not included they count as zero
    /// intensity (the apex itself is always taken as is).
    ApexAligned { include_interpolated: bool },
}

impl CorrelationMode {
    pub fn new(align_by_scan: bool, include_interpolated: bool) -> Self {
        if align_by_scan {
            Self::ByScan
        } else {
            Self::ApexAligned {
                include_interpolated,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationResult {
    /// Pearson correlation, negative values are kept as is.
    pub r: f64,
    /// Two tailed significance of `max(r, 0)`.
    pub p_value: f64,
    pub slope: f64,
    pub intercept: f64,
    pub sum_a: f32,
    pub sum_b: f32,
    pub num_pairs: usize,
}

/// Correlates the intensity traces of two profiles.
///
/// # Example
///
/// ```
/// use kronik::stats::correlation::{correlate, CorrelationMode};
/// use kronik::{Detection, Profile, ProfilePoint, ScanBound};
///
/// fn trace(intensities: &[f32]) -> Profile {
///     let points: Vec<ProfilePoint> = intensities
///         .iter()
///         .enumerate()
///         .map(|(i, x)| {
///             ProfilePoint::observed(i as u32, i as f32, &Detection::new(1000.0, 2, *x, 501.0))
///         })
///         .collect();
///     let bound = |i: usize| ScanBound { scan_number: i as u32, retention_time: i as f32 };
///     let seed = Detection::new(1000.0, 2, 1.0, 501.0);
///     Profile::new(&seed, bound(0), bound(0), bound(intensities.len() - 1), points)
/// }
///
/// let a = trace(&[1.0, 4.0, 9.0, 4.0, 1.0]);
/// let b = trace(&[2.0, 8.0, 18.0, 8.0, 2.0]);
/// let res = correlate(&a, &b, CorrelationMode::ByScan).unwrap();
/// assert!((res.r - 1.0).abs() < 1e-9);
/// assert!(res.p_value < 0.01);
/// ```
pub fn correlate(
    a: &Profile,
    b: &Profile,
    mode: CorrelationMode,
) -> Result<CorrelationResult, CorrelationError> {
    if a.points().is_empty() || b.points().is_empty() {
        return Err(CorrelationError::EmptyProfile);
    }
    let (xs, ys) = match mode {
        CorrelationMode::ByScan => pair_by_scan(a, b)?,
        CorrelationMode::ApexAligned {
            include_interpolated,
        } => pair_by_apex(a, b, include_interpolated),
    };
    Ok(pearson(&xs, &ys))
}

fn pair_by_scan(a: &Profile, b: &Profile) -> Result<(Vec<f32>, Vec<f32>), CorrelationError> {
    let pa = a.points();
    let pb = b.points();
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < pa.len() && j < pb.len() {
        match pa[i].scan_number.cmp(&pb[j].scan_number) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                xs.push(pa[i].intensity);
                ys.push(pb[j].intensity);
                i += 1;
                j += 1;
            }
        }
    }
    if xs.is_empty() {
        return Err(CorrelationError::NoOverlap);
    }
    Ok((xs, ys))
}

fn pair_by_apex(a: &Profile, b: &Profile, include_interpolated: bool) -> (Vec<f32>, Vec<f32>) {
    let pa = a.points();
    let pb = b.points();
    // Both are non-empty here
    let max1 = a.apex_index().unwrap_or(0);
    let max2 = b.apex_index().unwrap_or(0);

    let sample = |points: &[crate::models::ProfilePoint], idx: usize| {
        let p = points[idx];
        if p.interpolated && !include_interpolated {
            0.0
        } else {
            p.intensity
        }
    };

    let mut xs = vec![pa[max1].intensity];
    let mut ys = vec![pb[max2].intensity];

    let left = max1.min(max2);
    for off in 1..=left {
        xs.push(sample(pa, max1 - off));
        ys.push(sample(pb, max2 - off));
    }

    let right = (pa.len() - max1).min(pb.len() - max2);
    for off in 1..right {
        xs.push(sample(pa, max1 + off));
        ys.push(sample(pb, max2 + off));
    }
    (xs, ys)
}

/// Pearson correlation, Student-t significance and the line fit of two
/// equally long samples.
pub fn pearson(xs: &[f32], ys: &[f32]) -> CorrelationResult {
    let n = xs.len().min(ys.len());
    let nf = n as f64;

    let mut sumx = 0.0;
    let mut sumy = 0.0;
    let mut sumxy = 0.0;
    let mut sumxx = 0.0;
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let (x, y) = (x as f64, y as f64);
        sumx += x;
        sumy += y;
        sumxy += x * y;
        sumxx += x * x;
    }

    let ax = sumx / nf;
    let ay = sumy / nf;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let xt = x as f64 - ax;
        let yt = y as f64 - ay;
        sxx += xt * xt;
        syy += yt * yt;
        sxy += xt * yt;
    }
    let r = sxy / ((sxx * syy).sqrt() + TINY);

    // Anticorrelated traces are not evidence of co-elution. The upper
    // clamp only absorbs rounding above 1.0.
    let lr = r.clamp(0.0, 1.0);
    let df = nf - 2.0;
    let p_value = if df < 1.0 {
        1.0
    } else {
        let t = lr * (df / ((1.0 - lr + TINY) * (1.0 + lr + TINY))).sqrt();
        incomplete_beta(0.5 * df, 0.5, df / (df + t * t))
    };

    // NOTE: kept exactly as the historical QC output computes it,
    // it is not the textbook least squares fit.
    let denom = sumx * sumx - nf * sumxx;
    let slope = (sumx * sumy - nf * sumxy) / denom;
    let intercept = (sumx * sumxy - sumy * sumxx) / denom;

    CorrelationResult {
        r,
        p_value,
        slope,
        intercept,
        sum_a: sumx as f32,
        sum_b: sumy as f32,
        num_pairs: n,
    }
}
