//! Greedy stitching of per-scan detections into persistent profiles.
//!
//! Every iteration takes the most intense detection left in the store,
//! walks left and right through neighbouring scans collecting detections
//! of the same charge within a ppm tolerance (tolerating short gaps), and
//! accepts the run as a [`Profile`] when enough scans matched. Matched
//! detections are consumed, so every detection seeds or joins at most one
//! profile.

pub mod interpolate;

use crate::models::{
    Detection,
    Profile,
    ProfilePoint,
    ScanBound,
    TrackerConfig,
};
use crate::store::{
    DetectionRef,
    ProfileStore,
    ScanDetectionStore,
};
use interpolate::Anchor;
use serde::Serialize;
use tracing::{
    debug,
    info,
    instrument,
    warn,
};

/// One visited scan of a run, `detection_index` is `None` for a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RunSlot {
    scan_index: usize,
    detection_index: Option<usize>,
}

impl RunSlot {
    fn is_gap(&self) -> bool {
        self.detection_index.is_none()
    }
}

/// Bookkeeping of a finished tracking run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrackerSummary {
    pub initial_detections: usize,
    /// Detections that ended up in an accepted profile (seeds included).
    pub consumed_detections: usize,
    /// Seeds whose run was too short.
    pub discarded_seeds: usize,
    pub num_profiles: usize,
    /// Detections left in the store when the loop stopped (0 unless aborted).
    pub remaining_detections: usize,
}

#[derive(Debug, Clone)]
pub struct PersistentSignalTracker {
    config: TrackerConfig,
}

impl PersistentSignalTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Drains `store` into persistent profiles.
    pub fn run(&self, store: &mut ScanDetectionStore) -> ProfileStore {
        self.run_with_progress(store, |_| {}).0
    }

    /// Same as [`Self::run`], calling `on_progress` with the percentage of
    /// detections consumed every time it increases.
    #[instrument(skip_all)]
    pub fn run_with_progress(
        &self,
        store: &mut ScanDetectionStore,
        mut on_progress: impl FnMut(u8),
    ) -> (ProfileStore, TrackerSummary) {
        store.sort_all_descending_intensity();

        let initial = store.num_detections();
        let mut remaining = initial;
        let mut summary = TrackerSummary {
            initial_detections: initial,
            ..Default::default()
        };
        let mut profiles = ProfileStore::default();
        let mut last_percent = 0u8;

        info!(
            "Finding persistent peptide signals in {} detections from {} scans",
            initial,
            store.len()
        );

        while remaining > 0 {
            let Some(seed_loc) = store.find_max() else {
                break;
            };
            let Some(seed) = store.detection(seed_loc).cloned() else {
                break;
            };

            let (mut left, left_matches) = self.extend(
                store,
                &seed,
                (0..seed_loc.scan_index).rev(),
            );
            let (mut right, right_matches) = self.extend(
                store,
                &seed,
                (seed_loc.scan_index + 1)..store.len(),
            );
            trim_trailing_gaps(&mut left);
            trim_trailing_gaps(&mut right);

            let match_count = 1 + left_matches + right_matches;
            if match_count >= self.config.match_run_length {
                let profile = build_profile(store, seed_loc, &seed, &left, &right);
                profiles.add(profile);

                for slot in left.iter().chain(right.iter()) {
                    let removed = slot
                        .detection_index
                        .and_then(|det_idx| store.remove_detection(slot.scan_index, det_idx));
                    if removed.is_some() {
                        remaining -= 1;
                        summary.consumed_detections += 1;
                    }
                }
                summary.consumed_detections += 1;
            } else {
                summary.discarded_seeds += 1;
            }

            store.remove_detection(seed_loc.scan_index, seed_loc.detection_index);
            remaining -= 1;

            let percent = progress_percent(remaining, initial);
            if percent > last_percent {
                debug!("Tracking {}% done", percent);
                on_progress(percent);
                last_percent = percent;
            }
        }

        summary.num_profiles = profiles.len();
        summary.remaining_detections = remaining;
        if profiles.is_empty() {
            warn!("No persistent peptide signals were found");
        } else {
            info!(
                "Found {} persistent peptide signals ({} detections consumed, {} seeds discarded)",
                summary.num_profiles, summary.consumed_detections, summary.discarded_seeds
            );
        }
        (profiles, summary)
    }

    /// Walks away from the seed over `scan_indices` while the consecutive
    /// gap count stays within tolerance.
    fn extend(
        &self,
        store: &ScanDetectionStore,
        seed: &Detection,
        scan_indices: impl Iterator<Item = usize>,
    ) -> (Vec<RunSlot>, usize) {
        let mut slots = Vec::new();
        let mut gap = 0;
        let mut matches = 0;
        for scan_index in scan_indices {
            if gap > self.config.gap_tolerance {
                break;
            }
            let detection_index = store.scans()[scan_index].find_match(
                seed.mono_mass,
                seed.charge,
                self.config.ppm_tolerance,
            );
            if detection_index.is_some() {
                gap = 0;
                matches += 1;
            } else {
                gap += 1;
            }
            slots.push(RunSlot {
                scan_index,
                detection_index,
            });
        }
        (slots, matches)
    }
}

fn trim_trailing_gaps(slots: &mut Vec<RunSlot>) {
    while slots.last().is_some_and(RunSlot::is_gap) {
        slots.pop();
    }
}

pub fn progress_percent(remaining: usize, initial: usize) -> u8 {
    if initial == 0 {
        return 100;
    }
    let frac = remaining as f32 / initial as f32;
    100 - (frac * 100.0) as u8
}

fn bound_of(store: &ScanDetectionStore, scan_index: usize) -> ScanBound {
    let scan = &store.scans()[scan_index];
    ScanBound {
        scan_number: scan.scan_number,
        retention_time: scan.retention_time,
    }
}

fn build_profile(
    store: &ScanDetectionStore,
    seed_loc: DetectionRef,
    seed: &Detection,
    left: &[RunSlot],
    right: &[RunSlot],
) -> Profile {
    let seed_bound = bound_of(store, seed_loc.scan_index);
    let low = left
        .last()
        .map(|s| bound_of(store, s.scan_index))
        .unwrap_or(seed_bound);
    let high = right
        .last()
        .map(|s| bound_of(store, s.scan_index))
        .unwrap_or(seed_bound);

    let seed_anchor = Anchor::new(seed_bound.scan_number, seed);
    let mut points = Vec::with_capacity(left.len() + right.len() + 1);
    points.push(ProfilePoint::observed(
        seed_bound.scan_number,
        seed_bound.retention_time,
        seed,
    ));
    side_points(store, seed_anchor, left, &mut points);
    side_points(store, seed_anchor, right, &mut points);

    Profile::new(seed, seed_bound, low, high, points)
}

fn resolve<'s>(store: &'s ScanDetectionStore, slot: &RunSlot) -> Option<&'s Detection> {
    slot.detection_index.and_then(|d| {
        store.detection(DetectionRef {
            scan_index: slot.scan_index,
            detection_index: d,
        })
    })
}

/// Points for one side of a run, ordered away from the seed.
///
/// A gap is interpolated between the closest observed point towards the
/// seed (the seed itself if there is none) and the closest observed point
/// further out.
fn side_points(
    store: &ScanDetectionStore,
    seed_anchor: Anchor,
    side: &[RunSlot],
    out: &mut Vec<ProfilePoint>,
) {
    let mut near = seed_anchor;
    for (j, slot) in side.iter().enumerate() {
        let scan = &store.scans()[slot.scan_index];
        match resolve(store, slot) {
            Some(det) => {
                out.push(ProfilePoint::observed(
                    scan.scan_number,
                    scan.retention_time,
                    det,
                ));
                near = Anchor::new(scan.scan_number, det);
            }
            None => {
                let far = side[j + 1..]
                    .iter()
                    .find_map(|s| {
                        let sc = &store.scans()[s.scan_index];
                        resolve(store, s).map(|d| Anchor::new(sc.scan_number, d))
                    })
                    .unwrap_or(near);
                out.push(near.interpolate_at(&far, scan.scan_number, scan.retention_time));
            }
        }
    }
}
