use crate::models::{
    Detection,
    ScanRecord,
};

/// Position of a detection inside a [`ScanDetectionStore`].
///
/// Only valid until the next removal from the same scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionRef {
    pub scan_index: usize,
    pub detection_index: usize,
}

/// Working set of per-scan detections, in acquisition (ascending scan) order.
///
/// The tracker consumes detections from here one at a time, the scan
/// records themselves are never removed.
#[derive(Debug, Clone, Default)]
pub struct ScanDetectionStore {
    scans: Vec<ScanRecord>,
}

impl From<Vec<ScanRecord>> for ScanDetectionStore {
    fn from(scans: Vec<ScanRecord>) -> Self {
        Self { scans }
    }
}

impl ScanDetectionStore {
    pub fn push(&mut self, scan: ScanRecord) {
        self.scans.push(scan);
    }

    pub fn scans(&self) -> &[ScanRecord] {
        &self.scans
    }

    pub fn scan(&self, scan_index: usize) -> Option<&ScanRecord> {
        self.scans.get(scan_index)
    }

    /// Number of scans (drained or not).
    pub fn len(&self) -> usize {
        self.scans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// Detections still available across all scans.
    pub fn num_detections(&self) -> usize {
        self.scans.iter().map(|s| s.len()).sum()
    }

    pub fn sort_all_descending_intensity(&mut self) {
        self.scans
            .iter_mut()
            .for_each(|s| s.sort_descending_intensity());
    }

    pub fn detection(&self, loc: DetectionRef) -> Option<&Detection> {
        self.scans
            .get(loc.scan_index)
            .and_then(|s| s.detections().get(loc.detection_index))
    }

    /// Erases a detection in place.
    ///
    /// Any [`DetectionRef`] into the same scan at or after
    /// `detection_index` is stale afterwards.
    pub fn remove_detection(
        &mut self,
        scan_index: usize,
        detection_index: usize,
    ) -> Option<Detection> {
        let scan = self.scans.get_mut(scan_index)?;
        if detection_index >= scan.len() {
            return None;
        }
        Some(scan.remove(detection_index))
    }

    /// Most intense detection among the first detection of every scan.
    ///
    /// Only meaningful after [`Self::sort_all_descending_intensity`].
    /// On ties the earliest scan wins.
    pub fn find_max(&self) -> Option<DetectionRef> {
        let mut best: Option<(usize, f32)> = None;
        for (i, scan) in self.scans.iter().enumerate() {
            let Some(first) = scan.detections().first() else {
                continue;
            };
            match best {
                Some((_, max)) if first.intensity.total_cmp(&max).is_le() => {}
                _ => best = Some((i, first.intensity)),
            }
        }
        best.map(|(scan_index, _)| DetectionRef {
            scan_index,
            detection_index: 0,
        })
    }

    /// Retention time of the scan with the given scan number.
    pub fn retention_time(&self, scan_number: u32) -> Option<f32> {
        self.scans
            .iter()
            .find(|s| s.scan_number == scan_number)
            .map(|s| s.retention_time)
    }
}
