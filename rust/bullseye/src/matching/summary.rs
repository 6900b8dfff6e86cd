use crate::models::MatchOutcome;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

const SPECTRA_PER_BLOCK: usize = 1000;

/// Unmatched vs matched spectra over one block of consecutive spectra.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpectrumBlockCounts {
    /// Spectra processed up to and including this block.
    pub spectra_seen: usize,
    pub unmatched: usize,
    pub matched: usize,
}

/// Tallies of a matching run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchSummary {
    pub num_spectra: usize,
    pub unmatched: usize,
    /// Spectra with exactly one precursor.
    pub single: usize,
    /// Spectra with several precursors.
    pub multiple: usize,
    /// Precursor assignments made on spectra with several precursors.
    pub multiple_assignments: usize,
    /// Assignments per charge, charge 0 counts unmatched spectra.
    pub charge_histogram: BTreeMap<i32, usize>,
    pub blocks: Vec<SpectrumBlockCounts>,
    #[serde(skip)]
    current_block: SpectrumBlockCounts,
}

impl MatchSummary {
    pub fn record(&mut self, outcome: &MatchOutcome) {
        self.num_spectra += 1;
        match outcome {
            MatchOutcome::Unmatched => {
                self.unmatched += 1;
                *self.charge_histogram.entry(0).or_default() += 1;
                self.current_block.unmatched += 1;
            }
            MatchOutcome::Single(_) => {
                self.single += 1;
                self.current_block.matched += 1;
            }
            MatchOutcome::Multiple(v) => {
                self.multiple += 1;
                self.multiple_assignments += v.len();
                self.current_block.matched += 1;
            }
        }
        for a in outcome.assignments() {
            *self.charge_histogram.entry(a.charge).or_default() += 1;
        }

        self.current_block.spectra_seen = self.num_spectra;
        if self.num_spectra % SPECTRA_PER_BLOCK == 0 {
            self.blocks.push(std::mem::take(&mut self.current_block));
        }
    }

    /// Closes the trailing partial block.
    pub fn finish(&mut self) {
        if self.current_block.unmatched + self.current_block.matched > 0 {
            self.blocks.push(std::mem::take(&mut self.current_block));
        }
    }

    pub fn log(&self) {
        info!("{} scans had no visible parental distribution.", self.unmatched);
        info!("{} scans had a single parental distribution.", self.single);
        info!(
            "{} scans had multiple possible parental distributions.",
            self.multiple
        );
        for block in &self.blocks {
            info!(
                "Scan {}: {} unmatched, {} matched",
                block.spectra_seen, block.unmatched, block.matched
            );
        }
        for (charge, count) in &self.charge_histogram {
            if *charge == 0 {
                info!("Unknown charge: {}", count);
            } else {
                info!("+{}: {}", charge, count);
            }
        }
        info!(
            "{} singles and {} multiples total.",
            self.single, self.multiple_assignments
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrecursorAssignment;

    fn assignment(charge: i32) -> PrecursorAssignment {
        PrecursorAssignment {
            profile_index: 0,
            charge,
            mono_mass: 1000.0,
            intensity: 1.0,
            retention_time: 1.0,
            sum_intensity: 3.0,
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = MatchSummary::default();
        for i in 0..2500 {
            let outcome = match i % 5 {
                0 => MatchOutcome::Unmatched,
                1 | 2 => MatchOutcome::Single(assignment(2)),
                _ => MatchOutcome::Multiple(vec![assignment(2), assignment(3)]),
            };
            summary.record(&outcome);
        }
        summary.finish();

        assert_eq!(summary.num_spectra, 2500);
        assert_eq!(summary.unmatched, 500);
        assert_eq!(summary.single, 1000);
        assert_eq!(summary.multiple, 1000);
        assert_eq!(summary.multiple_assignments, 2000);
        assert_eq!(summary.charge_histogram[&0], 500);
        assert_eq!(summary.charge_histogram[&2], 2000);
        assert_eq!(summary.charge_histogram[&3], 1000);

        let seen: Vec<usize> = summary.blocks.iter().map(|b| b.spectra_seen).collect();
        assert_eq!(seen, vec![1000, 2000, 2500]);
        assert_eq!(summary.blocks[0].unmatched, 200);
        assert_eq!(summary.blocks[0].matched, 800);
        assert_eq!(summary.blocks[2].unmatched + summary.blocks[2].matched, 500);
    }
}
