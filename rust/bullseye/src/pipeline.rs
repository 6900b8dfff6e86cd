//! Detection feed in, annotated spectra out.
//!
//! 1. Output formats and the spectrum input are validated before anything is read.
//! 2. The detection feed is tracked into persistent profiles.
//! 3. Contaminants and out of range masses are filtered out.
//! 4. MS2 spectra are streamed in batches, matched in parallel and written
//!    in input order to the matched or unmatched output.
//! 5. The optional profile report is written with the MS2 event counts.

use crate::data_sources::{
    BatchedSpectrumWriter,
    SpectrumFormat,
    open_spectra,
};
use crate::errors::{
    BullseyeError,
    Result,
};
use crate::matching::{
    MatchSummary,
    PrecursorMatcher,
};
use crate::models::{
    MatchOutcome,
    MatcherConfig,
    MsmsSpectrum,
    OutputOptions,
    ProfileFilters,
};
use kronik::serde::{
    read_detection_feed,
    write_profile_report_file,
};
use kronik::{
    PersistentSignalTracker,
    ProfileStore,
    TrackerConfig,
    TrackerSummary,
};
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::{
    Path,
    PathBuf,
};
use std::time::Instant;
use tracing::{
    info,
    instrument,
    warn,
};

/// Value of the `FileGenerator` header line added to ms2 outputs.
pub const FILE_GENERATOR: &str = concat!("bullseye ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub tracker: TrackerConfig,
    pub matcher: MatcherConfig,
    pub filters: ProfileFilters,
    pub output: OutputOptions,
}

#[derive(Debug, Clone)]
pub struct PipelinePaths {
    /// Hardklör style detection feed.
    pub detections: PathBuf,
    pub spectra: PathBuf,
    pub matched_output: PathBuf,
    pub unmatched_output: PathBuf,
    /// Optional tab separated report of the profiles used for matching.
    pub profile_report: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub tracker: TrackerSummary,
    pub profiles_after_contaminant_filter: usize,
    pub profiles_after_mass_filter: usize,
    /// Profiles assigned to at least one MS2 spectrum.
    pub profiles_with_ms2_events: usize,
    /// Sum of the MS2 event counts over all profiles.
    pub ms2_events: u64,
    pub matches: MatchSummary,
}

/// Hooks for reporting progress, all of them default to doing nothing.
pub trait PipelineProgress {
    fn tracking(&mut self, _percent: u8) {}
    fn tracking_done(&mut self) {}
    fn spectra_processed(&mut self, _total: usize) {}
}

impl PipelineProgress for () {}

pub fn check_output_format(path: &Path) -> Result<SpectrumFormat> {
    let format = SpectrumFormat::from_path(path);
    if !format.is_writable() {
        return Err(BullseyeError::UnsupportedOutputFormat {
            path: path.to_path_buf(),
            format,
        });
    }
    Ok(format)
}

/// Rejects spectrum inputs that can not be read, before any tracking is done.
pub fn check_input_format(path: &Path) -> Result<SpectrumFormat> {
    let format = SpectrumFormat::from_path(path);
    if !format.is_readable() {
        return Err(BullseyeError::UnsupportedInputFormat {
            path: path.to_path_buf(),
            format,
        });
    }
    std::fs::metadata(path).map_err(BullseyeError::io(path))?;
    Ok(format)
}

/// Drops contaminants and profiles outside the mass range, returning the
/// number of profiles left after each step.
pub fn apply_filters(profiles: &mut ProfileStore, filters: &ProfileFilters) -> (usize, usize) {
    profiles.remove_contaminants(filters.max_persist);
    let after_contaminants = profiles.len();
    info!(
        "Persistent peptides after removing contaminants: {}",
        after_contaminants
    );
    profiles.remove_outside_mass_range(filters.min_mass, filters.max_mass);
    let after_mass = profiles.len();
    info!(
        "Persistent peptides from {} to {}: {}",
        filters.min_mass, filters.max_mass, after_mass
    );
    (after_contaminants, after_mass)
}

/// Tracks the detection feed into persistent profiles.
pub fn track_profiles(
    detections: &Path,
    config: &TrackerConfig,
    progress: &mut impl PipelineProgress,
) -> Result<(ProfileStore, TrackerSummary)> {
    let mut store = read_detection_feed(detections)?;
    let tracker = PersistentSignalTracker::new(config.clone());
    let out = tracker.run_with_progress(&mut store, |pct| progress.tracking(pct));
    progress.tracking_done();
    Ok(out)
}

fn route_batch(
    matcher: &mut PrecursorMatcher,
    batch: Vec<MsmsSpectrum>,
    matched: &mut BatchedSpectrumWriter,
    unmatched: &mut BatchedSpectrumWriter,
    summary: &mut MatchSummary,
) -> Result<()> {
    let outcomes: Vec<MatchOutcome> = {
        let matcher: &PrecursorMatcher = matcher;
        batch.par_iter().map(|s| matcher.match_spectrum(s)).collect()
    };
    for (mut spectrum, outcome) in batch.into_iter().zip(outcomes) {
        matcher.record_ms2_events(&outcome);
        summary.record(&outcome);
        if outcome.is_matched() {
            spectrum.annotate(outcome.assignments());
            matched.push(spectrum)?;
        } else {
            unmatched.push(spectrum)?;
        }
    }
    Ok(())
}

/// Matches every MS2 spectrum of `spectra` against the profiles.
pub fn match_spectra(
    matcher: &mut PrecursorMatcher,
    spectra: &Path,
    matched_output: &Path,
    unmatched_output: &Path,
    output: &OutputOptions,
    progress: &mut impl PipelineProgress,
) -> Result<MatchSummary> {
    let (mut header, reader) = open_spectra(spectra)?;
    header.push(format!("FileGenerator\t{}", FILE_GENERATOR));
    let mut matched = BatchedSpectrumWriter::create(
        matched_output,
        &header,
        output.batch_size,
        output.mz_precision,
    )?;
    let mut unmatched = BatchedSpectrumWriter::create(
        unmatched_output,
        &header,
        output.batch_size,
        output.mz_precision,
    )?;

    let batch_size = output.batch_size.max(1);
    let mut summary = MatchSummary::default();
    let mut batch = Vec::with_capacity(batch_size);
    let mut num_read = 0;
    for spectrum in reader {
        let spectrum = spectrum.map_err(BullseyeError::reading(spectra))?;
        if spectrum.ms_level != 2 {
            continue;
        }
        batch.push(spectrum);
        if batch.len() >= batch_size {
            num_read += batch.len();
            let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
            route_batch(matcher, full, &mut matched, &mut unmatched, &mut summary)?;
            progress.spectra_processed(num_read);
        }
    }
    if !batch.is_empty() {
        num_read += batch.len();
        route_batch(matcher, batch, &mut matched, &mut unmatched, &mut summary)?;
        progress.spectra_processed(num_read);
    }

    let n_matched = matched.finish()?;
    let n_unmatched = unmatched.finish()?;
    summary.finish();
    info!(
        "Wrote {} matched spectra to {} and {} unmatched to {}",
        n_matched,
        matched_output.display(),
        n_unmatched,
        unmatched_output.display()
    );
    Ok(summary)
}

/// Runs the whole thing, see the module docs.
#[instrument(skip_all)]
pub fn run(
    paths: &PipelinePaths,
    config: &PipelineConfig,
    progress: &mut impl PipelineProgress,
) -> Result<PipelineReport> {
    let start = Instant::now();
    check_output_format(&paths.matched_output)?;
    check_output_format(&paths.unmatched_output)?;
    check_input_format(&paths.spectra)?;

    let (mut profiles, tracker_summary) =
        track_profiles(&paths.detections, &config.tracker, progress)?;
    if profiles.is_empty() {
        warn!("No analysis results, all spectra will be written as unmatched");
    }
    let (after_contaminants, after_mass) = apply_filters(&mut profiles, &config.filters);

    let mut matcher = PrecursorMatcher::new(profiles, config.matcher.clone());
    let matches = match_spectra(
        &mut matcher,
        &paths.spectra,
        &paths.matched_output,
        &paths.unmatched_output,
        &config.output,
        progress,
    )?;
    matches.log();

    let profiles = matcher.into_profiles();
    let profiles_with_ms2_events = profiles.iter().filter(|p| p.ms2_event_count > 0).count();
    let ms2_events: u64 = profiles.iter().map(|p| p.ms2_event_count as u64).sum();
    info!(
        "{} of {} persistent peptides were selected for MS2 ({} events)",
        profiles_with_ms2_events,
        profiles.len(),
        ms2_events
    );
    if let Some(report_path) = &paths.profile_report {
        write_profile_report_file(&profiles, report_path)?;
    }
    info!("Pipeline finished in {:?}", start.elapsed());

    Ok(PipelineReport {
        tracker: tracker_summary,
        profiles_after_contaminant_filter: after_contaminants,
        profiles_after_mass_filter: after_mass,
        profiles_with_ms2_events,
        ms2_events,
        matches,
    })
}
