use clap::{
    Args as ClapArgs,
    Parser,
    Subcommand,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Track persistent peptides and assign them to MS/MS spectra.
    Run(RunArgs),
    /// Only track persistent peptides, writing the profile report.
    Persist(PersistArgs),
    /// Write a template configuration file.
    WriteTemplate(WriteTemplateArgs),
}

/// Flags overriding the tracker section of the configuration.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct TrackingArgs {
    /// Number of missing scans tolerated inside a persistent peptide.
    #[arg(short, long)]
    pub gap_tolerance: Option<usize>,

    /// Mass tolerance (+/- ppm) when linking detections across scans.
    #[arg(short = 'r', long)]
    pub persist_tolerance: Option<f64>,

    /// Number of scans a peptide must be seen in to count as persistent.
    #[arg(short, long)]
    pub scan_tolerance: Option<usize>,
}

/// Flags overriding the filter, matcher and output sections.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct MatchingArgs {
    /// Peptides eluting this many minutes or longer are contaminants.
    #[arg(short = 'c', long)]
    pub max_persist: Option<f32>,

    /// Only match spectra on the base isotope peak.
    #[arg(short, long)]
    pub exact_match: bool,

    /// Highest monoisotopic mass kept for matching.
    #[arg(short, long)]
    pub max_mass: Option<f64>,

    /// Lowest monoisotopic mass kept for matching.
    #[arg(short = 'n', long)]
    pub min_mass: Option<f64>,

    /// Precursor m/z tolerance (+/- ppm) against the base isotope peak.
    #[arg(short = 'p', long)]
    pub exact_tolerance: Option<f64>,

    /// Retention time tolerance (+/- minutes) around a peptide's elution.
    #[arg(short = 't', long)]
    pub retention_tolerance: Option<f64>,

    /// Spectra buffered per output file before writing.
    #[arg(long)]
    pub batch_size: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Hardklör output with the MS1 detections.
    pub detections: PathBuf,

    /// MS/MS spectra to assign precursors to (ms2 or mgf).
    pub spectra: PathBuf,

    /// Output for the spectra that got a precursor (ms2 or mgf).
    pub matched_output: PathBuf,

    /// Output for the spectra without a precursor (ms2 or mgf).
    pub unmatched_output: PathBuf,

    /// The path to the json configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also write the persistent peptides used for matching.
    #[arg(long)]
    pub profile_report: Option<PathBuf>,

    /// Write the run summary as json.
    #[arg(long)]
    pub summary_output: Option<PathBuf>,

    #[command(flatten)]
    pub tracking: TrackingArgs,

    #[command(flatten)]
    pub matching: MatchingArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct PersistArgs {
    /// Hardklör output with the MS1 detections.
    pub detections: PathBuf,

    /// Tab separated report of the persistent peptides.
    pub output: PathBuf,

    /// The path to the json configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub tracking: TrackingArgs,
}

#[derive(Parser, Debug)]
pub struct WriteTemplateArgs {
    /// The directory to write the template to.
    #[arg(short, long)]
    pub output_path: PathBuf,
}
