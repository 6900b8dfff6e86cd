#![doc = include_str!("../README.md")]

pub mod data_sources;
pub mod errors;
pub mod matching;
pub mod models;
pub mod pipeline;

pub use errors::{
    BullseyeError,
    SpectrumReadingError,
};
pub use matching::{
    MatchSummary,
    PrecursorMatcher,
};
pub use models::{
    MatchOutcome,
    MatcherConfig,
    MsmsSpectrum,
    OutputOptions,
    PrecursorAssignment,
    ProfileFilters,
};
pub use pipeline::{
    PipelineConfig,
    PipelinePaths,
    PipelineReport,
};
