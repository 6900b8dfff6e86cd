#![doc = include_str!("../README.md")]

// Re-export main structures
pub use crate::models::{
    Detection,
    Modifications,
    Profile,
    ProfilePoint,
    ScanBound,
    ScanRecord,
    TrackerConfig,
};
pub use crate::stats::{
    CorrelationError,
    CorrelationMode,
    CorrelationResult,
};
pub use crate::store::{
    DetectionRef,
    ProfileSortKey,
    ProfileStore,
    ScanDetectionStore,
};
pub use crate::tracker::{
    PersistentSignalTracker,
    TrackerSummary,
};

// Declare modules
pub mod errors;
pub mod models;
pub mod serde;
pub mod stats;
pub mod store;
pub mod tracker;

// Re-export errors
pub use crate::errors::KronikError;
