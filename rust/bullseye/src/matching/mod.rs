pub mod lookup;
pub mod matcher;
pub mod summary;

pub use lookup::MzLookup;
pub use matcher::{
    PrecursorMatcher,
    isolation_window,
};
pub use summary::{
    MatchSummary,
    SpectrumBlockCounts,
};
