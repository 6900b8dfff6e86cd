pub mod correlation;
pub mod special;

pub use correlation::{
    CorrelationError,
    CorrelationMode,
    CorrelationResult,
    correlate,
    pearson,
};
