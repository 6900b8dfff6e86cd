mod assignment;
mod config;
mod spectrum;

pub use assignment::{
    MatchOutcome,
    PrecursorAssignment,
};
pub use config::{
    MatcherConfig,
    OutputOptions,
    ProfileFilters,
};
pub use spectrum::{
    ChargeState,
    ExtendedChargeState,
    MsmsSpectrum,
    PROTON_MASS,
    Peak,
};
