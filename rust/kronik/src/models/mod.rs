pub mod detection;
pub mod profile;
pub mod tolerance;

pub use detection::{
    Detection,
    Modifications,
    ScanRecord,
};
pub use profile::{
    Profile,
    ProfilePoint,
    ScanBound,
};
pub use tolerance::TrackerConfig;
