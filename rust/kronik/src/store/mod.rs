mod profile_store;
mod scan_store;

pub use profile_store::{
    ProfileSortKey,
    ProfileStore,
};
pub use scan_store::{
    DetectionRef,
    ScanDetectionStore,
};
