mod hardklor_io;
mod profile_report;

pub use hardklor_io::{
    parse_detection_feed,
    read_detection_feed,
};
pub use profile_report::{
    write_profile_report,
    write_profile_report_file,
};
