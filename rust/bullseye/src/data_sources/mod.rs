pub mod format;
pub mod ms2_reader;
pub mod mz_reader;
pub mod writer;

pub use format::SpectrumFormat;
pub use ms2_reader::Ms2Reader;
pub use mz_reader::MzSpectrumReader;
pub use writer::{
    BatchedSpectrumWriter,
    MgfWriter,
    Ms2Writer,
    SpectrumWriter,
};

use crate::errors::{
    BullseyeError,
    Result,
    SpectrumReadingError,
};
use crate::models::MsmsSpectrum;
use mzdata::prelude::*;
use mzdata::{
    MGFReader,
    MzMLReader,
};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

pub type SpectrumIter =
    Box<dyn Iterator<Item = std::result::Result<MsmsSpectrum, SpectrumReadingError>>>;

/// Opens a spectrum file for streaming, returning its header lines and
/// the spectra.
///
/// mgf and mzML are decoded through `mzdata`, their header is empty since
/// global parameters are not carried over to other formats.
pub fn open_spectra(path: &Path) -> Result<(Vec<String>, SpectrumIter)> {
    let format = SpectrumFormat::from_path(path);
    if !format.is_readable() {
        return Err(BullseyeError::UnsupportedInputFormat {
            path: path.to_path_buf(),
            format,
        });
    }
    info!("Reading {:?} spectra from {}", format, path.display());
    match format {
        SpectrumFormat::Mgf => {
            let reader = MGFReader::open_path(path).map_err(BullseyeError::io(path))?;
            Ok((Vec::new(), Box::new(MzSpectrumReader::new(reader))))
        }
        SpectrumFormat::MzMl => {
            let reader = MzMLReader::open_path(path).map_err(BullseyeError::io(path))?;
            Ok((Vec::new(), Box::new(MzSpectrumReader::new(reader))))
        }
        _ => {
            let file = BufReader::new(File::open(path).map_err(BullseyeError::io(path))?);
            let reader = Ms2Reader::new(file).map_err(BullseyeError::reading(path))?;
            Ok((reader.header().to_vec(), Box::new(reader)))
        }
    }
}
