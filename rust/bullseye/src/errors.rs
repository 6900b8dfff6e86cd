use crate::data_sources::SpectrumFormat;
use kronik::KronikError;
use std::path::PathBuf;

#[derive(Debug)]
pub enum SpectrumReadingError {
    MalformedLine {
        line: usize,
        content: String,
        context: &'static str,
    },
    /// A spectrum decoded by `mzdata` that can not be carried over.
    Conversion {
        id: String,
        reason: &'static str,
    },
    Io(std::io::Error),
}

impl std::fmt::Display for SpectrumReadingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedLine {
                line,
                content,
                context,
            } => write!(f, "line {}: {} ('{}')", line, context, content),
            Self::Conversion { id, reason } => write!(f, "spectrum '{}': {}", id, reason),
            Self::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SpectrumReadingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SpectrumReadingError {
    fn from(x: std::io::Error) -> Self {
        Self::Io(x)
    }
}

#[derive(Debug)]
pub enum BullseyeError {
    /// Requested output container cannot be written.
    UnsupportedOutputFormat {
        path: PathBuf,
        format: SpectrumFormat,
    },
    UnsupportedInputFormat {
        path: PathBuf,
        format: SpectrumFormat,
    },
    SpectrumReading {
        source: SpectrumReadingError,
        path: PathBuf,
    },
    Kronik(KronikError),
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

impl std::fmt::Display for BullseyeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedOutputFormat { path, format } => write!(
                f,
                "Output file format {:?} of {} not acceptable, choose one of ms2 or mgf",
                format,
                path.display()
            ),
            Self::UnsupportedInputFormat { path, format } => write!(
                f,
                "Cannot read spectra in {:?} format from {}, use ms2, mgf or mzML",
                format,
                path.display()
            ),
            Self::SpectrumReading { source, path } => {
                write!(f, "Error reading spectra from {}: {}", path.display(), source)
            }
            Self::Kronik(e) => write!(f, "{}", e),
            Self::Io { source, path } => {
                write!(f, "Unable to access {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for BullseyeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SpectrumReading { source, .. } => Some(source),
            Self::Kronik(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<KronikError> for BullseyeError {
    fn from(x: KronikError) -> Self {
        Self::Kronik(x)
    }
}

impl BullseyeError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { source, path }
    }

    pub(crate) fn reading(path: impl Into<PathBuf>) -> impl FnOnce(SpectrumReadingError) -> Self {
        let path = path.into();
        move |source| Self::SpectrumReading { source, path }
    }
}

pub type Result<T> = std::result::Result<T, BullseyeError>;
