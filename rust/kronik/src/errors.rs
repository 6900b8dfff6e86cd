use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KronikError {
    /// A detection feed record that could not be interpreted.
    #[error("Malformed input in {path} (line {line}): {reason}")]
    MalformedInput {
        path: String,
        line: u64,
        reason: String,
    },

    #[error("Unable to access {path}: {source}")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Delimited file error: {0}")]
    Csv(#[from] csv::Error),
}

impl KronikError {
    pub fn malformed(path: impl Into<String>, line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KronikError>;
