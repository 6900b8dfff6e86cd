use bullseye::BullseyeError;
use kronik::KronikError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unable to set up logging: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error(transparent)]
    Bullseye(#[from] BullseyeError),

    #[error(transparent)]
    Kronik(#[from] KronikError),
}
