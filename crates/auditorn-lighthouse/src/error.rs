use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),

    #[error("Failed to launch Lighthouse: {0}")]
    Launch(String),

    #[error("Audit failed: {0}")]
    Audit(String),

    #[error("Failed to parse Lighthouse output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors that will repeat on every trial, as opposed to a single failed audit
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::Launch(_) | Error::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
