use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid service definition: {0}")]
    InvalidDefinition(String),

    #[error("Definition not found: {0}")]
    DefinitionNotFound(String),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

pub type Result<T> = std::result::Result<T, Error>;
