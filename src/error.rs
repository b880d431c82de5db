use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("table template '{0}' is not registered")]
    UnknownTemplate(String),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}
