use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadSignalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Acquisition error: {0}")]
    Acquisition(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Errors raised by the record store. `Duplicate` is an expected condition
/// (the domain was already enriched), `Backend` is a real write failure.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("row for domain {domain} already exists")]
    Duplicate { domain: String },

    #[error("storage backend error: {0}")]
    Backend(String),
}
