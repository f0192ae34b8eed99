use thiserror::Error;

/// Domain errors raised by the store and surfaced by the HTTP layer.
///
/// Store functions return `anyhow::Result`; handlers downcast to this type
/// to pick a status code. Anything else is treated as an internal error.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid input: {0}")]
    Invalid(String),
}
