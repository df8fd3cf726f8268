#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}
