use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CovError {
    #[error("Negative hit count: {0}")]
    NegativeHitCount(i64),

    #[error("Invalid line number: {0} (line numbers start at 1)")]
    InvalidLineNumber(u32),

    #[error("Line number {line} exceeds the maximum of {max}")]
    LineOutOfRange { line: u32, max: u32 },
}

pub type Result<T> = std::result::Result<T, CovError>;
