use thiserror::Error;

/// Property list codec error
#[derive(Error, Debug)]
pub enum PlistError {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("duplicate dictionary key: {0:?}")]
    DuplicateKey(String),

    #[error("I/O error: {0}")]
    Io(String),
}
