use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Fatal problems while decoding one class file. A failure only discards the
/// file it came from; the rest of a batch keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid class file: {origin}")]
    InvalidFormat { origin: String },

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownConstant { tag: u8, index: u16 },

    #[error("truncated input: needed {needed} byte(s) at offset {offset}")]
    TruncatedInput { offset: usize, needed: usize },

    #[error("malformed descriptor: {0}")]
    MalformedDescriptor(String),

    #[error("illegal constant pool index {index} (pool size {size})")]
    IllegalPoolIndex { index: u16, size: usize },

    #[error("constant pool entry {index} is {found}, expected {expected}")]
    UnexpectedConstant {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },

    #[error("constant pool entry {index} is not valid modified UTF-8")]
    InvalidUtf8 { index: u16 },
}

/// Recoverable annotation problems. The affected annotation attribute is
/// abandoned, everything collected before it is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeWarning {
    UnrecognizedAnnotationTag { tag: u8, offset: usize },
    AnnotationTooDeep { limit: usize },
}

impl std::fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeWarning::UnrecognizedAnnotationTag { tag, offset } => write!(
                f,
                "unexpected annotation element tag '{}' at offset {offset}",
                char::from(*tag)
            ),
            DecodeWarning::AnnotationTooDeep { limit } => {
                write!(f, "annotation nesting exceeds {limit} levels")
            }
        }
    }
}
