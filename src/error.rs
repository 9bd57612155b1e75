// ─── Error ──────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("short buffer: need {needed} bytes at offset {offset}, buffer has {len}")]
    ShortBuffer {
        offset: usize,
        needed: usize,
        len: usize,
    },
    #[error("invalid tag 0x{tag:02x} at offset {offset}")]
    InvalidTag { tag: u8, offset: usize },
    #[error("expected a map at offset {offset}, found tag 0x{tag:02x}")]
    NotAMap { tag: u8, offset: usize },
    #[error("expected an array at offset {offset}, found tag 0x{tag:02x}")]
    NotAnArray { tag: u8, offset: usize },
    #[error("map key at offset {offset} is not a string (tag 0x{tag:02x})")]
    UnsupportedKeyType { tag: u8, offset: usize },
    #[error("Field not found")]
    FieldNotFound,
    #[error("Field already exists")]
    FieldExists,
    #[error("map exceeds the u32 pair-count limit")]
    TooManyFields,
    #[error("nesting deeper than {limit} levels")]
    DepthLimitExceeded { limit: usize },
    #[error("invalid utf-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("config error: {0}")]
    Config(String),
}

impl EditError {
    /// True for the conditions caused by malformed or truncated input, as
    /// opposed to the lookup outcomes `FieldNotFound` / `FieldExists`.
    pub fn is_malformed(&self) -> bool {
        !matches!(
            self,
            EditError::FieldNotFound
                | EditError::FieldExists
                | EditError::TooManyFields
                | EditError::Config(_)
        )
    }
}
