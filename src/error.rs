// ============================================
// src/error.rs
// Error type shared by the library modules
// ============================================

use thiserror::Error;

/// Errors produced by the deck, store and settings layers.
///
/// The scheduler itself is total over valid grades; the only way to reach it
/// with bad input is through [`crate::scheduler::Grade::new`], which reports
/// [`WordwizError::InvalidGrade`].
#[derive(Debug, Error)]
pub enum WordwizError {
    /// Grade outside `0..=5`.
    #[error("grade {0} is out of range (expected 0..=5)")]
    InvalidGrade(u8),
    /// A card with this key is already in the deck.
    #[error("duplicate card: {0}")]
    DuplicateCard(String),
    /// No card with this key exists in the deck.
    #[error("unknown card: {0}")]
    UnknownCard(String),
    /// The word list has no column that looks like the named field.
    #[error("could not detect a {0} column in the word list header")]
    MissingColumn(&'static str),
    /// The word list has no usable rows.
    #[error("word list is empty")]
    EmptyDeck,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("binary encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("binary decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

pub type Result<T> = std::result::Result<T, WordwizError>;
