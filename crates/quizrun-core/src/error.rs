//! Error taxonomy for the quiz engine.
//!
//! Only caller input and bank loading can fail. Malformed records and
//! corrupt history never surface here; they degrade to smaller or empty data.

use thiserror::Error;

/// The caller asked for something the engine cannot do with the given input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No bank was selected for the attempt.
    #[error("select at least one bank")]
    NoBankSelected,

    /// A bank id that the manifest does not list.
    #[error("unknown bank: {0}")]
    UnknownBank(String),

    /// A listed bank that has not been loaded into the catalog yet.
    #[error("bank {0} is not loaded")]
    BankNotLoaded(String),

    /// A question index past the end of the attempt.
    #[error("question {index} is out of range (attempt has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },

    /// An option index outside 0..=3.
    #[error("option {0} is out of range (expected 0-3)")]
    OptionOutOfRange(usize),
}

/// A bank file or the manifest could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataLoadError {
    /// The manifest was missing or the source answered with a failure.
    #[error("cannot load banks manifest: {reason}")]
    ManifestUnavailable { reason: String },

    /// A bank file was missing or the source answered with a failure.
    #[error("cannot load bank file {file}: {reason}")]
    BankUnavailable { file: String, reason: String },

    /// The resource was retrieved but is not JSON of the expected shape.
    #[error("malformed {resource}: {reason}")]
    Malformed { resource: String, reason: String },
}

/// Any error the engine surfaces to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    DataLoad(#[from] DataLoadError),
}

impl QuizError {
    /// Returns `true` if the error came from caller input rather than I/O.
    pub fn is_validation(&self) -> bool {
        matches!(self, QuizError::Validation(_))
    }
}
