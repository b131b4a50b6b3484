use std::num::ParseIntError;

pub mod chars;
pub mod diff;
pub mod history;
pub mod resolve;
pub mod shift;
pub mod spec;
pub mod specifier;

pub use diff::{DiffShape, parse_diff_args};
pub use resolve::{ReadError, Revision, RevisionReader, VersionKey, resolve, resolve_pair};
pub use spec::Spec;
pub use specifier::{AbsoluteSelector, SpecifierParser, StoreKind};

pub(crate) type Span<'a> = nom_locate::LocatedSpan<&'a str>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Empty version specification")]
    EmptySpec,

    #[error("Empty name before version specifier")]
    EmptyName,

    #[error("Ambiguous `~`: a shift must be `~` or `~<digits>`, and a name cannot contain `~` followed by a letter")]
    AmbiguousTilde(usize),

    #[error("{message}")]
    MissingSelectorValue { offset: usize, message: &'static str },

    #[error("Multiple absolute specifiers")]
    MultipleAbsoluteSpecifiers(usize),

    #[error("Unexpected characters: {text:?}")]
    UnexpectedCharacters { text: String, offset: usize },

    #[error("Shift out of range: {digits:?}")]
    ShiftOverflow { digits: String, offset: usize },

    #[error("Invalid version number")]
    InvalidNumber(#[from] ParseIntError),

    #[error("Invalid absolute specifier {value:?}")]
    InvalidSelectorValue {
        value: String,
        offset: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Unknown store kind {0:?} (expected `param` or `secret`)")]
    UnknownStoreKind(String),

    #[error("Expected 1 to 3 arguments, got {0}")]
    DiffUsage(usize),

    #[error("Invalid version1: {0}")]
    InvalidVersion1(#[source] Box<Error>),

    #[error("Invalid version2: {0}")]
    InvalidVersion2(#[source] Box<Error>),

    #[error("No revisions found for {0:?}")]
    NotFound(String),

    #[error("Version {0} not found")]
    VersionKeyNotFound(String),

    #[error("Label {0:?} not found")]
    LabelNotFound(String),

    #[error("Shift ~{0} is out of range")]
    ShiftOutOfRange(u32),

    #[error("{context}")]
    Read {
        context: &'static str,
        #[source]
        source: ReadError,
    },
}

impl Error {
    /// Byte offset into the trimmed input where a grammar error starts.
    ///
    /// For the three-argument diff errors the input is the name joined with the failing specifier.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::EmptyName => Some(0),
            Self::AmbiguousTilde(offset) | Self::MultipleAbsoluteSpecifiers(offset) => Some(*offset),
            Self::MissingSelectorValue { offset, .. }
            | Self::UnexpectedCharacters { offset, .. }
            | Self::ShiftOverflow { offset, .. }
            | Self::InvalidSelectorValue { offset, .. } => Some(*offset),
            Self::InvalidVersion1(inner) | Self::InvalidVersion2(inner) => inner.offset(),
            _ => None,
        }
    }

    pub fn is_grammar_error(&self) -> bool {
        match self {
            Self::EmptySpec
            | Self::EmptyName
            | Self::AmbiguousTilde(_)
            | Self::MissingSelectorValue { .. }
            | Self::MultipleAbsoluteSpecifiers(_)
            | Self::UnexpectedCharacters { .. }
            | Self::ShiftOverflow { .. }
            | Self::InvalidNumber(_)
            | Self::InvalidSelectorValue { .. } => true,
            Self::InvalidVersion1(inner) | Self::InvalidVersion2(inner) => inner.is_grammar_error(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
