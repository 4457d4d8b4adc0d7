use std::fmt;

/// Crate-wide error type. Library functions return `Result<T, Error>` and
/// never log or retry; callers at a process boundary (the CLI binaries) are
/// responsible for reporting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// `validate_board` rejected a board: wrong length, a cell outside its
    /// legal domain, or a piece-count cap exceeded.
    InvalidBoard(String),

    /// A 5-character code decoded to an out-of-range or internally
    /// inconsistent packed integer.
    InvalidCode(String),

    /// An index was out of `[0, TOTAL_POSITIONS)`, or `index_to_board`'s
    /// inner decomposition produced contradictory counts.
    InvalidIndex(String),

    /// A loaded database file's size was neither `2*TOTAL_POSITIONS` nor
    /// `4*TOTAL_POSITIONS` bytes.
    CorruptDatabase(String),

    /// Underlying storage read/write failed.
    IoFailure(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidBoard(msg) => write!(f, "invalid board: {msg}"),
            Error::InvalidCode(msg) => write!(f, "invalid code: {msg}"),
            Error::InvalidIndex(msg) => write!(f, "invalid index: {msg}"),
            Error::CorruptDatabase(msg) => write!(f, "corrupt database: {msg}"),
            Error::IoFailure(msg) => write!(f, "io failure: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::IoFailure(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
