use std::fmt::Display;

/// Custom Result type for minirdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for minirdb
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed SQL statement
    Parse(String),
    /// Unknown or duplicate table, invalid column list, unknown column
    Schema(String),
    /// Value cannot be coerced into the column's declared type
    Type(String),
    /// PRIMARY KEY or UNIQUE conflict
    Constraint(String),
    /// INSERT supplied the wrong number of values
    ValueCount { expected: usize, got: usize },
}

impl From<std::num::ParseIntError> for Error {
    fn from(value: std::num::ParseIntError) -> Self {
        Error::Parse(value.to_string())
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "parse error {}", err),
            Error::Schema(err) => write!(f, "schema error {}", err),
            Error::Type(err) => write!(f, "type error {}", err),
            Error::Constraint(err) => write!(f, "constraint violation {}", err),
            Error::ValueCount { expected, got } => {
                write!(f, "expected {} values, got {}", expected, got)
            }
        }
    }
}
