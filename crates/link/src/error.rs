use std::fmt;

use recmatch_table::TableError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// A mapping references a column absent from a record.
    MissingField { column: String },
    /// The match index was queried before `process()`.
    UnprocessedIndex,
    /// The match index was built for a different profile.
    ProfileMismatch(String),
    /// A stored match index contradicts its own source or profile.
    CorruptIndex(String),
    /// A profile row names an unknown comparison kind.
    InvalidCompareKind(String),
    /// A profile row holds a value of the wrong shape (points, strip flag).
    InvalidValue { column: String, value: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Profile config validation error.
    ConfigValidation(String),
    /// Record store error.
    Table(TableError),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { column } => {
                write!(f, "mapping references column '{column}' which does not exist in the record")
            }
            Self::UnprocessedIndex => write!(f, "match index has not been processed"),
            Self::ProfileMismatch(msg) => write!(f, "profile mismatch: {msg}"),
            Self::CorruptIndex(msg) => write!(f, "corrupt match index: {msg}"),
            Self::InvalidCompareKind(kind) => {
                write!(f, "invalid compare type '{kind}' (expected exact, prefix or fuzzy)")
            }
            Self::InvalidValue { column, value } => {
                write!(f, "profile column '{column}': invalid value '{value}'")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Table(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for LinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Table(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TableError> for LinkError {
    fn from(err: TableError) -> Self {
        Self::Table(err)
    }
}
