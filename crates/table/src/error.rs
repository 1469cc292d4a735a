use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Column is not part of the source's headers.
    UnknownColumn(String),
    /// Column already exists in the source's headers.
    ColumnExists(String),
    /// Two records share the same primary-key value.
    DuplicatePrimaryKey { column: String, value: String },
    /// A record has no (or a blank) value for the primary-key column.
    MissingPrimaryKeyValue { column: String },
    /// Attempt to drop or rename the primary-key column.
    ProtectedColumn(String),
    /// A record lacks a column an operation needs.
    MissingField { column: String },
    /// A value could not be read as a number for a numeric sort.
    InvalidNumber { column: String, value: String },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownColumn(column) => write!(f, "column '{column}' does not exist in source"),
            Self::ColumnExists(column) => write!(f, "column '{column}' already exists in source"),
            Self::DuplicatePrimaryKey { column, value } => {
                write!(f, "duplicate primary key: {column}='{value}'")
            }
            Self::MissingPrimaryKeyValue { column } => {
                write!(f, "record is missing a value for primary key '{column}'")
            }
            Self::ProtectedColumn(column) => {
                write!(f, "column '{column}' holds the primary key and cannot be removed or renamed")
            }
            Self::MissingField { column } => write!(f, "record has no field '{column}'"),
            Self::InvalidNumber { column, value } => {
                write!(f, "column '{column}': cannot parse number '{value}'")
            }
        }
    }
}

impl std::error::Error for TableError {}
