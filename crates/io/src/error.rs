use std::fmt;

use recmatch_table::TableError;

#[derive(Debug)]
pub enum IoError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    /// No delimiter is known for this format name.
    UnsupportedFormat(String),
    /// Index file written by an incompatible version.
    IndexVersion { found: u32, expected: u32 },
    Table(TableError),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "delimited data error: {err}"),
            Self::Json(err) => write!(f, "index file error: {err}"),
            Self::UnsupportedFormat(format) => {
                write!(f, "unsupported format '{format}' (expected csv, tsv, tab or chr)")
            }
            Self::IndexVersion { found, expected } => write!(
                f,
                "index file format version {found} is not supported (expected {expected}); reprocess the master"
            ),
            Self::Table(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Table(err) => Some(err),
            Self::UnsupportedFormat(_) | Self::IndexVersion { .. } => None,
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for IoError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for IoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<TableError> for IoError {
    fn from(err: TableError) -> Self {
        Self::Table(err)
    }
}
