use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single row: column name → value.
///
/// `primary_key` names the identity column (set by the owning [`crate::Source`]).
/// `input_line` is provenance from the importer (1-based data row), used for reporting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub values: HashMap<String, String>,
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub input_line: Option<usize>,
}

impl Record {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values,
            primary_key: None,
            input_line: None,
        }
    }

    /// Build a record from `(column, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = Some(primary_key.into());
        self
    }

    pub fn with_input_line(mut self, line: usize) -> Self {
        self.input_line = Some(line);
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Value of the primary-key column, if a key is designated and present.
    pub fn record_id(&self) -> Option<&str> {
        self.primary_key
            .as_deref()
            .and_then(|key| self.values.get(key))
            .map(String::as_str)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        match (self.record_id(), other.record_id()) {
            (Some(a), Some(b)) => a == b,
            _ => self.values == other.values,
        }
    }
}
