use std::fmt;
use std::str::FromStr;

use recmatch_table::Record;
use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::error::LinkError;

/// Shortest prefix that counts as a prefix match.
pub const DEFAULT_PREFIX_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareKind {
    /// Full points iff the values are equal.
    #[default]
    Exact,
    /// Full points iff one value starts with the other.
    Prefix,
    /// Digest similarity as a fraction of the points.
    Fuzzy,
}

impl FromStr for CompareKind {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(Self::Exact),
            "prefix" => Ok(Self::Prefix),
            "fuzzy" => Ok(Self::Fuzzy),
            other => Err(LinkError::InvalidCompareKind(other.to_string())),
        }
    }
}

impl fmt::Display for CompareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Prefix => write!(f, "prefix"),
            Self::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

/// Remove surrounding whitespace, then surrounding `"` / `'` characters.
pub fn strip_value(value: &str) -> &str {
    value.trim().trim_matches(|c| c == '"' || c == '\'')
}

/// Fetch `column` from `record`, stripped when requested.
pub(crate) fn field_value<'r>(
    record: &'r Record,
    column: &str,
    strip: bool,
) -> Result<&'r str, LinkError> {
    let raw = record.get(column).ok_or_else(|| LinkError::MissingField {
        column: column.to_string(),
    })?;
    Ok(if strip { strip_value(raw) } else { raw })
}

/// One field-pair comparison rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    /// Column in the incoming record.
    pub key: String,
    /// Column in the master record.
    pub master_key: String,
    pub compare: CompareKind,
    pub points: u32,
    pub strip: bool,
    pub prefix_len: usize,
}

impl Mapping {
    /// Rule comparing `key` on both sides, worth 1 point, stripping values.
    pub fn new(key: impl Into<String>, compare: CompareKind) -> Self {
        let key = key.into();
        Self {
            master_key: key.clone(),
            key,
            compare,
            points: 1,
            strip: true,
            prefix_len: DEFAULT_PREFIX_LEN,
        }
    }

    pub fn with_master_key(mut self, master_key: impl Into<String>) -> Self {
        self.master_key = master_key.into();
        self
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    pub fn with_strip(mut self, strip: bool) -> Self {
        self.strip = strip;
        self
    }

    pub fn with_prefix_len(mut self, prefix_len: usize) -> Self {
        self.prefix_len = prefix_len;
        self
    }

    /// True when one value starts with the other and the shorter one is long enough.
    pub fn is_prefix_match(&self, a: &str, b: &str) -> bool {
        let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
        long.starts_with(short) && short.chars().count() >= self.prefix_len
    }

    pub fn compare_records(&self, master: &Record, incoming: &Record) -> Result<f64, LinkError> {
        let master_value = field_value(master, &self.master_key, self.strip)?;
        let incoming_value = field_value(incoming, &self.key, self.strip)?;
        Ok(self.compare_values(master_value, incoming_value))
    }

    /// Score two already-prepared values. Empty values never match.
    pub fn compare_values(&self, master_value: &str, incoming_value: &str) -> f64 {
        if master_value.is_empty() || incoming_value.is_empty() {
            return 0.0;
        }
        let points = f64::from(self.points);
        match self.compare {
            CompareKind::Exact if master_value == incoming_value => points,
            CompareKind::Prefix if self.is_prefix_match(master_value, incoming_value) => points,
            CompareKind::Fuzzy => {
                points * Digest::of(master_value).similarity(&Digest::of(incoming_value))
            }
            _ => 0.0,
        }
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ~ {} ({}, {} pt{})",
            self.key,
            self.master_key,
            self.compare,
            self.points,
            if self.points == 1 { "" } else { "s" }
        )
    }
}
