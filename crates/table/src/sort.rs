//! Multi-key stable record sort.
//!
//! Keys are applied lowest priority first; every pass is a stable sort, so the
//! final order respects the key list's priority order with earlier keys winning.

use std::cmp::Ordering;
use std::str::FromStr;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Lexicographic comparison of the raw text.
    #[serde(rename = "string")]
    Text,
    /// Values parsed as `f64`.
    Number,
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" | "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            other => Err(format!("unknown sort type '{other}' (expected string or number)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub ascending: bool,
    pub value_type: ValueType,
}

impl SortKey {
    pub fn new(column: impl Into<String>, ascending: bool, value_type: ValueType) -> Self {
        Self {
            column: column.into(),
            ascending,
            value_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Number(OrderedFloat<f64>),
    Text(String),
}

fn sort_value(record: &Record, key: &SortKey) -> Result<SortValue, TableError> {
    let raw = record.get(&key.column).ok_or_else(|| TableError::MissingField {
        column: key.column.clone(),
    })?;
    match key.value_type {
        ValueType::Text => Ok(SortValue::Text(raw.to_string())),
        ValueType::Number => raw
            .trim()
            .parse::<f64>()
            .map(|n| SortValue::Number(OrderedFloat(n)))
            .map_err(|_| TableError::InvalidNumber {
                column: key.column.clone(),
                value: raw.to_string(),
            }),
    }
}

/// Compute the permutation that sorts `records` by `keys`.
///
/// All values are extracted before any pass runs, so a bad value fails the
/// whole sort without producing a partial order.
pub fn sorted_order(records: &[Record], keys: &[SortKey]) -> Result<Vec<usize>, TableError> {
    let columns: Vec<Vec<SortValue>> = keys
        .iter()
        .map(|key| {
            records
                .iter()
                .map(|r| sort_value(r, key))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<_, _>>()?;

    let mut order: Vec<usize> = (0..records.len()).collect();
    for (key, values) in keys.iter().zip(&columns).rev() {
        order.sort_by(|&a, &b| {
            let ord: Ordering = values[a].cmp(&values[b]);
            if key.ascending {
                ord
            } else {
                ord.reverse()
            }
        });
    }
    Ok(order)
}
