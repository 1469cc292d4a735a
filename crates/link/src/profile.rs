use std::collections::BTreeMap;
use std::thread;

use recmatch_table::{Record, Source};
use serde::{Deserialize, Serialize};

use crate::error::LinkError;
use crate::index::{Candidates, ProcessedSource};
use crate::mapping::{CompareKind, Mapping, DEFAULT_PREFIX_LEN};
use crate::model::MatchResult;

/// The master side of a comparison: a raw source (scanned pairwise) or a
/// processed index (queried per incoming record).
#[derive(Debug, Clone, Copy)]
pub enum Master<'a> {
    Source(&'a Source),
    Index(&'a ProcessedSource),
}

impl<'a> From<&'a Source> for Master<'a> {
    fn from(source: &'a Source) -> Self {
        Self::Source(source)
    }
}

impl<'a> From<&'a ProcessedSource> for Master<'a> {
    fn from(index: &'a ProcessedSource) -> Self {
        Self::Index(index)
    }
}

/// Ordered comparison rules plus the shared prefix threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    mappings: Vec<Mapping>,
    prefix_len: usize,
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Profile {
    /// The threshold is the smallest prefix length among prefix mappings.
    pub fn new(mappings: Vec<Mapping>) -> Self {
        let prefix_len = mappings
            .iter()
            .filter(|m| m.compare == CompareKind::Prefix)
            .map(|m| m.prefix_len)
            .min()
            .unwrap_or(DEFAULT_PREFIX_LEN);
        Self {
            mappings,
            prefix_len,
        }
    }

    /// Set the shared prefix threshold on the profile and every mapping.
    pub fn with_prefix_len(mut self, prefix_len: usize) -> Self {
        self.prefix_len = prefix_len;
        for mapping in &mut self.mappings {
            mapping.prefix_len = prefix_len;
        }
        self
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    /// Parse a profile from a source with one mapping per record.
    ///
    /// Columns: `key` and `compare` are required; `master-key` (blank means
    /// same as `key`), `points` (default 1) and `strip` (default true) are
    /// optional.
    pub fn from_source(source: &Source) -> Result<Self, LinkError> {
        let mut mappings = Vec::with_capacity(source.len());
        for record in source {
            let key = required(record, "key")?;
            let compare: CompareKind = required(record, "compare")?.trim().parse()?;

            let mut mapping = Mapping::new(key, compare);
            if let Some(master_key) = optional(record, "master-key") {
                mapping = mapping.with_master_key(master_key);
            }
            if let Some(points) = optional(record, "points") {
                let points = points.parse().map_err(|_| invalid("points", points))?;
                mapping = mapping.with_points(points);
            }
            if let Some(strip) = optional(record, "strip") {
                mapping = mapping.with_strip(parse_flag(strip).ok_or_else(|| invalid("strip", strip))?);
            }
            mappings.push(mapping);
        }
        Ok(Self::new(mappings))
    }

    /// Sum of every mapping's score for the pair (0 with no mappings).
    pub fn compare_records(&self, master: &Record, incoming: &Record) -> Result<f64, LinkError> {
        let mut score = 0.0;
        for mapping in &self.mappings {
            score += mapping.compare_records(master, incoming)?;
        }
        Ok(score)
    }

    /// Score every incoming record against `master`, keeping pairs scoring at
    /// least `cutoff`.
    ///
    /// Results are ordered by incoming record, then by master position. With a
    /// processed index as master, only indexed candidates are scored; for
    /// exact and prefix rules this gives the same results as the full scan.
    pub fn compare_sources<'a>(
        &self,
        master: impl Into<Master<'a>>,
        incoming: &'a Source,
        cutoff: f64,
    ) -> Result<Vec<MatchResult<'a>>, LinkError> {
        let master = master.into();
        self.check_master(master)?;
        let results = self.score_records(master, incoming.records(), cutoff)?;
        log::debug!(
            "{} results from {} incoming records (cutoff {cutoff})",
            results.len(),
            incoming.len()
        );
        Ok(results)
    }

    /// [`compare_sources`](Self::compare_sources) with the incoming records
    /// split into contiguous shards scored on `workers` threads. Output is
    /// identical to the sequential call.
    pub fn compare_sources_parallel<'a>(
        &self,
        master: impl Into<Master<'a>>,
        incoming: &'a Source,
        cutoff: f64,
        workers: usize,
    ) -> Result<Vec<MatchResult<'a>>, LinkError> {
        let master = master.into();
        let records = incoming.records();
        if workers <= 1 || records.len() < 2 {
            return self.compare_sources(master, incoming, cutoff);
        }
        self.check_master(master)?;

        let shard_len = records.len().div_ceil(workers);
        let results = thread::scope(|scope| {
            let shards: Vec<_> = records
                .chunks(shard_len)
                .map(|shard| scope.spawn(move || self.score_records(master, shard, cutoff)))
                .collect();

            let mut results = Vec::new();
            for shard in shards {
                match shard.join() {
                    Ok(scored) => results.extend(scored?),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            Ok::<_, LinkError>(results)
        })?;

        log::debug!(
            "{} results from {} incoming records on {} shards (cutoff {cutoff})",
            results.len(),
            records.len(),
            records.len().div_ceil(shard_len)
        );
        Ok(results)
    }

    fn check_master(&self, master: Master<'_>) -> Result<(), LinkError> {
        match master {
            Master::Source(_) => Ok(()),
            Master::Index(index) => {
                if !index.is_processed() {
                    return Err(LinkError::UnprocessedIndex);
                }
                index.check_profile(self)
            }
        }
    }

    fn score_records<'a>(
        &self,
        master: Master<'a>,
        records: &'a [Record],
        cutoff: f64,
    ) -> Result<Vec<MatchResult<'a>>, LinkError> {
        let mut results = Vec::new();
        for record in records {
            match master {
                Master::Source(source) => {
                    for master_record in source {
                        let score = self.compare_records(master_record, record)?;
                        if score >= cutoff {
                            results.push(MatchResult::new(record, master_record, score));
                        }
                    }
                }
                Master::Index(index) => self.score_indexed(index, record, cutoff, &mut results)?,
            }
        }
        Ok(results)
    }

    fn score_indexed<'a>(
        &self,
        index: &'a ProcessedSource,
        record: &'a Record,
        cutoff: f64,
        results: &mut Vec<MatchResult<'a>>,
    ) -> Result<(), LinkError> {
        let indexed = index.source().records();
        let mut scores: BTreeMap<usize, f64> = BTreeMap::new();
        // Every record clears a non-positive cutoff, matched or not.
        if cutoff <= 0.0 {
            scores.extend((0..indexed.len()).map(|pos| (pos, 0.0)));
        }

        for mapping in &self.mappings {
            let points = f64::from(mapping.points);
            match index.matches(mapping, record)? {
                Candidates::Records(found) => {
                    for &pos in found.iter() {
                        *scores.entry(pos).or_insert(0.0) += points;
                    }
                }
                Candidates::Fuzzy { query, entries } => {
                    for entry in entries {
                        *scores.entry(entry.record).or_insert(0.0) +=
                            points * query.similarity(&entry.digest);
                    }
                }
            }
        }

        for (pos, score) in scores {
            if score < cutoff {
                continue;
            }
            let other = &indexed[pos];
            results.push(if index.is_master() {
                MatchResult::new(record, other, score)
            } else {
                MatchResult::new(other, record, score)
            });
        }
        Ok(())
    }
}

fn required<'r>(record: &'r Record, column: &str) -> Result<&'r str, LinkError> {
    record.get(column).ok_or_else(|| LinkError::MissingField {
        column: column.to_string(),
    })
}

/// Present and non-blank.
fn optional<'r>(record: &'r Record, column: &str) -> Option<&'r str> {
    record.get(column).map(str::trim).filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn invalid(column: &str, value: &str) -> LinkError {
    LinkError::InvalidValue {
        column: column.to_string(),
        value: value.to_string(),
    }
}
