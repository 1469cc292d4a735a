//! Precomputed candidate lookup over one [`Source`].
//!
//! Three per-field tables are built once by [`ProcessedSource::process`]:
//!
//! - `exact`: stripped value → records holding exactly that value
//! - `prefix`: every leading substring (from the threshold length up to, but
//!   not including, the full value) → records whose value starts with it
//! - `fuzzy`: digest bucket → `(digest, record)` pairs, where the bucket is the
//!   digest's similarity to the fixed calibration digest
//!
//! Records are referenced by their position in the owned source.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use recmatch_table::{Record, Source};
use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::error::LinkError;
use crate::mapping::{field_value, CompareKind, Mapping, DEFAULT_PREFIX_LEN};
use crate::multimap::MultiMap;
use crate::profile::Profile;

/// Indexed column, distinguished by whether values were stripped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldKey {
    pub column: String,
    pub strip: bool,
}

impl FieldKey {
    pub fn new(column: impl Into<String>, strip: bool) -> Self {
        Self {
            column: column.into(),
            strip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyEntry {
    pub digest: Digest,
    pub record: usize,
}

/// Candidate master-side records for one (mapping, record) query.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidates<'a> {
    /// Positions that earn the mapping's full points.
    Records(Cow<'a, [usize]>),
    /// Bucket members; each earns a fraction of the points by digest similarity.
    Fuzzy {
        query: Digest,
        entries: &'a [FuzzyEntry],
    },
}

impl Candidates<'_> {
    fn none() -> Self {
        Self::Records(Cow::Borrowed(&[]))
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Records(records) => records.len(),
            Self::Fuzzy { entries, .. } => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// JSON maps need string keys, so field-keyed tables go out as pair lists.
mod as_pairs {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let pairs: Vec<(K, V)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Indices {
    /// Fields some record lacks; querying them fails like the full scan does.
    #[serde(default)]
    missing: BTreeSet<FieldKey>,
    #[serde(with = "as_pairs")]
    exact: BTreeMap<FieldKey, MultiMap<String, usize>>,
    #[serde(with = "as_pairs")]
    prefix: BTreeMap<FieldKey, MultiMap<String, usize>>,
    #[serde(with = "as_pairs")]
    fuzzy: BTreeMap<FieldKey, MultiMap<i32, FuzzyEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", content = "indices", rename_all = "snake_case")]
enum IndexState {
    Built,
    Processed(Indices),
}

/// Field sets to index, per table.
#[derive(Default)]
struct FieldPlan {
    exact: BTreeSet<FieldKey>,
    prefix: BTreeSet<FieldKey>,
    fuzzy: BTreeSet<FieldKey>,
}

impl FieldPlan {
    fn every_header(headers: &[String]) -> Self {
        let mut plan = Self::default();
        for header in headers {
            for strip in [false, true] {
                let field = FieldKey::new(header.as_str(), strip);
                plan.exact.insert(field.clone());
                plan.prefix.insert(field.clone());
                plan.fuzzy.insert(field);
            }
        }
        plan
    }

    fn for_profile(profile: &Profile, is_master: bool) -> Self {
        let mut plan = Self::default();
        for mapping in profile.mappings() {
            let column = if is_master { &mapping.master_key } else { &mapping.key };
            let field = FieldKey::new(column.as_str(), mapping.strip);
            match mapping.compare {
                CompareKind::Exact => {
                    plan.exact.insert(field);
                }
                CompareKind::Prefix => {
                    plan.exact.insert(field.clone());
                    plan.prefix.insert(field);
                }
                CompareKind::Fuzzy => {
                    plan.fuzzy.insert(field);
                }
            }
        }
        plan
    }
}

/// Byte offset of the end of the first `n` chars of `value`.
fn char_boundary(value: &str, n: usize) -> usize {
    value
        .char_indices()
        .nth(n)
        .map_or(value.len(), |(offset, _)| offset)
}

/// A [`Source`] plus the tables needed to look up match candidates in it.
///
/// Starts out built (tables empty); [`process`](Self::process) fills the
/// tables once and the index is read-only from then on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ProcessedSourceData")]
pub struct ProcessedSource {
    source: Source,
    is_master: bool,
    profile: Option<Profile>,
    prefix_len: usize,
    state: IndexState,
}

impl ProcessedSource {
    /// Wrap `source` without indexing it yet. With no profile, every header is indexed.
    pub fn new(source: Source, is_master: bool, profile: Option<Profile>) -> Self {
        let prefix_len = profile
            .as_ref()
            .map_or(DEFAULT_PREFIX_LEN, Profile::prefix_len);
        Self {
            source,
            is_master,
            profile,
            prefix_len,
            state: IndexState::Built,
        }
    }

    /// Wrap and process in one step.
    pub fn build(source: Source, is_master: bool, profile: Option<Profile>) -> Self {
        let mut index = Self::new(source, is_master, profile);
        index.process();
        index
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn into_source(self) -> Source {
        self.source
    }

    pub fn is_master(&self) -> bool {
        self.is_master
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Shortest prefix stored in the prefix table.
    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    pub fn is_processed(&self) -> bool {
        matches!(self.state, IndexState::Processed(_))
    }

    /// Fill the lookup tables. No-op on an already processed index.
    ///
    /// A field that some record lacks gets empty tables and is marked
    /// missing; queries on it fail with [`LinkError::MissingField`].
    pub fn process(&mut self) {
        if self.is_processed() {
            return;
        }

        let plan = match &self.profile {
            Some(profile) => FieldPlan::for_profile(profile, self.is_master),
            None => FieldPlan::every_header(self.source.headers()),
        };
        let records = self.source.records();
        let mut indices = Indices::default();
        let mut missing = BTreeSet::new();
        let mut values_of = |field: &FieldKey| match indexed_values(records, field) {
            Ok(values) => values,
            Err(pos) => {
                if missing.insert(field.clone()) {
                    log::warn!("record {pos} has no '{}' column; field not queryable", field.column);
                }
                Vec::new()
            }
        };

        for field in &plan.exact {
            let table = indices.exact.entry(field.clone()).or_default();
            for (pos, value) in values_of(field) {
                table.insert(value.to_string(), pos);
            }
        }

        for field in &plan.prefix {
            let table = indices.prefix.entry(field.clone()).or_default();
            for (pos, value) in values_of(field) {
                let len = value.chars().count();
                for n in self.prefix_len..len {
                    table.insert(value[..char_boundary(value, n)].to_string(), pos);
                }
            }
        }

        for field in &plan.fuzzy {
            let table = indices.fuzzy.entry(field.clone()).or_default();
            for (pos, value) in values_of(field) {
                let digest = Digest::of(value);
                table.insert(digest.bucket(), FuzzyEntry { digest, record: pos });
            }
        }
        indices.missing = missing;

        log::debug!(
            "indexed {} records ({}): {} exact keys, {} prefix keys, {} fuzzy buckets",
            records.len(),
            if self.is_master { "master" } else { "incoming" },
            indices.exact.values().map(MultiMap::len).sum::<usize>(),
            indices.prefix.values().map(MultiMap::len).sum::<usize>(),
            indices.fuzzy.values().map(MultiMap::len).sum::<usize>(),
        );

        self.state = IndexState::Processed(indices);
    }

    /// Fail unless this index may be queried with `profile`.
    pub fn check_profile(&self, profile: &Profile) -> Result<(), LinkError> {
        match &self.profile {
            Some(own) if own != profile => Err(LinkError::ProfileMismatch(
                "index was built for a different profile".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Candidates in this index for `record` under `mapping`.
    ///
    /// `record` belongs to the other side: when this index is the master,
    /// `record` is incoming and the mapping's `key` is read from it.
    pub fn matches<'s>(
        &'s self,
        mapping: &Mapping,
        record: &Record,
    ) -> Result<Candidates<'s>, LinkError> {
        let IndexState::Processed(indices) = &self.state else {
            return Err(LinkError::UnprocessedIndex);
        };

        let (indexed_column, query_column) = if self.is_master {
            (&mapping.master_key, &mapping.key)
        } else {
            (&mapping.key, &mapping.master_key)
        };
        let field = FieldKey::new(indexed_column.as_str(), mapping.strip);
        if indices.missing.contains(&field) {
            return Err(LinkError::MissingField {
                column: field.column,
            });
        }
        let value = field_value(record, query_column, mapping.strip)?;

        match mapping.compare {
            CompareKind::Exact => {
                let exact = self.table(&indices.exact, &field)?;
                Ok(Candidates::Records(Cow::Borrowed(exact.get(value))))
            }
            CompareKind::Prefix => {
                if mapping.prefix_len < self.prefix_len {
                    return Err(LinkError::ProfileMismatch(format!(
                        "mapping '{}' asks for prefix length {} but the index starts at {}",
                        mapping.key, mapping.prefix_len, self.prefix_len
                    )));
                }
                let exact = self.table(&indices.exact, &field)?;
                let prefix = self.table(&indices.prefix, &field)?;

                let len = value.chars().count();
                if value.is_empty() || len < mapping.prefix_len {
                    return Ok(Candidates::none());
                }
                // Longer stored values come from the prefix table, shorter or
                // equal ones from the exact table under each truncation.
                let mut found: Vec<usize> = prefix.get(value).to_vec();
                for n in mapping.prefix_len..=len {
                    found.extend_from_slice(exact.get(&value[..char_boundary(value, n)]));
                }
                Ok(Candidates::Records(Cow::Owned(found)))
            }
            CompareKind::Fuzzy => {
                let fuzzy = self.table(&indices.fuzzy, &field)?;
                if value.is_empty() {
                    return Ok(Candidates::none());
                }
                let query = Digest::of(value);
                Ok(Candidates::Fuzzy {
                    query,
                    entries: fuzzy.get(&query.bucket()),
                })
            }
        }
    }

    fn table<'s, V>(
        &self,
        tables: &'s BTreeMap<FieldKey, V>,
        field: &FieldKey,
    ) -> Result<&'s V, LinkError> {
        tables.get(field).ok_or_else(|| match self.profile {
            Some(_) => LinkError::ProfileMismatch(format!(
                "column '{}' (strip={}) is not indexed for this comparison",
                field.column, field.strip
            )),
            None => LinkError::MissingField {
                column: field.column.clone(),
            },
        })
    }
}

/// Non-empty prepared values of `field` with their record positions, or the
/// position of the first record lacking the column.
fn indexed_values<'r>(
    records: &'r [Record],
    field: &FieldKey,
) -> Result<Vec<(usize, &'r str)>, usize> {
    let mut values = Vec::with_capacity(records.len());
    for (pos, record) in records.iter().enumerate() {
        match field_value(record, &field.column, field.strip) {
            Ok("") => {}
            Ok(value) => values.push((pos, value)),
            Err(_) => return Err(pos),
        }
    }
    Ok(values)
}

// ---------------------------------------------------------------------------
// Deserialization checks
// ---------------------------------------------------------------------------

/// Serialized shape of a [`ProcessedSource`], checked before use.
#[derive(Deserialize)]
struct ProcessedSourceData {
    source: Source,
    is_master: bool,
    profile: Option<Profile>,
    prefix_len: usize,
    state: IndexState,
}

impl TryFrom<ProcessedSourceData> for ProcessedSource {
    type Error = LinkError;

    fn try_from(data: ProcessedSourceData) -> Result<Self, Self::Error> {
        let expected = data
            .profile
            .as_ref()
            .map_or(DEFAULT_PREFIX_LEN, Profile::prefix_len);
        if data.prefix_len != expected {
            return Err(LinkError::CorruptIndex(format!(
                "prefix length {} does not match the profile's {expected}",
                data.prefix_len
            )));
        }

        if let IndexState::Processed(indices) = &data.state {
            let len = data.source.len();
            let positions = indices
                .exact
                .values()
                .chain(indices.prefix.values())
                .flat_map(|table| table.values())
                .copied()
                .chain(
                    indices
                        .fuzzy
                        .values()
                        .flat_map(|table| table.values())
                        .map(|entry| entry.record),
                );
            for pos in positions {
                if pos >= len {
                    return Err(LinkError::CorruptIndex(format!(
                        "record position {pos} out of range for {len} records"
                    )));
                }
            }
        }

        Ok(Self {
            source: data.source,
            is_master: data.is_master,
            profile: data.profile,
            prefix_len: data.prefix_len,
            state: data.state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Source {
        let mut source = Source::from_headers(["Name", "ID"]);
        for (i, v) in values.iter().enumerate() {
            let id = (i + 1).to_string();
            source
                .add_record(Record::from_pairs([("Name", *v), ("ID", id.as_str())]), None)
                .unwrap();
        }
        source.set_primary_key(Some("ID")).unwrap();
        source
    }

    fn query(name: &str) -> Record {
        Record::from_pairs([("Name", name)])
    }

    fn positions(c: Candidates<'_>) -> Vec<usize> {
        match c {
            Candidates::Records(r) => {
                let mut v = r.into_owned();
                v.sort_unstable();
                v
            }
            Candidates::Fuzzy { entries, .. } => entries.iter().map(|e| e.record).collect(),
        }
    }

    #[test]
    fn querying_before_process_fails() {
        let profile = Profile::new(vec![Mapping::new("Name", CompareKind::Exact)]);
        let index = ProcessedSource::new(names(&["Tim"]), true, Some(profile.clone()));
        assert!(!index.is_processed());
        let err = index.matches(&profile.mappings()[0], &query("Tim")).unwrap_err();
        assert_eq!(err, LinkError::UnprocessedIndex);
    }

    #[test]
    fn exact_lookup() {
        let exact = Mapping::new("Name", CompareKind::Exact);
        let profile = Profile::new(vec![exact.clone()]);
        let index = ProcessedSource::build(names(&["Tim", "Dave", " Tim "]), true, Some(profile));

        assert_eq!(positions(index.matches(&exact, &query("Tim")).unwrap()), vec![0, 2]);
        assert!(index.matches(&exact, &query("Timothy")).unwrap().is_empty());
        assert!(index.matches(&exact, &query("")).unwrap().is_empty());
    }

    #[test]
    fn prefix_lookup_goes_both_ways() {
        let prefix = Mapping::new("Name", CompareKind::Prefix);
        let profile = Profile::new(vec![prefix.clone()]);
        let index = ProcessedSource::build(
            names(&["Timothy", "Tim", "Tom", "Timo", "Ti"]),
            true,
            Some(profile),
        );

        // "Timo" is a prefix of "Timothy"; "Tim" and "Timo" are prefixes of it.
        assert_eq!(positions(index.matches(&prefix, &query("Timo")).unwrap()), vec![0, 1, 3]);
        assert_eq!(positions(index.matches(&prefix, &query("Tim")).unwrap()), vec![0, 1, 3]);
        assert!(index.matches(&prefix, &query("Ti")).unwrap().is_empty());
        assert_eq!(positions(index.matches(&prefix, &query("Tom")).unwrap()), vec![2]);
    }

    #[test]
    fn prefix_counts_chars_not_bytes() {
        let prefix = Mapping::new("Name", CompareKind::Prefix);
        let profile = Profile::new(vec![prefix.clone()]);
        let index = ProcessedSource::build(names(&["Zoë Ann", "Zoë"]), true, Some(profile));
        assert_eq!(positions(index.matches(&prefix, &query("Zoë")).unwrap()), vec![0, 1]);
        assert_eq!(positions(index.matches(&prefix, &query("Zoë A")).unwrap()), vec![0, 1]);
    }

    #[test]
    fn shorter_mapping_threshold_is_a_mismatch() {
        let index = ProcessedSource::build(names(&["Timothy"]), true, None);
        assert_eq!(index.prefix_len(), DEFAULT_PREFIX_LEN);
        let short = Mapping::new("Name", CompareKind::Prefix).with_prefix_len(2);
        assert!(matches!(
            index.matches(&short, &query("Ti")),
            Err(LinkError::ProfileMismatch(_))
        ));
        let long = Mapping::new("Name", CompareKind::Prefix).with_prefix_len(5);
        assert!(index.matches(&long, &query("Tim")).unwrap().is_empty());
        assert_eq!(positions(index.matches(&long, &query("Timot")).unwrap()), vec![0]);
    }

    #[test]
    fn fuzzy_lookup_uses_bucket() {
        let fuzzy = Mapping::new("Name", CompareKind::Fuzzy);
        let profile = Profile::new(vec![fuzzy.clone()]);
        let index = ProcessedSource::build(
            names(&["Jonathan Smithson", "Mary Ellen Carter"]),
            true,
            Some(profile),
        );

        match index.matches(&fuzzy, &query("Jonathan Smithson")).unwrap() {
            Candidates::Fuzzy { query, entries } => {
                assert!(entries.iter().any(|e| e.record == 0 && e.digest == query));
                assert!(entries.iter().all(|e| e.digest.bucket() == query.bucket()));
            }
            other => panic!("expected fuzzy candidates, got {other:?}"),
        }
    }

    #[test]
    fn unprofiled_index_covers_every_header() {
        let index = ProcessedSource::build(names(&["\"Tim\"", "Dave"]), true, None);
        let stripped = Mapping::new("Name", CompareKind::Exact);
        let raw = stripped.clone().with_strip(false);
        assert_eq!(positions(index.matches(&stripped, &query("Tim")).unwrap()), vec![0]);
        assert!(index.matches(&raw, &query("Tim")).unwrap().is_empty());
        assert_eq!(positions(index.matches(&raw, &query("\"Tim\"")).unwrap()), vec![0]);

        let by_id = Mapping::new("ID", CompareKind::Exact);
        let rec = Record::from_pairs([("ID", "2")]);
        assert_eq!(positions(index.matches(&by_id, &rec).unwrap()), vec![1]);

        let phone = Mapping::new("Phone", CompareKind::Exact);
        let rec = Record::from_pairs([("Phone", "555")]);
        assert_eq!(
            index.matches(&phone, &rec).unwrap_err(),
            LinkError::MissingField { column: "Phone".into() }
        );
    }

    #[test]
    fn role_flag_picks_columns() {
        let mapping = Mapping::new("In", CompareKind::Exact).with_master_key("Master");
        let profile = Profile::new(vec![mapping.clone()]);

        let mut master = Source::from_headers(["Master"]);
        master.add_record(Record::from_pairs([("Master", "x")]), None).unwrap();
        let as_master = ProcessedSource::build(master, true, Some(profile.clone()));
        let incoming_rec = Record::from_pairs([("In", "x")]);
        assert_eq!(positions(as_master.matches(&mapping, &incoming_rec).unwrap()), vec![0]);

        let mut incoming = Source::from_headers(["In"]);
        incoming.add_record(Record::from_pairs([("In", "x")]), None).unwrap();
        let as_incoming = ProcessedSource::build(incoming, false, Some(profile));
        let master_rec = Record::from_pairs([("Master", "x")]);
        assert_eq!(positions(as_incoming.matches(&mapping, &master_rec).unwrap()), vec![0]);
        assert_eq!(
            as_incoming.matches(&mapping, &incoming_rec).unwrap_err(),
            LinkError::MissingField { column: "Master".into() }
        );
    }

    #[test]
    fn field_missing_from_a_record_is_not_queryable() {
        let mut source = Source::from_headers(["Name", "ID"]);
        source
            .add_record(Record::from_pairs([("Name", "Tim"), ("ID", "1")]), None)
            .unwrap();
        source
            .add_record(Record::from_pairs([("Other", "Tim"), ("ID", "2")]), None)
            .unwrap();
        let index = ProcessedSource::build(source, true, None);

        let by_name = Mapping::new("Name", CompareKind::Prefix);
        assert_eq!(
            index.matches(&by_name, &query("Tim")).unwrap_err(),
            LinkError::MissingField { column: "Name".into() }
        );
        let by_id = Mapping::new("ID", CompareKind::Exact);
        let rec = Record::from_pairs([("ID", "2")]);
        assert_eq!(positions(index.matches(&by_id, &rec).unwrap()), vec![1]);

        let back: ProcessedSource =
            serde_json::from_str(&serde_json::to_string(&index).unwrap()).unwrap();
        assert!(back.matches(&by_name, &query("Tim")).is_err());
    }

    #[test]
    fn process_twice_is_a_no_op() {
        let exact = Mapping::new("Name", CompareKind::Exact);
        let mut index = ProcessedSource::build(names(&["Tim"]), true, Some(Profile::new(vec![exact.clone()])));
        index.process();
        assert_eq!(positions(index.matches(&exact, &query("Tim")).unwrap()), vec![0]);
    }

    #[test]
    fn check_profile() {
        let a = Profile::new(vec![Mapping::new("Name", CompareKind::Exact)]);
        let b = Profile::new(vec![Mapping::new("Name", CompareKind::Prefix)]);
        let index = ProcessedSource::build(names(&["Tim"]), true, Some(a.clone()));
        assert!(index.check_profile(&a).is_ok());
        assert!(matches!(index.check_profile(&b), Err(LinkError::ProfileMismatch(_))));

        let open = ProcessedSource::build(names(&["Tim"]), true, None);
        assert!(open.check_profile(&b).is_ok());
    }

    #[test]
    fn deserialize_rejects_inconsistent_index() {
        let exact = Mapping::new("Name", CompareKind::Exact);
        let profile = Profile::new(vec![exact]);
        let index = ProcessedSource::build(names(&["Tim", "Dave"]), true, Some(profile));
        let good = serde_json::to_value(&index).unwrap();

        let mut wrong_len = good.clone();
        wrong_len["prefix_len"] = serde_json::json!(1);
        let err = serde_json::from_value::<ProcessedSource>(wrong_len).unwrap_err();
        assert!(err.to_string().contains("prefix length 1"), "{err}");

        let stale = serde_json::to_string(&good).unwrap().replace(r#""Dave":[1]"#, r#""Dave":[7]"#);
        assert!(stale.contains(r#""Dave":[7]"#));
        let err = serde_json::from_str::<ProcessedSource>(&stale).unwrap_err();
        assert!(err.to_string().contains("position 7"), "{err}");

        assert!(serde_json::from_value::<ProcessedSource>(good).is_ok());
    }

    #[test]
    fn json_round_trip_keeps_tables() {
        let prefix = Mapping::new("Name", CompareKind::Prefix);
        let fuzzy = Mapping::new("Name", CompareKind::Fuzzy);
        let profile = Profile::new(vec![prefix.clone(), fuzzy.clone()]);
        let index = ProcessedSource::build(names(&["Timothy", "Tim"]), true, Some(profile.clone()));

        let json = serde_json::to_string(&index).unwrap();
        let back: ProcessedSource = serde_json::from_str(&json).unwrap();
        assert!(back.is_processed());
        assert_eq!(back.profile(), Some(&profile));
        assert_eq!(back.source().get_record_with_id("2").unwrap().get("Name"), Some("Tim"));
        assert_eq!(positions(back.matches(&prefix, &query("Timo")).unwrap()), vec![0, 1]);
        assert_eq!(
            positions(back.matches(&fuzzy, &query("Tim")).unwrap()),
            positions(index.matches(&fuzzy, &query("Tim")).unwrap())
        );
    }
}
