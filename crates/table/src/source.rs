use std::collections::HashSet;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::record::Record;
use crate::sort::{sorted_order, SortKey};

/// Ordered records sharing an ordered set of headers.
///
/// Invariant: while `primary_key` is set, every record has a non-blank, unique
/// value for it, and `index` maps each such value to the record's position.
/// Every mutation of the key or the record set rebuilds `index` eagerly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "SourceData", into = "SourceData")]
pub struct Source {
    headers: Vec<String>,
    records: Vec<Record>,
    primary_key: Option<String>,
    index: FxHashMap<String, usize>,
}

/// Serialized shape of a [`Source`]. The key index is derived, not stored.
#[derive(Serialize, Deserialize)]
struct SourceData {
    headers: Vec<String>,
    #[serde(default)]
    primary_key: Option<String>,
    records: Vec<Record>,
}

impl TryFrom<SourceData> for Source {
    type Error = TableError;

    fn try_from(data: SourceData) -> Result<Self, Self::Error> {
        Source::with_records(data.headers, data.primary_key.as_deref(), data.records)
    }
}

impl From<Source> for SourceData {
    fn from(source: Source) -> Self {
        Self {
            headers: source.headers,
            primary_key: source.primary_key,
            records: source.records,
        }
    }
}

/// Value of `column` in `record`, treating blank values as absent.
fn key_value<'r>(record: &'r Record, column: &str) -> Option<&'r str> {
    record
        .get(column)
        .filter(|v| !v.trim().is_empty())
}

fn build_index(records: &[Record], column: &str) -> Result<FxHashMap<String, usize>, TableError> {
    let mut index = FxHashMap::default();
    for (pos, record) in records.iter().enumerate() {
        let value = key_value(record, column).ok_or_else(|| TableError::MissingPrimaryKeyValue {
            column: column.to_string(),
        })?;
        if index.insert(value.to_string(), pos).is_some() {
            return Err(TableError::DuplicatePrimaryKey {
                column: column.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(index)
}

impl Source {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    pub fn from_headers<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self::new(headers.into_iter().map(Into::into).collect())
    }

    /// Build a source from pre-loaded records, then designate the primary key.
    pub fn with_records(
        headers: Vec<String>,
        primary_key: Option<&str>,
        records: Vec<Record>,
    ) -> Result<Self, TableError> {
        let mut source = Self::new(headers);
        for record in records {
            source.add_record(record, None)?;
        }
        source.set_primary_key(primary_key)?;
        Ok(source)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Designate (or clear) the primary-key column and rebuild the key index.
    ///
    /// Atomic: on error the source keeps its previous key and index.
    pub fn set_primary_key(&mut self, primary_key: Option<&str>) -> Result<(), TableError> {
        let index = match primary_key {
            Some(column) => {
                if !self.has_column(column) {
                    return Err(TableError::UnknownColumn(column.to_string()));
                }
                build_index(&self.records, column)?
            }
            None => FxHashMap::default(),
        };

        self.primary_key = primary_key.map(str::to_string);
        self.index = index;
        for record in &mut self.records {
            record.primary_key = self.primary_key.clone();
        }
        Ok(())
    }

    fn rebuild_index(&mut self) {
        self.index = match self.primary_key.as_deref() {
            Some(column) => self
                .records
                .iter()
                .enumerate()
                .filter_map(|(pos, r)| key_value(r, column).map(|v| (v.to_string(), pos)))
                .collect(),
            None => FxHashMap::default(),
        };
    }

    fn push_column(&mut self, column: &str, default_value: &str, position: Option<usize>) {
        match position {
            Some(pos) if pos < self.headers.len() => self.headers.insert(pos, column.to_string()),
            _ => self.headers.push(column.to_string()),
        }
        for record in &mut self.records {
            record
                .values
                .insert(column.to_string(), default_value.to_string());
        }
    }

    /// Add a column, filling every existing record with `default_value`.
    /// `position` past the end (or `None`) appends.
    pub fn add_column(
        &mut self,
        column: &str,
        default_value: &str,
        position: Option<usize>,
    ) -> Result<(), TableError> {
        if self.has_column(column) {
            return Err(TableError::ColumnExists(column.to_string()));
        }
        self.push_column(column, default_value, position);
        Ok(())
    }

    pub fn drop_column(&mut self, column: &str) -> Result<(), TableError> {
        if self.primary_key.as_deref() == Some(column) {
            return Err(TableError::ProtectedColumn(column.to_string()));
        }
        let pos = self
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))?;
        self.headers.remove(pos);
        for record in &mut self.records {
            record.values.remove(column);
        }
        Ok(())
    }

    pub fn drop_column_index(&mut self, position: usize) -> Result<(), TableError> {
        let column = self
            .headers
            .get(position)
            .cloned()
            .ok_or_else(|| TableError::UnknownColumn(format!("#{position}")))?;
        self.drop_column(&column)
    }

    pub fn rename_column(&mut self, column: &str, new_column: &str) -> Result<(), TableError> {
        if self.primary_key.as_deref() == Some(column) {
            return Err(TableError::ProtectedColumn(column.to_string()));
        }
        if self.has_column(new_column) {
            return Err(TableError::ColumnExists(new_column.to_string()));
        }
        let header = self
            .headers
            .iter_mut()
            .find(|h| h.as_str() == column)
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))?;
        *header = new_column.to_string();

        for record in &mut self.records {
            if let Some(value) = record.values.remove(column) {
                record.values.insert(new_column.to_string(), value);
            }
        }
        Ok(())
    }

    pub fn get_record_with_id(&self, key: &str) -> Option<&Record> {
        self.index.get(key).map(|&pos| &self.records[pos])
    }

    /// Insert a record at `position` (`None` or past the end appends).
    ///
    /// With a primary key set, the record must carry a value for it that no
    /// other record already uses.
    pub fn add_record(&mut self, mut record: Record, position: Option<usize>) -> Result<(), TableError> {
        let key = match self.primary_key.as_deref() {
            Some(column) => {
                let value = key_value(&record, column).ok_or_else(|| {
                    TableError::MissingPrimaryKeyValue {
                        column: column.to_string(),
                    }
                })?;
                if self.index.contains_key(value) {
                    return Err(TableError::DuplicatePrimaryKey {
                        column: column.to_string(),
                        value: value.to_string(),
                    });
                }
                Some(value.to_string())
            }
            None => None,
        };

        record.primary_key = self.primary_key.clone();
        match position {
            Some(pos) if pos < self.records.len() => {
                self.records.insert(pos, record);
                self.rebuild_index();
            }
            _ => {
                if let Some(key) = key {
                    self.index.insert(key, self.records.len());
                }
                self.records.push(record);
            }
        }
        Ok(())
    }

    /// Remove every record equal to `record` (by key when one is set).
    /// Returns the number of records removed.
    pub fn del_record(&mut self, record: &Record) -> usize {
        if let Some(column) = self.primary_key.as_deref() {
            if let Some(value) = key_value(record, column) {
                let value = value.to_string();
                return usize::from(self.del_record_with_id(&value).is_some());
            }
        }
        let before = self.records.len();
        self.filter_records(|r| r != record);
        before - self.records.len()
    }

    pub fn del_record_with_id(&mut self, key: &str) -> Option<Record> {
        let pos = *self.index.get(key)?;
        let removed = self.records.remove(pos);
        self.rebuild_index();
        Some(removed)
    }

    /// Keep only records for which `keep` returns true.
    pub fn filter_records(&mut self, keep: impl FnMut(&Record) -> bool) {
        self.records.retain(keep);
        self.rebuild_index();
    }

    pub fn sort_records(&mut self, keys: &[SortKey]) -> Result<(), TableError> {
        let order = sorted_order(&self.records, keys)?;
        let mut slots: Vec<Option<Record>> = std::mem::take(&mut self.records)
            .into_iter()
            .map(Some)
            .collect();
        self.records = order.into_iter().filter_map(|pos| slots[pos].take()).collect();
        self.rebuild_index();
        Ok(())
    }

    pub fn contains_record(&self, record: &Record) -> bool {
        if let Some(column) = self.primary_key.as_deref() {
            if let Some(value) = key_value(record, column) {
                return self.index.contains_key(value);
            }
        }
        self.records.iter().any(|r| r == record)
    }
}

impl<'a> IntoIterator for &'a Source {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// True when every source has the same header set (order ignored).
pub fn sources_consistent(sources: &[Source]) -> bool {
    let Some((first, rest)) = sources.split_first() else {
        return true;
    };
    let first: HashSet<&str> = first.headers.iter().map(String::as_str).collect();
    rest.iter()
        .all(|s| s.headers.iter().map(String::as_str).collect::<HashSet<_>>() == first)
}

/// Give every source the union of all headers, filling new columns with "".
pub fn unify_sources(sources: &mut [Source]) {
    let mut all: Vec<String> = Vec::new();
    for source in sources.iter() {
        for header in &source.headers {
            if !all.contains(header) {
                all.push(header.clone());
            }
        }
    }
    for source in sources.iter_mut() {
        for header in &all {
            if !source.has_column(header) {
                source.push_column(header, "", None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::ValueType;

    fn person(name: &str, id: &str, email: &str) -> Record {
        Record::from_pairs([("Name", name), ("ID", id), ("Email", email)])
    }

    fn people() -> Source {
        Source::from_headers(["Name", "ID", "Email"])
    }

    #[test]
    fn primary_key_lookup() {
        let mut s = people();
        let b = person("Test 1", "1", "test1@test1.com");
        s.add_record(b.clone(), None).unwrap();
        assert_eq!(s.records(), &[b.clone()]);

        s.set_primary_key(Some("ID")).unwrap();
        assert_eq!(s.get_record_with_id("1"), Some(&b));
        assert_eq!(s.records()[0].primary_key.as_deref(), Some("ID"));
        assert!(s.get_record_with_id("2").is_none());
    }

    #[test]
    fn unknown_primary_key_column() {
        let mut s = people();
        let err = s.set_primary_key(Some("Phone")).unwrap_err();
        assert_eq!(err, TableError::UnknownColumn("Phone".into()));
        assert_eq!(s.primary_key(), None);
    }

    #[test]
    fn set_primary_key_is_atomic() {
        let mut s = people();
        s.add_record(person("a", "1", "a@x"), None).unwrap();
        s.add_record(person("b", "1", "b@x"), None).unwrap();
        s.set_primary_key(Some("Name")).unwrap();

        let err = s.set_primary_key(Some("ID")).unwrap_err();
        assert!(matches!(err, TableError::DuplicatePrimaryKey { .. }));
        assert_eq!(s.primary_key(), Some("Name"));
        assert!(s.get_record_with_id("a").is_some());
    }

    #[test]
    fn blank_key_value_is_missing() {
        let mut s = people();
        s.set_primary_key(Some("ID")).unwrap();
        let err = s.add_record(person("a", "  ", "a@x"), None).unwrap_err();
        assert_eq!(err, TableError::MissingPrimaryKeyValue { column: "ID".into() });
        let err = s
            .add_record(Record::from_pairs([("Name", "b")]), None)
            .unwrap_err();
        assert_eq!(err, TableError::MissingPrimaryKeyValue { column: "ID".into() });
        assert!(s.is_empty());
    }

    #[test]
    fn columns_add_and_drop() {
        let mut s = people();
        s.add_record(person("a", "1", "a@x"), None).unwrap();
        s.set_primary_key(Some("ID")).unwrap();

        s.add_column("Test", "", None).unwrap();
        assert_eq!(s.headers(), &["Name", "ID", "Email", "Test"]);
        assert_eq!(s.records()[0].get("Test"), Some(""));

        s.add_column("First", "x", Some(0)).unwrap();
        assert_eq!(s.headers()[0], "First");
        assert_eq!(s.records()[0].get("First"), Some("x"));
        assert_eq!(s.add_column("Test", "", None), Err(TableError::ColumnExists("Test".into())));

        s.drop_column("Test").unwrap();
        s.drop_column_index(0).unwrap();
        assert_eq!(s.headers(), &["Name", "ID", "Email"]);
        assert_eq!(s.records()[0].get("Test"), None);

        assert_eq!(s.drop_column("ID"), Err(TableError::ProtectedColumn("ID".into())));
        assert_eq!(s.drop_column("Nope"), Err(TableError::UnknownColumn("Nope".into())));
    }

    #[test]
    fn rename_column_moves_values() {
        let mut s = people();
        s.add_record(person("a", "1", "a@x"), None).unwrap();
        s.set_primary_key(Some("ID")).unwrap();

        s.rename_column("Email", "Mail").unwrap();
        assert_eq!(s.headers(), &["Name", "ID", "Mail"]);
        assert_eq!(s.records()[0].get("Mail"), Some("a@x"));
        assert_eq!(s.records()[0].get("Email"), None);

        assert_eq!(s.rename_column("ID", "Key"), Err(TableError::ProtectedColumn("ID".into())));
        assert_eq!(s.rename_column("Name", "Mail"), Err(TableError::ColumnExists("Mail".into())));
    }

    #[test]
    fn delete_by_value_and_key() {
        let mut s = people();
        let b = person("Test 1", "1", "test1@test1.com");

        s.add_record(b.clone(), None).unwrap();
        assert!(s.contains_record(&b));
        assert_eq!(s.del_record(&b), 1);
        assert!(s.is_empty());

        s.add_record(b.clone(), None).unwrap();
        s.set_primary_key(Some("ID")).unwrap();
        assert!(s.del_record_with_id("2").is_none());
        assert_eq!(s.del_record_with_id("1"), Some(b.clone()));
        assert!(s.is_empty());
        assert!(!s.contains_record(&b));
    }

    #[test]
    fn insert_at_position_keeps_index_consistent() {
        let mut s = people();
        s.set_primary_key(Some("ID")).unwrap();
        s.add_record(person("a", "1", ""), None).unwrap();
        s.add_record(person("b", "2", ""), None).unwrap();
        s.add_record(person("c", "3", ""), Some(0)).unwrap();
        s.add_record(person("d", "4", ""), Some(99)).unwrap();

        let names: Vec<_> = s.iter().map(|r| r.get("Name").unwrap()).collect();
        assert_eq!(names, vec!["c", "a", "b", "d"]);
        assert_eq!(s.get_record_with_id("2").unwrap().get("Name"), Some("b"));
        assert_eq!(s.get_record_with_id("4").unwrap().get("Name"), Some("d"));
    }

    #[test]
    fn filter_rebuilds_index() {
        let mut s = people();
        s.set_primary_key(Some("ID")).unwrap();
        for (n, id) in [("a", "1"), ("b", "2"), ("c", "3")] {
            s.add_record(person(n, id, ""), None).unwrap();
        }
        s.filter_records(|r| r.get("ID") != Some("1"));
        assert_eq!(s.len(), 2);
        assert!(s.get_record_with_id("1").is_none());
        assert_eq!(s.get_record_with_id("3").unwrap().get("Name"), Some("c"));
    }

    #[test]
    fn sort_rebuilds_index() {
        let mut s = people();
        s.set_primary_key(Some("ID")).unwrap();
        for (n, id) in [("c", "3"), ("a", "1"), ("b", "2")] {
            s.add_record(person(n, id, ""), None).unwrap();
        }
        s.sort_records(&[SortKey::new("ID", false, ValueType::Number)]).unwrap();
        let ids: Vec<_> = s.iter().map(|r| r.get("ID").unwrap()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
        assert_eq!(s.get_record_with_id("1").unwrap().get("Name"), Some("a"));
    }

    #[test]
    fn consistent_and_unify() {
        let a = people();
        let mut b = people();
        assert!(sources_consistent(&[a.clone(), b.clone()]));

        b.drop_column("Email").unwrap();
        b.add_column("Phone", "", None).unwrap();
        let mut both = [a, b];
        assert!(!sources_consistent(&both));

        unify_sources(&mut both);
        assert!(sources_consistent(&both));
        assert_eq!(both[0].headers(), &["Name", "ID", "Email", "Phone"]);
        assert_eq!(both[1].headers(), &["Name", "ID", "Phone", "Email"]);
    }

    #[test]
    fn serde_round_trip_revalidates() {
        let mut s = people();
        s.add_record(person("a", "1", "a@x"), None).unwrap();
        s.set_primary_key(Some("ID")).unwrap();

        let json = serde_json::to_string(&s).unwrap();
        let back: Source = serde_json::from_str(&json).unwrap();
        assert_eq!(back.primary_key(), Some("ID"));
        assert_eq!(back.get_record_with_id("1").unwrap().get("Email"), Some("a@x"));

        let dup = r#"{"headers":["ID"],"primary_key":"ID","records":[
            {"values":{"ID":"1"}},{"values":{"ID":"1"}}]}"#;
        assert!(serde_json::from_str::<Source>(dup).is_err());
    }
}
