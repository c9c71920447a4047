//! Local mirror of the remote collection.
//!
//! Holds at most one [`Record`] per identifier. It is only ever replaced
//! wholesale after a load or patched after a confirmed mutation.

use crate::record::Record;
use crate::types::RecordId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalCollection {
    records: Vec<Record>,
}

impl LocalCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection.
    ///
    /// If `records` repeats an identifier the later entry wins, keeping the
    /// position of the first. Returns the number of duplicates dropped.
    pub fn replace_all(&mut self, records: Vec<Record>) -> usize {
        let mut deduped = LocalCollection::new();
        let mut duplicates = 0;
        for record in records {
            if deduped.upsert(record).is_some() {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            tracing::warn!(duplicates, "Collection contained repeated identifiers");
        }
        *self = deduped;
        duplicates
    }

    /// Insert `record`, replacing any record with the same identifier in
    /// place, or appending it otherwise. Returns the replaced record.
    pub fn upsert(&mut self, record: Record) -> Option<Record> {
        match self.position(&record.id) {
            Some(idx) => Some(std::mem::replace(&mut self.records[idx], record)),
            None => {
                self.records.push(record);
                None
            }
        }
    }

    /// Remove and return the record with `id`.
    pub fn remove(&mut self, id: &RecordId) -> Option<Record> {
        self.position(id).map(|idx| self.records.remove(idx))
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == id)
    }
}

impl<'a> IntoIterator for &'a LocalCollection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn named(id: &str, name: &str) -> Record {
        Record::new(id).with_text("name", name)
    }

    #[test]
    fn upsert_appends_new_ids() {
        let mut coll = LocalCollection::new();
        assert!(coll.upsert(named("a", "Ada")).is_none());
        assert!(coll.upsert(named("b", "Bo")).is_none());
        assert_eq!(coll.len(), 2);
        assert_eq!(coll.as_slice()[1].id.as_str(), "b");
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut coll = LocalCollection::new();
        coll.upsert(named("a", "Ada"));
        coll.upsert(named("b", "Bo"));

        let old = coll.upsert(named("a", "Ada L.")).unwrap();
        assert_eq!(old.text("name"), Some("Ada"));
        assert_eq!(coll.len(), 2);
        assert_eq!(coll.as_slice()[0].text("name"), Some("Ada L."));
    }

    #[test]
    fn replace_all_dedups_with_last_wins() {
        let mut coll = LocalCollection::new();
        coll.upsert(named("stale", "Old"));

        let dropped = coll.replace_all(vec![named("a", "1"), named("b", "2"), named("a", "3")]);
        assert_eq!(dropped, 1);
        assert_eq!(coll.len(), 2);
        assert!(!coll.contains(&RecordId::new("stale")));
        assert_eq!(coll.as_slice()[0].text("name"), Some("3"));
    }

    #[test]
    fn remove_drops_only_matching_record() {
        let mut coll = LocalCollection::new();
        coll.replace_all(vec![named("a", "1"), named("b", "2")]);

        assert!(coll.remove(&RecordId::new("a")).is_some());
        assert!(coll.remove(&RecordId::new("a")).is_none());
        assert_eq!(coll.len(), 1);
        assert!(coll.get(&RecordId::new("b")).is_some());
    }
}
