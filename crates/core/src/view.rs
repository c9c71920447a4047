//! Derived list view: search filter plus optional sort.
//!
//! [`derive_view`] is pure. It borrows the records, never mutates them, and
//! returns the same [`CatalogView`] for the same inputs.

use std::cmp::Ordering;

use crate::error::CoreError;
use crate::record::Record;
use crate::schema::{FieldKind, RecordSchema};
use crate::types::RecordId;

// ---------------------------------------------------------------------------
// Sort keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// A validated sort instruction for one schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    field: &'static str,
    kind: FieldKind,
    direction: SortDirection,
}

impl SortKey {
    /// Parse `title` (ascending) or `-title` (descending).
    pub fn parse(schema: &RecordSchema, key: &str) -> Result<Self, CoreError> {
        let key = key.trim();
        match key.strip_prefix('-') {
            Some(field) => Self::descending(schema, field),
            None => Self::ascending(schema, key),
        }
    }

    pub fn ascending(schema: &RecordSchema, field: &str) -> Result<Self, CoreError> {
        Self::build(schema, field, SortDirection::Ascending)
    }

    pub fn descending(schema: &RecordSchema, field: &str) -> Result<Self, CoreError> {
        Self::build(schema, field, SortDirection::Descending)
    }

    fn build(
        schema: &RecordSchema,
        field: &str,
        direction: SortDirection,
    ) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidSortKey {
            key: field.to_string(),
            reason: format!(
                "{} can be sorted by {}",
                schema.collection,
                schema
                    .sortable_fields()
                    .map(|f| f.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };
        let spec = schema.field(field).filter(|f| f.sortable).ok_or_else(invalid)?;
        Ok(Self {
            field: spec.name,
            kind: spec.kind,
            direction,
        })
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Compare two records on this key. Records missing the field order
    /// first in either direction.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self.kind {
            FieldKind::Number => match (a.number(self.field), b.number(self.field)) {
                (Some(x), Some(y)) => self.directed(x.total_cmp(&y)),
                (x, y) => x.is_some().cmp(&y.is_some()),
            },
            FieldKind::Text | FieldKind::Date => match (a.text(self.field), b.text(self.field)) {
                (Some(x), Some(y)) => self.directed(x.cmp(y)),
                (x, y) => x.is_some().cmp(&y.is_some()),
            },
        }
    }

    fn directed(&self, ord: Ordering) -> Ordering {
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Filtered and ordered borrowed records.
///
/// Computed once; iterate it as many times as needed.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogView<'a> {
    records: Vec<&'a Record>,
}

impl<'a> CatalogView<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + Clone + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> Vec<&'a RecordId> {
        self.records.iter().map(|r| &r.id).collect()
    }
}

impl<'a> IntoIterator for CatalogView<'a> {
    type Item = &'a Record;
    type IntoIter = std::vec::IntoIter<&'a Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Whether `record` matches `search` in any of the schema's filter fields,
/// case-insensitively. An empty term matches everything.
pub fn matches_search(schema: &RecordSchema, record: &Record, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    schema.filter_fields.iter().any(|field| {
        record
            .text(field)
            .is_some_and(|value| value.to_lowercase().contains(&needle))
    })
}

/// Filter `records` by `search`, then order them by `sort` if given.
///
/// The sort is stable: records comparing equal keep their filtered order.
pub fn derive_view<'a, I>(
    schema: &RecordSchema,
    records: I,
    search: &str,
    sort: Option<&SortKey>,
) -> CatalogView<'a>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut filtered: Vec<&'a Record> = records
        .into_iter()
        .filter(|r| matches_search(schema, r, search))
        .collect();

    if let Some(key) = sort {
        filtered.sort_by(|a, b| key.compare(a, b));
    }

    CatalogView { records: filtered }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
