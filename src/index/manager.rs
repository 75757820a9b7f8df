//! Index Manager
//!
//! Owns every built index, keyed by table then field.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use tracing::debug;

use crate::predicate::Operator;
use crate::schema::{Record, Value};

use super::{IndexKind, Location};

/// One built index
#[derive(Debug)]
enum SecondaryIndex {
    Hash(HashMap<Value, Vec<Location>>),
    Ordered(BTreeMap<Value, Vec<Location>>),
}

impl SecondaryIndex {
    fn new(kind: IndexKind) -> Self {
        match kind {
            IndexKind::Hash => SecondaryIndex::Hash(HashMap::new()),
            IndexKind::Ordered => SecondaryIndex::Ordered(BTreeMap::new()),
        }
    }

    fn kind(&self) -> IndexKind {
        match self {
            SecondaryIndex::Hash(_) => IndexKind::Hash,
            SecondaryIndex::Ordered(_) => IndexKind::Ordered,
        }
    }

    fn insert(&mut self, value: Value, location: Location) {
        let slot = match self {
            SecondaryIndex::Hash(map) => map.entry(value).or_default(),
            SecondaryIndex::Ordered(map) => map.entry(value).or_default(),
        };
        if !slot.contains(&location) {
            slot.push(location);
        }
    }

    fn remove(&mut self, value: &Value, location: &Location) {
        let emptied = match self {
            SecondaryIndex::Hash(map) => remove_location(map.get_mut(value), location),
            SecondaryIndex::Ordered(map) => remove_location(map.get_mut(value), location),
        };

        if emptied {
            match self {
                SecondaryIndex::Hash(map) => {
                    map.remove(value);
                }
                SecondaryIndex::Ordered(map) => {
                    map.remove(value);
                }
            }
        }
    }

    fn get(&self, value: &Value) -> Vec<Location> {
        let slot = match self {
            SecondaryIndex::Hash(map) => map.get(value),
            SecondaryIndex::Ordered(map) => map.get(value),
        };
        slot.cloned().unwrap_or_default()
    }

    fn entry_count(&self) -> usize {
        match self {
            SecondaryIndex::Hash(map) => map.values().map(Vec::len).sum(),
            SecondaryIndex::Ordered(map) => map.values().map(Vec::len).sum(),
        }
    }
}

/// Returns true if the slot ended up empty
fn remove_location(slot: Option<&mut Vec<Location>>, location: &Location) -> bool {
    match slot {
        Some(locations) => {
            locations.retain(|l| l != location);
            locations.is_empty()
        }
        None => false,
    }
}

/// Registry of secondary indexes for all tables
#[derive(Debug, Default)]
pub struct IndexManager {
    /// table name → field name → index
    indexes: HashMap<String, HashMap<String, SecondaryIndex>>,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build (or rebuild) an index from a full scan
    ///
    /// `rows` yields every live record of the table with its location.
    /// Null values are not indexed. Returns the number of indexed entries.
    pub fn build<I>(&mut self, table_name: &str, field_name: &str, kind: IndexKind, rows: I) -> usize
    where
        I: IntoIterator<Item = (Record, Location)>,
    {
        let mut index = SecondaryIndex::new(kind);
        for (mut record, location) in rows {
            match record.remove(field_name) {
                Some(value) if !value.is_null() => index.insert(value, location),
                _ => {}
            }
        }

        let count = index.entry_count();
        debug!(table = table_name, field = field_name, %kind, entries = count, "Built index");

        self.indexes
            .entry(table_name.to_string())
            .or_default()
            .insert(field_name.to_string(), index);
        count
    }

    /// Record a successful insert in every index of the table
    ///
    /// No-op for fields without a built index.
    pub fn note_insert(&mut self, table_name: &str, record: &Record, location: &Location) {
        let Some(fields) = self.indexes.get_mut(table_name) else {
            return;
        };

        for (field, index) in fields.iter_mut() {
            if let Some(value) = record.get(field).filter(|v| !v.is_null()) {
                index.insert(value.clone(), location.clone());
            }
        }
    }

    /// Record a successful delete in every index of the table
    pub fn note_delete(&mut self, table_name: &str, record: &Record, location: &Location) {
        let Some(fields) = self.indexes.get_mut(table_name) else {
            return;
        };

        for (field, index) in fields.iter_mut() {
            if let Some(value) = record.get(field) {
                index.remove(value, location);
            }
        }
    }

    /// Forget every index of a table
    pub fn drop_table(&mut self, table_name: &str) {
        if self.indexes.remove(table_name).is_some() {
            debug!(table = table_name, "Dropped indexes");
        }
    }

    /// Kind of the index on `field_name`, if one is built
    pub fn kind(&self, table_name: &str, field_name: &str) -> Option<IndexKind> {
        self.indexes
            .get(table_name)?
            .get(field_name)
            .map(SecondaryIndex::kind)
    }

    /// Indexed fields of a table with their kinds
    pub fn indexed_fields(&self, table_name: &str) -> Vec<(String, IndexKind)> {
        self.indexes
            .get(table_name)
            .map(|fields| {
                fields
                    .iter()
                    .map(|(name, index)| (name.clone(), index.kind()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Exact-match lookup
    ///
    /// Returns `None` when `field_name` has no index.
    pub fn lookup_eq(&self, table_name: &str, field_name: &str, value: &Value) -> Option<Vec<Location>> {
        let index = self.indexes.get(table_name)?.get(field_name)?;
        Some(index.get(value))
    }

    /// Comparison lookup for any operator
    ///
    /// Returns `None` when `field_name` has no index, or when a range
    /// operator is used against a hash index. Locations come back in value
    /// order for ordered indexes.
    pub fn lookup_range(
        &self,
        table_name: &str,
        field_name: &str,
        op: Operator,
        value: &Value,
    ) -> Option<Vec<Location>> {
        let index = self.indexes.get(table_name)?.get(field_name)?;

        match (index, op) {
            (_, Operator::Eq) => Some(index.get(value)),
            (SecondaryIndex::Hash(map), Operator::Ne) => Some(
                map.iter()
                    .filter(|(k, _)| *k != value)
                    .flat_map(|(_, locs)| locs.iter().cloned())
                    .collect(),
            ),
            (SecondaryIndex::Hash(_), _) => None,
            (SecondaryIndex::Ordered(map), op) => {
                let bounds: (Bound<&Value>, Bound<&Value>) = match op {
                    Operator::Lt => (Bound::Unbounded, Bound::Excluded(value)),
                    Operator::Le => (Bound::Unbounded, Bound::Included(value)),
                    Operator::Gt => (Bound::Excluded(value), Bound::Unbounded),
                    Operator::Ge => (Bound::Included(value), Bound::Unbounded),
                    Operator::Eq | Operator::Ne => (Bound::Unbounded, Bound::Unbounded),
                };

                Some(
                    map.range::<Value, _>(bounds)
                        .filter(|(k, _)| op != Operator::Ne || *k != value)
                        .filter(|(k, _)| k.compare(value).is_some())
                        .flat_map(|(_, locs)| locs.iter().cloned())
                        .collect(),
                )
            }
        }
    }
}
