//! Indexed record storage: an append-only `Vec` plus a key → index map.
//!
//! Records are never physically removed, so an index handed out once stays
//! valid for the lifetime of the ledger. Soft deletion is the record's own
//! `active` flag.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A record that can live in a [`Table`].
pub trait Record {
    type Key: Clone + Debug + Eq + Hash;

    fn key(&self) -> Self::Key;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table<T: Record> {
    records: Vec<T>,
    index: HashMap<T::Key, usize>,
}

impl<T: Record> Default for Table<T> {
    fn default() -> Self {
        Self { records: Vec::new(), index: HashMap::new() }
    }
}

impl<T: Record> Table<T> {
    /// Rebuild a table from its record list (the serialized form).
    pub fn from_records(records: Vec<T>) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.key(), i))
            .collect();
        Self { records, index }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, key: &T::Key) -> Option<&mut T> {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.records[i]),
            None => None,
        }
    }

    /// Append a record, or replace the one stored under the same key in place.
    /// Returns the record's stable index.
    pub fn upsert(&mut self, record: T) -> usize {
        let key = record.key();
        if let Some(&i) = self.index.get(&key) {
            self.records[i] = record;
            return i;
        }
        let i = self.records.len();
        self.records.push(record);
        self.index.insert(key, i);
        i
    }

    /// Fetch the record under `key`, inserting `make()` first if absent.
    pub fn entry_or_insert_with(&mut self, key: &T::Key, make: impl FnOnce() -> T) -> &mut T {
        let i = match self.index.get(key) {
            Some(&i) => i,
            None => self.upsert(make()),
        };
        &mut self.records[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.records
    }
}

impl<T: Record + Serialize> Serialize for Table<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}

impl<'de, T: Record + Deserialize<'de>> Deserialize<'de> for Table<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::from_records)
    }
}
