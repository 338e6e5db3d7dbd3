// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Ordered, duplicate-free PTR record sets and source aggregation.
//!
//! A [`RecordSet`] never holds two records with the same reverse-lookup name. Order is
//! insertion order; when a name is seen twice, the first occurrence wins and keeps its
//! position.

use crate::ptr::PtrRecord;
use std::collections::HashSet;

/// An ordered sequence of PTR records, unique by reverse-lookup name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<PtrRecord>,
    seen: HashSet<String>,
}

impl RecordSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from records, dropping later duplicates.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = PtrRecord>) -> Self {
        let mut set = Self::new();
        set.extend(records);
        set
    }

    /// Append a record unless its reverse name is already present.
    ///
    /// Returns `true` if the record was added.
    pub fn insert(&mut self, record: PtrRecord) -> bool {
        if self.seen.contains(record.reverse_name()) {
            return false;
        }
        self.seen.insert(record.reverse_name().to_string());
        self.records.push(record);
        true
    }

    /// Whether a record with this reverse name is present.
    #[must_use]
    pub fn contains(&self, reverse_name: &str) -> bool {
        self.seen.contains(reverse_name)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, PtrRecord> {
        self.records.iter()
    }

    /// Borrow the records as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[PtrRecord] {
        &self.records
    }
}

impl Extend<PtrRecord> for RecordSet {
    fn extend<I: IntoIterator<Item = PtrRecord>>(&mut self, iter: I) {
        for record in iter {
            self.insert(record);
        }
    }
}

impl FromIterator<PtrRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = PtrRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a PtrRecord;
    type IntoIter = std::slice::Iter<'a, PtrRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for RecordSet {
    type Item = PtrRecord;
    type IntoIter = std::vec::IntoIter<PtrRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Merge sources in priority order, keeping the first occurrence of every name.
///
/// Runs in O(n) over the total number of records.
#[must_use]
pub fn merge(sources: impl IntoIterator<Item = RecordSet>) -> RecordSet {
    let mut merged = RecordSet::new();
    for source in sources {
        merged.extend(source);
    }
    merged
}

#[cfg(test)]
#[path = "record_set_tests.rs"]
mod record_set_tests;
