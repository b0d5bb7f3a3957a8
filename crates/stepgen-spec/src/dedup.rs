//! Order-preserving deduplication of compiled steps.

use std::collections::HashSet;

use crate::step::{StepKeyword, StepRecord};

/// Compiled steps of one file, unique by `(keyword, pattern)`.
///
/// The first record for a key wins and insertion order is kept, so the
/// generated file lists definitions in the order they first appear.
#[derive(Debug, Clone, Default)]
pub struct CompiledStepSet {
    seen: HashSet<(StepKeyword, String)>,
    records: Vec<StepRecord>,
}

impl CompiledStepSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. Returns `false` when its key is already present.
    pub fn insert(&mut self, record: StepRecord) -> bool {
        if !self.seen.insert((record.keyword, record.pattern.clone())) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, keyword: StepKeyword, pattern: &str) -> bool {
        self.seen.contains(&(keyword, pattern.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepRecord> {
        self.records.iter()
    }

    /// Records for one keyword, in insertion order.
    pub fn by_keyword(&self, keyword: StepKeyword) -> impl Iterator<Item = &StepRecord> {
        self.records.iter().filter(move |r| r.keyword == keyword)
    }

    pub fn count(&self, keyword: StepKeyword) -> usize {
        self.by_keyword(keyword).count()
    }

    pub fn into_records(self) -> Vec<StepRecord> {
        self.records
    }
}

impl FromIterator<StepRecord> for CompiledStepSet {
    fn from_iter<I: IntoIterator<Item = StepRecord>>(iter: I) -> Self {
        let mut set = Self::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

impl Extend<StepRecord> for CompiledStepSet {
    fn extend<I: IntoIterator<Item = StepRecord>>(&mut self, iter: I) {
        for record in iter {
            self.insert(record);
        }
    }
}

/// Drop later records whose `(keyword, pattern)` was already seen.
pub fn dedup(records: Vec<StepRecord>) -> Vec<StepRecord> {
    records.into_iter().collect::<CompiledStepSet>().into_records()
}
