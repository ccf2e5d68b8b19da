//! The authoritative in-memory list of candidates.
//!
//! Every mutation re-derives totals and re-ranks the whole collection, so
//! `order` always equals the 1-based rank by descending total.

use std::collections::HashSet;

use crate::candidate::{Candidate, CandidateInput};
use crate::filter::filter_candidates;
use crate::ids::generate_id;
use crate::ranking::rerank;

#[derive(Debug, Clone, Default)]
pub struct CandidateCollection {
    records: Vec<Candidate>,
}

impl CandidateCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt records read from a backend.
    ///
    /// Records with a blank or duplicate id receive a fresh one; totals and
    /// ranks are recomputed.
    pub fn from_records(records: Vec<Candidate>) -> Self {
        let mut collection = Self::new();
        collection.replace_all(records);
        collection
    }

    pub fn records(&self) -> &[Candidate] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Candidate> {
        self.records.iter().find(|c| c.id == id)
    }

    /// Records whose fields contain `query`, in rank order.
    pub fn filter(&self, query: &str) -> Vec<Candidate> {
        filter_candidates(&self.records, query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Create a record from partial input and return it with its rank.
    pub fn add(&mut self, input: &CandidateInput) -> Candidate {
        let created = Candidate::from_input(self.fresh_id(), input);
        self.records.push(created.clone());
        rerank(&mut self.records);
        self.get(&created.id).cloned().unwrap_or(created)
    }

    /// Merge `input` into the record with `id`.
    ///
    /// Returns `None` and leaves the collection untouched when no record
    /// has that id.
    pub fn update(&mut self, id: &str, input: &CandidateInput) -> Option<Candidate> {
        let record = self.records.iter_mut().find(|c| c.id == id)?;
        record.apply(input);
        rerank(&mut self.records);
        self.get(id).cloned()
    }

    /// Remove the record with `id`, returning it if it existed.
    pub fn remove(&mut self, id: &str) -> Option<Candidate> {
        let index = self.records.iter().position(|c| c.id == id)?;
        let removed = self.records.remove(index);
        rerank(&mut self.records);
        Some(removed)
    }

    /// Clear the collection, returning how many records were dropped.
    pub fn remove_all(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        count
    }

    /// Append imported rows, each with a fresh id, and return how many
    /// were added.
    pub fn import_many(&mut self, rows: &[CandidateInput]) -> usize {
        for row in rows {
            let id = self.fresh_id();
            self.records.push(Candidate::from_input(id, row));
        }
        rerank(&mut self.records);
        rows.len()
    }

    /// Replace the whole collection.
    ///
    /// Existing non-blank ids are kept; blank or repeated ids are replaced.
    pub fn replace_all(&mut self, records: Vec<Candidate>) {
        self.records.clear();
        let mut seen = HashSet::new();
        for mut record in records {
            if record.id.trim().is_empty() || !seen.insert(record.id.clone()) {
                record.id = self.fresh_id_excluding(&seen);
                seen.insert(record.id.clone());
            }
            self.records.push(record);
        }
        rerank(&mut self.records);
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = generate_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn fresh_id_excluding(&self, taken: &HashSet<String>) -> String {
        loop {
            let id = self.fresh_id();
            if !taken.contains(&id) {
                return id;
            }
        }
    }
}
