//! Read-only DocId -> quality score mapping, built once from an
//! externally-produced pair of parallel arrays and shared immutably for the
//! lifetime of the run.

use crawlsim_core::{DocId, QScore};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct QScoreTable {
    scores: HashMap<DocId, QScore>,
}

impl QScoreTable {
    /// Joins two parallel arrays (docids, scores) into an in-memory map.
    /// Mismatched lengths are truncated to the shorter array: the external
    /// cache is assumed well-formed, but a defensive truncation avoids an
    /// index panic on a malformed input file.
    pub fn from_parallel_arrays(docids: Vec<DocId>, scores: Vec<QScore>) -> Self {
        let scores = docids
            .into_iter()
            .zip(scores)
            .collect::<HashMap<_, _>>();
        Self { scores }
    }

    pub fn score(&self, docid: &DocId) -> Option<QScore> {
        self.scores.get(docid).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
