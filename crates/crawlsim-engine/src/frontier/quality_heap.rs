//! Quality-heap frontier policy: immutable priorities. A plain max-heap of
//! `(priority, url)`; `update` is a no-op, the non-oracle case is left
//! unimplemented.

use crawlsim_core::{Error, Frontier, Page, Result, MAX_PRIORITY, MIN_PRIORITY};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct Entry {
    priority: f32,
    url: String,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}
impl Eq for Entry {}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.total_cmp(&other.priority)
    }
}

#[derive(Default)]
pub struct QualityHeapFrontier {
    heap: BinaryHeap<Entry>,
}

impl QualityHeapFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for QualityHeapFrontier {
    fn add(&mut self, page: &Page, _parent: Option<&Page>) -> Result<()> {
        let priority = page.qscore().unwrap_or(MIN_PRIORITY);
        self.heap.push(Entry {
            priority,
            url: page.url.clone(),
        });
        Ok(())
    }

    fn add_seed(&mut self, url: &str) -> Result<()> {
        self.heap.push(Entry {
            priority: MAX_PRIORITY,
            url: url.to_string(),
        });
        Ok(())
    }

    fn update(&mut self, _page: &Page, _parent: Option<&Page>) -> Result<bool> {
        Ok(true)
    }

    fn pop(&mut self) -> Result<String> {
        self.heap.pop().map(|e| e.url).ok_or(Error::EmptyFrontier)
    }

    fn size(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crawlsim_core::PageMetadata;

    fn page_with_qscore(url: &str, qscore: f32) -> Page {
        Page {
            url: url.to_string(),
            docid: format!("doc-{url}"),
            docno: 0,
            metadata: Some(PageMetadata {
                qscore: Some(qscore),
                outlinks: None,
                num_inlinks: None,
            }),
        }
    }

    #[test]
    fn higher_priority_pops_first() {
        let mut f = QualityHeapFrontier::new();
        f.add(&page_with_qscore("u1", 0.9), None).unwrap();
        f.add(&page_with_qscore("u2", 0.2), None).unwrap();
        assert_eq!(f.pop().unwrap(), "u1");
        assert_eq!(f.pop().unwrap(), "u2");
    }

    #[test]
    fn seeds_use_max_priority_scenario() {
        // Scenario 3: Seeds [S]; S -> [X (0.9), Y (0.2)]; order S, X, Y.
        let mut f = QualityHeapFrontier::new();
        f.add_seed("S").unwrap();
        f.add(&page_with_qscore("X", 0.9), None).unwrap();
        f.add(&page_with_qscore("Y", 0.2), None).unwrap();
        assert_eq!(f.pop().unwrap(), "S");
        assert_eq!(f.pop().unwrap(), "X");
        assert_eq!(f.pop().unwrap(), "Y");
    }

    #[test]
    fn missing_qscore_uses_min_priority() {
        let mut f = QualityHeapFrontier::new();
        f.add(
            &Page {
                url: "no-score".into(),
                docid: "d".into(),
                docno: 0,
                metadata: None,
            },
            None,
        )
        .unwrap();
        f.add(&page_with_qscore("has-score", -10.0), None).unwrap();
        assert_eq!(f.pop().unwrap(), "has-score");
        assert_eq!(f.pop().unwrap(), "no-score");
    }
}
