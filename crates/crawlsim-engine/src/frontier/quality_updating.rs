//! Quality-updating frontier policy: the interesting case. A max-heap of
//! `(priority, url)` augmented with a lazy-deletion table
//! `url -> {best_priority, pending_obsolete_count}`.
//!
//! `update` accepts a candidate priority only when it is strictly greater
//! than the tracked best, a deliberate monotonic-improvement invariant.

use crawlsim_core::{Error, Frontier, Page, Result, MAX_PRIORITY, MIN_PRIORITY};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Threshold above which accumulated stale heap entries trigger a
/// compaction.
pub const MAX_STALE: u64 = 10_000_000;

#[derive(Debug)]
struct Entry {
    priority: f32,
    url: String,
    /// The `TableEntry::generation` this heap entry was pushed for. Lets
    /// `pop` tell a shadow of the url's *current* life from a leftover
    /// shadow of a life that ended in `remove` and was since re-added.
    generation: u64,
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

#[derive(Debug, Clone, Copy)]
struct TableEntry {
    best_priority: f32,
    count: i64,
    generation: u64,
}

pub struct QualityUpdatingFrontier {
    heap: BinaryHeap<Entry>,
    table: HashMap<String, TableEntry>,
    tracked_count: usize,
    /// Cumulative count of outstanding stale heap entries since the last
    /// compaction.
    stale_budget: u64,
    max_stale: u64,
    /// Bumped every time a url re-enters `Live` after having been
    /// `remove`d, so leftover heap shadows from its previous life never
    /// get mistaken for the new one.
    next_generation: u64,
}

impl Default for QualityUpdatingFrontier {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityUpdatingFrontier {
    pub fn new() -> Self {
        Self::with_max_stale(MAX_STALE)
    }

    /// Constructs a frontier with a custom compaction threshold. Exposed so
    /// tests can exercise compaction without millions of updates.
    pub fn with_max_stale(max_stale: u64) -> Self {
        Self {
            heap: BinaryHeap::new(),
            table: HashMap::new(),
            tracked_count: 0,
            stale_budget: 0,
            max_stale,
            next_generation: 0,
        }
    }

    /// Marks `url` as deleted: any outstanding or future heap entries for
    /// it are treated as stale on pop, and it no longer counts toward
    /// `size()`. `url` re-enters `Absent`, so a later `add`/`add_seed` is
    /// accepted rather than rejected as already-tracked.
    pub fn remove(&mut self, url: &str) {
        if let Some(entry) = self.table.get_mut(url) {
            if !entry.best_priority.is_infinite() {
                entry.best_priority = f32::INFINITY;
                self.tracked_count = self.tracked_count.saturating_sub(1);
            }
        }
    }

    fn insert_new(&mut self, url: &str, priority: f32) -> Result<()> {
        let generation = match self.table.get(url) {
            Some(entry) if entry.best_priority.is_infinite() => {
                self.next_generation += 1;
                self.next_generation
            }
            Some(_) => {
                return Err(Error::InvariantViolation(format!(
                    "add() called for already-tracked url {url}"
                )));
            }
            None => 0,
        };
        self.heap.push(Entry {
            priority,
            url: url.to_string(),
            generation,
        });
        self.table.insert(
            url.to_string(),
            TableEntry {
                best_priority: priority,
                count: 0,
                generation,
            },
        );
        self.tracked_count += 1;
        Ok(())
    }

    fn maybe_compact(&mut self) {
        if self.stale_budget <= self.max_stale {
            return;
        }
        let mut fresh = BinaryHeap::with_capacity(self.table.len());
        for (url, entry) in self.table.iter_mut() {
            if !entry.best_priority.is_infinite() {
                fresh.push(Entry {
                    priority: entry.best_priority,
                    url: url.clone(),
                    generation: entry.generation,
                });
                entry.count = 0;
            }
        }
        self.heap = fresh;
        self.stale_budget = 0;
    }
}

impl Frontier for QualityUpdatingFrontier {
    fn add(&mut self, page: &Page, _parent: Option<&Page>) -> Result<()> {
        let priority = page.qscore().unwrap_or(MIN_PRIORITY);
        self.insert_new(&page.url, priority)
    }

    fn add_seed(&mut self, url: &str) -> Result<()> {
        self.insert_new(url, MAX_PRIORITY)
    }

    fn update(&mut self, page: &Page, _parent: Option<&Page>) -> Result<bool> {
        let Some(entry) = self.table.get_mut(&page.url) else {
            return Ok(false);
        };
        let candidate = page.qscore().unwrap_or(MIN_PRIORITY);
        if candidate > entry.best_priority {
            entry.best_priority = candidate;
            entry.count += 1;
            let generation = entry.generation;
            self.stale_budget += 1;
            self.heap.push(Entry {
                priority: candidate,
                url: page.url.clone(),
                generation,
            });
            self.maybe_compact();
        }
        Ok(true)
    }

    fn pop(&mut self) -> Result<String> {
        loop {
            let Entry {
                url, generation, ..
            } = self.heap.pop().ok_or(Error::EmptyFrontier)?;
            let Some(entry) = self.table.get_mut(&url) else {
                // Already popped and removed from the table by an earlier
                // definitive pop of this same url; a leftover stale shadow.
                continue;
            };
            if entry.generation != generation {
                // Shadow from a life of this url that ended in `remove`
                // and was since re-added; not accounted against the
                // current live entry.
                continue;
            }
            if entry.best_priority.is_infinite() {
                // Removed: every remaining shadow for this url is discarded.
                self.stale_budget = self.stale_budget.saturating_sub(1);
                continue;
            }
            entry.count -= 1;
            if entry.count < 0 {
                self.table.remove(&url);
                self.tracked_count = self.tracked_count.saturating_sub(1);
                return Ok(url);
            }
            self.stale_budget = self.stale_budget.saturating_sub(1);
        }
    }

    fn size(&self) -> usize {
        self.tracked_count
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
    fn update_raises_priority_and_jumps_the_queue() {
        // Scenario 4: Seeds [S]; S -> [X(0.3), Y(0.5), Z(0.1)]; then an
        // update raises Y to 0.8 before it pops. Order: S, Y, X, Z.
        let mut f = QualityUpdatingFrontier::new();
        f.add_seed("S").unwrap();
        f.add(&page_with_qscore("X", 0.3), None).unwrap();
        f.add(&page_with_qscore("Y", 0.5), None).unwrap();
        f.add(&page_with_qscore("Z", 0.1), None).unwrap();
        assert!(f.update(&page_with_qscore("Y", 0.8), None).unwrap());

        assert_eq!(f.pop().unwrap(), "S");
        assert_eq!(f.pop().unwrap(), "Y");
        assert_eq!(f.pop().unwrap(), "X");
        assert_eq!(f.pop().unwrap(), "Z");
    }

    #[test]
    fn update_on_unknown_url_returns_false() {
        let mut f = QualityUpdatingFrontier::new();
        assert!(!f.update(&page_with_qscore("ghost", 1.0), None).unwrap());
    }

    #[test]
    fn non_improving_update_is_accepted_but_does_not_move_priority() {
        let mut f = QualityUpdatingFrontier::new();
        f.add(&page_with_qscore("X", 0.5), None).unwrap();
        assert!(f.update(&page_with_qscore("X", 0.1), None).unwrap());
        f.add(&page_with_qscore("Y", 0.3), None).unwrap();
        assert_eq!(f.pop().unwrap(), "X");
        assert_eq!(f.pop().unwrap(), "Y");
    }

    #[test]
    fn add_for_already_tracked_url_is_an_invariant_violation() {
        let mut f = QualityUpdatingFrontier::new();
        f.add(&page_with_qscore("X", 0.5), None).unwrap();
        assert!(matches!(
            f.add(&page_with_qscore("X", 0.9), None),
            Err(Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn size_tracks_distinct_urls_not_heap_length() {
        let mut f = QualityUpdatingFrontier::new();
        f.add(&page_with_qscore("X", 0.5), None).unwrap();
        f.update(&page_with_qscore("X", 0.9), None).unwrap();
        f.update(&page_with_qscore("X", 0.95), None).unwrap();
        // Three heap entries exist for X now, but only one distinct url.
        assert_eq!(f.size(), 1);
        assert_eq!(f.pop().unwrap(), "X");
        assert_eq!(f.size(), 0);
    }

    #[test]
    fn compaction_preserves_size_and_pop_order() {
        let mut f = QualityUpdatingFrontier::with_max_stale(2);
        f.add(&page_with_qscore("X", 0.1), None).unwrap();
        f.add(&page_with_qscore("Y", 0.2), None).unwrap();
        // Three improving updates on X push the stale budget past 2,
        // forcing a compaction mid-sequence.
        f.update(&page_with_qscore("X", 0.3), None).unwrap();
        f.update(&page_with_qscore("X", 0.4), None).unwrap();
        f.update(&page_with_qscore("X", 0.9), None).unwrap();
        assert_eq!(f.size(), 2);
        assert_eq!(f.pop().unwrap(), "X");
        assert_eq!(f.pop().unwrap(), "Y");
    }

    #[test]
    fn removed_url_is_never_popped_as_live() {
        let mut f = QualityUpdatingFrontier::new();
        f.add(&page_with_qscore("X", 0.9), None).unwrap();
        f.add(&page_with_qscore("Y", 0.1), None).unwrap();
        f.remove("X");
        assert_eq!(f.size(), 1);
        assert_eq!(f.pop().unwrap(), "Y");
        assert!(matches!(f.pop(), Err(Error::EmptyFrontier)));
    }

    #[test]
    fn removed_url_can_be_re_added() {
        let mut f = QualityUpdatingFrontier::new();
        f.add(&page_with_qscore("X", 0.9), None).unwrap();
        f.remove("X");
        // Re-adding a removed url must not be rejected as already-tracked.
        f.add(&page_with_qscore("X", 0.2), None).unwrap();
        assert_eq!(f.size(), 1);
        assert_eq!(f.pop().unwrap(), "X");
    }

    #[test]
    fn re_added_url_ignores_shadows_from_its_removed_life() {
        let mut f = QualityUpdatingFrontier::new();
        // X's first life reaches a high priority via updates, leaving a
        // stale shadow below it in the heap, then gets removed before
        // either heap entry pops.
        f.add(&page_with_qscore("X", 0.1), None).unwrap();
        f.update(&page_with_qscore("X", 0.9), None).unwrap();
        f.remove("X");

        // X's second life is re-added at a low priority, below Y. If the
        // leftover 0.9/0.1 shadows from X's first life were mistaken for
        // the new life, X would pop before Y, or would finalize on a
        // shadow pop and never be returned.
        f.add(&page_with_qscore("Y", 0.5), None).unwrap();
        f.add(&page_with_qscore("X", 0.2), None).unwrap();

        assert_eq!(f.pop().unwrap(), "Y");
        assert_eq!(f.pop().unwrap(), "X");
        assert!(matches!(f.pop(), Err(Error::EmptyFrontier)));
    }
}
