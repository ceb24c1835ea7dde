//! The frontier subsystem: five policies behind one small dispatch
//! interface. A tagged union with a narrow interface is sufficient here; a
//! vtable is not required.

pub mod bfs;
pub mod dfs;
pub mod quality_heap;
pub mod quality_updating;
pub mod random;

use crawlsim_core::{Frontier, Page, Result};

/// Selects which frontier policy `AnyFrontier::new` constructs.
#[derive(Debug, Clone)]
pub enum FrontierPolicy {
    Random { rng_seed: u64 },
    Bfs,
    Dfs,
    QualityHeap,
    /// `max_stale` overrides `quality_updating::MAX_STALE` when `Some`.
    QualityUpdating { max_stale: Option<u64> },
}

impl FrontierPolicy {
    /// Whether this policy consumes per-page quality scores. The
    /// orchestrator's Parser is configured to parse qscores iff true.
    pub fn is_quality_based(&self) -> bool {
        matches!(
            self,
            FrontierPolicy::QualityHeap | FrontierPolicy::QualityUpdating { .. }
        )
    }

    /// Whether outlinks already present in SeenSet should still be routed
    /// to `Frontier::update`. Only the updating policy has a meaningful
    /// `update`.
    pub fn updates_enabled(&self) -> bool {
        matches!(self, FrontierPolicy::QualityUpdating { .. })
    }
}

pub enum AnyFrontier {
    Random(random::RandomFrontier),
    Bfs(bfs::BfsFrontier),
    Dfs(dfs::DfsFrontier),
    QualityHeap(quality_heap::QualityHeapFrontier),
    QualityUpdating(quality_updating::QualityUpdatingFrontier),
}

impl AnyFrontier {
    pub fn new(policy: &FrontierPolicy) -> Self {
        match policy {
            FrontierPolicy::Random { rng_seed } => {
                AnyFrontier::Random(random::RandomFrontier::new(*rng_seed))
            }
            FrontierPolicy::Bfs => AnyFrontier::Bfs(bfs::BfsFrontier::new()),
            FrontierPolicy::Dfs => AnyFrontier::Dfs(dfs::DfsFrontier::new()),
            FrontierPolicy::QualityHeap => {
                AnyFrontier::QualityHeap(quality_heap::QualityHeapFrontier::new())
            }
            FrontierPolicy::QualityUpdating { max_stale } => {
                AnyFrontier::QualityUpdating(match max_stale {
                    Some(threshold) => {
                        quality_updating::QualityUpdatingFrontier::with_max_stale(*threshold)
                    }
                    None => quality_updating::QualityUpdatingFrontier::new(),
                })
            }
        }
    }
}

impl Frontier for AnyFrontier {
    fn add(&mut self, page: &Page, parent: Option<&Page>) -> Result<()> {
        match self {
            AnyFrontier::Random(f) => f.add(page, parent),
            AnyFrontier::Bfs(f) => f.add(page, parent),
            AnyFrontier::Dfs(f) => f.add(page, parent),
            AnyFrontier::QualityHeap(f) => f.add(page, parent),
            AnyFrontier::QualityUpdating(f) => f.add(page, parent),
        }
    }

    fn add_seed(&mut self, url: &str) -> Result<()> {
        match self {
            AnyFrontier::Random(f) => f.add_seed(url),
            AnyFrontier::Bfs(f) => f.add_seed(url),
            AnyFrontier::Dfs(f) => f.add_seed(url),
            AnyFrontier::QualityHeap(f) => f.add_seed(url),
            AnyFrontier::QualityUpdating(f) => f.add_seed(url),
        }
    }

    fn update(&mut self, page: &Page, parent: Option<&Page>) -> Result<bool> {
        match self {
            AnyFrontier::Random(f) => f.update(page, parent),
            AnyFrontier::Bfs(f) => f.update(page, parent),
            AnyFrontier::Dfs(f) => f.update(page, parent),
            AnyFrontier::QualityHeap(f) => f.update(page, parent),
            AnyFrontier::QualityUpdating(f) => f.update(page, parent),
        }
    }

    fn pop(&mut self) -> Result<String> {
        match self {
            AnyFrontier::Random(f) => f.pop(),
            AnyFrontier::Bfs(f) => f.pop(),
            AnyFrontier::Dfs(f) => f.pop(),
            AnyFrontier::QualityHeap(f) => f.pop(),
            AnyFrontier::QualityUpdating(f) => f.pop(),
        }
    }

    fn size(&self) -> usize {
        match self {
            AnyFrontier::Random(f) => f.size(),
            AnyFrontier::Bfs(f) => f.size(),
            AnyFrontier::Dfs(f) => f.size(),
            AnyFrontier::QualityHeap(f) => f.size(),
            AnyFrontier::QualityUpdating(f) => f.size(),
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crawlsim_core::PageMetadata;
    use proptest::prelude::*;

    fn page(url: &str, qscore: Option<f32>) -> Page {
        Page {
            url: url.to_string(),
            docid: format!("doc-{url}"),
            docno: 0,
            metadata: Some(PageMetadata {
                qscore,
                outlinks: None,
                num_inlinks: None,
            }),
        }
    }

    fn size_matches_adds_minus_pops(mut f: AnyFrontier, urls: &[String]) {
        for (i, url) in urls.iter().enumerate() {
            f.add(&page(url, Some(i as f32 % 10.0)), None).unwrap();
        }
        let mut popped = 0;
        while f.size() > 0 {
            f.pop().unwrap();
            popped += 1;
            assert_eq!(f.size(), urls.len() - popped);
        }
    }

    proptest! {
        #[test]
        fn bfs_size_equals_adds_minus_pops(urls in proptest::collection::vec("[a-z]{1,8}", 0..30)) {
            size_matches_adds_minus_pops(AnyFrontier::new(&FrontierPolicy::Bfs), &urls);
        }

        #[test]
        fn dfs_size_equals_adds_minus_pops(urls in proptest::collection::vec("[a-z]{1,8}", 0..30)) {
            size_matches_adds_minus_pops(AnyFrontier::new(&FrontierPolicy::Dfs), &urls);
        }

        #[test]
        fn quality_heap_size_equals_adds_minus_pops(urls in proptest::collection::vec("[a-z]{1,8}", 0..30)) {
            size_matches_adds_minus_pops(AnyFrontier::new(&FrontierPolicy::QualityHeap), &urls);
        }

        #[test]
        fn bfs_pop_is_permutation_of_add(urls in proptest::collection::hash_set("[a-z]{1,8}", 0..30)) {
            let urls: Vec<String> = urls.into_iter().collect();
            let mut f = AnyFrontier::new(&FrontierPolicy::Bfs);
            for u in &urls {
                f.add_seed(u).unwrap();
            }
            let mut order = Vec::new();
            while f.size() > 0 {
                order.push(f.pop().unwrap());
            }
            assert_eq!(order, urls);
        }

        #[test]
        fn dfs_pop_is_reverse_of_add(urls in proptest::collection::hash_set("[a-z]{1,8}", 0..30)) {
            let urls: Vec<String> = urls.into_iter().collect();
            let mut f = AnyFrontier::new(&FrontierPolicy::Dfs);
            for u in &urls {
                f.add_seed(u).unwrap();
            }
            let mut order = Vec::new();
            while f.size() > 0 {
                order.push(f.pop().unwrap());
            }
            let mut expected = urls;
            expected.reverse();
            assert_eq!(order, expected);
        }
    }
}
