//! Random frontier policy: a vector of URLs; `pop` swaps a uniformly-chosen
//! element to the tail and truncates. O(1) pop, O(1) add.

use crawlsim_core::{Error, Frontier, Page, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct RandomFrontier {
    urls: Vec<String>,
    rng: StdRng,
}

impl RandomFrontier {
    pub fn new(rng_seed: u64) -> Self {
        Self {
            urls: Vec::new(),
            rng: StdRng::seed_from_u64(rng_seed),
        }
    }
}

impl Frontier for RandomFrontier {
    fn add(&mut self, page: &Page, _parent: Option<&Page>) -> Result<()> {
        self.urls.push(page.url.clone());
        Ok(())
    }

    fn add_seed(&mut self, url: &str) -> Result<()> {
        self.urls.push(url.to_string());
        Ok(())
    }

    fn update(&mut self, _page: &Page, _parent: Option<&Page>) -> Result<bool> {
        Ok(true)
    }

    fn pop(&mut self) -> Result<String> {
        if self.urls.is_empty() {
            return Err(Error::EmptyFrontier);
        }
        let idx = self.rng.gen_range(0..self.urls.len());
        let last = self.urls.len() - 1;
        self.urls.swap(idx, last);
        Ok(self.urls.pop().expect("checked non-empty above"))
    }

    fn size(&self) -> usize {
        self.urls.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn seed_page(url: &str) -> Page {
        Page::new(url, format!("doc-{url}"), 0)
    }

    #[test]
    fn pop_set_equals_add_set() {
        let mut f = RandomFrontier::new(42);
        for url in ["a", "b", "c", "d"] {
            f.add(&seed_page(url), None).unwrap();
        }
        let mut popped = HashSet::new();
        while f.size() > 0 {
            popped.insert(f.pop().unwrap());
        }
        let expected: HashSet<_> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(popped, expected);
    }

    #[test]
    fn pop_on_empty_fails() {
        let mut f = RandomFrontier::new(1);
        assert!(matches!(f.pop(), Err(Error::EmptyFrontier)));
    }

    #[test]
    fn update_is_a_no_op() {
        let mut f = RandomFrontier::new(1);
        f.add(&seed_page("a"), None).unwrap();
        assert!(f.update(&seed_page("a"), None).unwrap());
        assert_eq!(f.size(), 1);
    }
}
