//! DFS frontier policy: a LIFO on the same deque as BFS; `pop` from the
//! tail.

use crawlsim_core::{Error, Frontier, Page, Result};
use std::collections::VecDeque;

#[derive(Default)]
pub struct DfsFrontier {
    stack: VecDeque<String>,
}

impl DfsFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for DfsFrontier {
    fn add(&mut self, page: &Page, _parent: Option<&Page>) -> Result<()> {
        self.stack.push_back(page.url.clone());
        Ok(())
    }

    fn add_seed(&mut self, url: &str) -> Result<()> {
        self.stack.push_back(url.to_string());
        Ok(())
    }

    fn update(&mut self, _page: &Page, _parent: Option<&Page>) -> Result<bool> {
        Ok(true)
    }

    fn pop(&mut self) -> Result<String> {
        self.stack.pop_back().ok_or(Error::EmptyFrontier)
    }

    fn size(&self) -> usize {
        self.stack.len()
    }
}
