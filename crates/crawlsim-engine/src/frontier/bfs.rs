//! BFS frontier policy: a FIFO; `pop` from head, `add`/`add_seed` push to
//! tail, `update` is a no-op.

use crawlsim_core::{Error, Frontier, Page, Result};
use std::collections::VecDeque;

#[derive(Default)]
pub struct BfsFrontier {
    queue: VecDeque<String>,
}

impl BfsFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for BfsFrontier {
    fn add(&mut self, page: &Page, _parent: Option<&Page>) -> Result<()> {
        self.queue.push_back(page.url.clone());
        Ok(())
    }

    fn add_seed(&mut self, url: &str) -> Result<()> {
        self.queue.push_back(url.to_string());
        Ok(())
    }

    fn update(&mut self, _page: &Page, _parent: Option<&Page>) -> Result<bool> {
        Ok(true)
    }

    fn pop(&mut self) -> Result<String> {
        self.queue.pop_front().ok_or(Error::EmptyFrontier)
    }

    fn size(&self) -> usize {
        self.queue.len()
    }
}
