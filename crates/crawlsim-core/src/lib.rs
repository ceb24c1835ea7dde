//! Backend-agnostic types, traits and errors shared by every crawl-simulator
//! crate: the document/page model, the Frontier and SeenSet interfaces, and
//! the crate-wide error taxonomy.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("index {index} out of range for capacity {capacity}")]
    OutOfRange { index: u64, capacity: u64 },
    #[error("frontier is empty")]
    EmptyFrontier,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A dense, contiguous, non-negative integer assigned by insertion order of
/// the URL -> DocId mapping (spec: DocNo).
pub type DocNo = u64;

/// The corpus's native textual identifier, used for shard addressing
/// (e.g. `"clueweb22-en00-00-00001"`).
pub type DocId = String;

/// A real-valued page-quality estimate. `None` stands for the corpus's
/// "missing" sentinel.
pub type QScore = f32;

/// Priority used internally by quality-based frontier policies.
pub const MIN_PRIORITY: f32 = -50.0;
pub const MAX_PRIORITY: f32 = 1.0;

/// Metadata attached to a page once it has been parsed. Lazy-policy pages
/// may carry neither field; quality-policy pages carry `qscore`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMetadata {
    pub qscore: Option<QScore>,
    pub outlinks: Option<Vec<String>>,
    pub num_inlinks: Option<usize>,
}

/// A document identified by URL, its native DocId, and its DocNo, optionally
/// carrying parsed metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub url: String,
    pub docid: DocId,
    pub docno: DocNo,
    pub metadata: Option<PageMetadata>,
}

impl Page {
    pub fn new(url: impl Into<String>, docid: DocId, docno: DocNo) -> Self {
        Self {
            url: url.into(),
            docid,
            docno,
            metadata: None,
        }
    }

    pub fn qscore(&self) -> Option<QScore> {
        self.metadata.as_ref().and_then(|m| m.qscore)
    }
}

/// Membership over the docid space. Two concrete variants live in
/// `crawlsim-engine`: a hashed set (unbounded) and a fixed-capacity bitmap.
pub trait SeenSet {
    /// Marks `docno` as seen. Idempotent: marking an already-seen docno
    /// leaves `count()` unchanged.
    fn mark(&mut self, docno: DocNo) -> Result<()>;
    fn is_marked(&self, docno: DocNo) -> bool;
    fn count(&self) -> usize;
}

/// Policy-parameterised priority queue of pending URLs. Each policy has its
/// own per-policy contract; this trait is the common dispatch surface every
/// policy realises.
pub trait Frontier {
    /// Enqueues a new page. `parent` is the page that discovered it, if
    /// any; policies that ignore lineage (all but quality-based ones) may
    /// disregard it.
    fn add(&mut self, page: &Page, parent: Option<&Page>) -> Result<()>;

    /// Enqueues a seed URL at maximum priority.
    fn add_seed(&mut self, url: &str) -> Result<()>;

    /// Updates the priority of an already-enqueued page. Returns `Ok(true)`
    /// if `url` was known (whether or not the update actually improved its
    /// priority), `Ok(false)` if `url` is not tracked.
    fn update(&mut self, page: &Page, parent: Option<&Page>) -> Result<bool>;

    /// Removes and returns the next URL to crawl.
    fn pop(&mut self) -> Result<String>;

    /// Number of distinct URLs currently enqueued (logical, not physical).
    fn size(&self) -> usize;
}
