//! Seed generation: produces the `Vec<String>` that
//! `Orchestrator::populate_frontier` consumes.

use crate::corpus_index::CorpusIndex;
use crawlsim_core::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::BufRead;
use std::path::{Path, PathBuf};

pub trait SeedGenerator {
    fn generate(&mut self) -> Result<Vec<String>>;
}

/// Draws `n` distinct URLs uniformly from the corpus's URL space, via a
/// seeded RNG held inside the instance so a run is reproducible given the
/// same seed.
pub struct RandomSeeds<'a> {
    corpus: &'a CorpusIndex,
    n: usize,
    rng: StdRng,
}

impl<'a> RandomSeeds<'a> {
    pub fn new(corpus: &'a CorpusIndex, n: usize, rng_seed: u64) -> Self {
        Self {
            corpus,
            n,
            rng: StdRng::seed_from_u64(rng_seed),
        }
    }
}

impl<'a> SeedGenerator for RandomSeeds<'a> {
    fn generate(&mut self) -> Result<Vec<String>> {
        let n = self.n.min(self.corpus.len());
        let indices = rand::seq::index::sample(&mut self.rng, self.corpus.len(), n);
        Ok(indices
            .into_iter()
            .map(|docno| {
                self.corpus
                    .docno_to_url(docno as crawlsim_core::DocNo)
                    .expect("sampled index is within corpus bounds")
                    .to_string()
            })
            .collect())
    }
}

/// Reads a sidecar seeds file verbatim: one URL per line, UTF-8, trimmed.
pub struct ListSeeds {
    path: PathBuf,
}

impl ListSeeds {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SeedGenerator for ListSeeds {
    fn generate(&mut self) -> Result<Vec<String>> {
        let file = std::fs::File::open(&self.path)?;
        let reader = std::io::BufReader::new(file);
        let mut urls = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                urls.push(trimmed.to_string());
            }
        }
        Ok(urls)
    }
}

/// Selects which SeedGenerator a caller should construct, mirroring the
/// original's `init_seed_generator` factory.
pub enum SeedStrategy {
    Random { n: usize, rng_seed: u64 },
    List { path: PathBuf },
}

impl SeedStrategy {
    pub fn build<'a>(&'a self, corpus: &'a CorpusIndex) -> Box<dyn SeedGenerator + 'a> {
        match self {
            SeedStrategy::Random { n, rng_seed } => Box::new(RandomSeeds::new(corpus, *n, *rng_seed)),
            SeedStrategy::List { path } => Box::new(ListSeeds::new(path.clone())),
        }
    }
}
