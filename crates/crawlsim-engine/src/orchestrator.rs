//! Crawl state machine: seed -> pop -> "fetch" -> parse -> enqueue.
//! Single-threaded, cooperative.

use crate::corpus_index::CorpusIndex;
use crate::download_log::DownloadLog;
use crate::frontier::{AnyFrontier, FrontierPolicy};
use crate::parser::Parser;
use crate::seen_set::AnySeenSet;
use crawlsim_core::{Frontier, Page, PageMetadata, Result, SeenSet};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    pub save_every_n_pages: u64,
    /// 0 means unlimited.
    pub max_pages: u64,
    /// When true and the policy is quality-based, `populate_frontier`
    /// pre-parses each seed's own qscore before `add`.
    pub oracle_quality: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RunCounters {
    pub notfound_seedurls: u64,
    pub wrong_linked_docid: u64,
    pub failed_downloads: u64,
    pub num_outlinks: u64,
    pub downloaded: u64,
}

pub struct Orchestrator<'a> {
    corpus: &'a CorpusIndex,
    seen: AnySeenSet,
    frontier: AnyFrontier,
    policy: FrontierPolicy,
    parser: Parser<'a>,
    download_log: DownloadLog,
    config: OrchestratorConfig,
    counters: RunCounters,
}

/// Writes one URL per line, UTF-8.
fn write_seeds_sidecar(path: &Path, seeds: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    for seed in seeds {
        writeln!(file, "{seed}")?;
    }
    Ok(())
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        corpus: &'a CorpusIndex,
        seen: AnySeenSet,
        policy: FrontierPolicy,
        parser: Parser<'a>,
        download_log: DownloadLog,
        config: OrchestratorConfig,
    ) -> Self {
        let frontier = AnyFrontier::new(&policy);
        Self {
            corpus,
            seen,
            frontier,
            policy,
            parser,
            download_log,
            config,
            counters: RunCounters::default(),
        }
    }

    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    /// Inserts each seed URL, recording any not present in the corpus, and
    /// writes the accepted seeds to `seeds_sidecar_path` for reproducibility.
    pub fn populate_frontier(
        &mut self,
        seeds: &[String],
        seeds_sidecar_path: impl AsRef<Path>,
    ) -> Result<()> {
        let mut inserted = Vec::with_capacity(seeds.len());
        for url in seeds {
            let Some(docno) = self.corpus.url_to_docno(url) else {
                self.counters.notfound_seedurls += 1;
                continue;
            };
            if self.policy.is_quality_based() && self.config.oracle_quality {
                let docid = self
                    .corpus
                    .docno_to_docid(docno)
                    .expect("docno returned by url_to_docno is always in range")
                    .clone();
                let seed_page = Page::new(url.clone(), docid.clone(), docno);
                let qscore = self.parser.qscore(&seed_page);
                let page = Page {
                    metadata: Some(PageMetadata {
                        qscore,
                        outlinks: None,
                        num_inlinks: None,
                    }),
                    ..seed_page
                };
                self.frontier.add(&page, None)?;
            } else {
                self.frontier.add_seed(url)?;
            }
            self.seen.mark(docno)?;
            inserted.push(url.clone());
        }
        write_seeds_sidecar(seeds_sidecar_path.as_ref(), &inserted)
    }

    /// Looks up `link`'s docno/docid and builds a Page carrying its qscore
    /// when the active policy needs one.
    fn build_linked_page(&self, link: &str) -> Option<Page> {
        let docno = self.corpus.url_to_docno(link)?;
        let docid = self
            .corpus
            .docno_to_docid(docno)
            .expect("docno returned by url_to_docno is always in range")
            .clone();
        let probe = Page::new(link.to_string(), docid.clone(), docno);
        let qscore = if self.policy.is_quality_based() {
            self.parser.qscore(&probe)
        } else {
            None
        };
        Some(Page {
            metadata: Some(PageMetadata {
                qscore,
                outlinks: None,
                num_inlinks: None,
            }),
            ..probe
        })
    }

    /// Runs the crawl loop until the frontier empties or `max_pages` is
    /// reached, then performs the terminal checkpoint.
    pub fn crawl(&mut self) -> Result<()> {
        while self.frontier.size() > 0 {
            if self.config.max_pages > 0 && self.counters.downloaded >= self.config.max_pages {
                break;
            }
            let url = self.frontier.pop()?;
            tracing::debug!(%url, "frontier pop");
            let Some(docid) = self.corpus.url_to_docid(&url).cloned() else {
                self.counters.failed_downloads += 1;
                continue;
            };
            let docno = self
                .corpus
                .url_to_docno(&url)
                .expect("url_to_docid succeeded so url_to_docno must too");
            let page = Page::new(url.clone(), docid, docno);
            self.download_log.push(docno);
            self.counters.downloaded += 1;

            let metadata = self.parser.metadata(&page)?;
            let outlinks = metadata.outlinks.clone().unwrap_or_default();
            self.counters.num_outlinks += outlinks.len() as u64;
            let page = Page {
                metadata: Some(metadata),
                ..page
            };

            for link in &outlinks {
                let Some(linked_page) = self.build_linked_page(link) else {
                    self.counters.wrong_linked_docid += 1;
                    continue;
                };
                if self.seen.is_marked(linked_page.docno) {
                    if self.policy.updates_enabled() {
                        tracing::trace!(url = %linked_page.url, "frontier update");
                        self.frontier.update(&linked_page, Some(&page))?;
                    }
                } else {
                    self.seen.mark(linked_page.docno)?;
                    tracing::trace!(url = %linked_page.url, "frontier add");
                    self.frontier.add(&linked_page, Some(&page))?;
                }
            }

            if self.config.save_every_n_pages > 0
                && self.counters.downloaded % self.config.save_every_n_pages == 0
            {
                let buffered = self.download_log.buffered_len();
                let checkpoint_id = self.download_log.checkpoint(false)?;
                tracing::info!(checkpoint_id, pages = buffered, "checkpoint flushed");
            }
        }
        let buffered = self.download_log.buffered_len();
        let checkpoint_id = self.download_log.checkpoint(true)?;
        tracing::info!(
            checkpoint_id,
            pages = buffered,
            "final checkpoint flushed"
        );
        tracing::info!(
            downloaded = self.counters.downloaded,
            notfound_seedurls = self.counters.notfound_seedurls,
            wrong_linked_docid = self.counters.wrong_linked_docid,
            failed_downloads = self.counters.failed_downloads,
            num_outlinks = self.counters.num_outlinks,
            "crawl finished"
        );
        Ok(())
    }

    pub fn download_log(&self) -> &DownloadLog {
        &self.download_log
    }
}
