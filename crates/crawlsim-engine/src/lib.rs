//! Concrete implementations of the crawl-simulator's core data structures:
//! the corpus index, shard reader, quality-score table, seen-set variants,
//! frontier policies, download log, link parser and orchestrator.

pub mod corpus_index;
pub mod download_log;
pub mod frontier;
pub mod orchestrator;
pub mod parser;
pub mod qscore_table;
pub mod run_output;
pub mod seeds;
pub mod seen_set;
pub mod shard_reader;

pub use corpus_index::CorpusIndex;
pub use download_log::DownloadLog;
pub use orchestrator::Orchestrator;
pub use parser::Parser;
pub use qscore_table::QScoreTable;
pub use seen_set::{AnySeenSet, BitmapSeenSet, HashedSeenSet};
pub use shard_reader::ShardReader;
