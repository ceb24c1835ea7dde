//! Extracts outlinks (with self-link/duplicate removal) and attaches
//! qscore/inlink-count metadata to a downloaded page.

use crate::qscore_table::QScoreTable;
use crate::shard_reader::ShardReader;
use crawlsim_core::{Page, PageMetadata, QScore, Result};

/// Read-only configuration: which optional metadata fields to populate.
/// Outlinks are always populated by `metadata()`; qscore and inlink count
/// are opt-in.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserConfig {
    pub parse_qscores: bool,
    pub parse_inlinks: bool,
}

pub struct Parser<'a> {
    config: ParserConfig,
    outlinks_reader: ShardReader,
    inlinks_reader: Option<ShardReader>,
    qscore_table: &'a QScoreTable,
}

/// Extracts the URL from a `[url, ...]`-shaped JSON array entry, or a bare
/// JSON string entry.
fn entry_url(entry: &serde_json::Value) -> Option<String> {
    match entry {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => items.first().and_then(|v| v.as_str()).map(str::to_string),
        _ => None,
    }
}

fn extract_link_field(record: &serde_json::Value, field: &str) -> Vec<String> {
    record
        .get(field)
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(entry_url).collect())
        .unwrap_or_default()
}

/// Removes self-links (equal to `own_url`) and duplicates, preserving
/// first-seen order.
pub fn clean_links(own_url: &str, links: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for link in links {
        if link == own_url {
            continue;
        }
        if seen.insert(link.clone()) {
            out.push(link);
        }
    }
    out
}

impl<'a> Parser<'a> {
    pub fn new(
        config: ParserConfig,
        outlinks_dir: impl Into<std::path::PathBuf>,
        inlinks_dir: Option<std::path::PathBuf>,
        qscore_table: &'a QScoreTable,
    ) -> Self {
        Self {
            config,
            outlinks_reader: ShardReader::new(outlinks_dir),
            inlinks_reader: inlinks_dir.map(ShardReader::new),
            qscore_table,
        }
    }

    /// Fetches the outlinks record via the ShardReader; `None` if missing.
    /// Otherwise returns the list after `clean_links`.
    pub fn outlinks(&mut self, page: &Page) -> Result<Option<Vec<String>>> {
        let Some(record) = self.outlinks_reader.read(&page.docid)? else {
            return Ok(None);
        };
        let raw = extract_link_field(&record, "outlinks");
        Ok(Some(clean_links(&page.url, raw)))
    }

    pub fn qscore(&self, page: &Page) -> Option<QScore> {
        self.qscore_table.score(&page.docid)
    }

    fn num_inlinks(&mut self, page: &Page) -> Result<Option<usize>> {
        let Some(reader) = self.inlinks_reader.as_mut() else {
            return Ok(None);
        };
        let Some(record) = reader.read(&page.docid)? else {
            return Ok(None);
        };
        Ok(Some(extract_link_field(&record, "anchors").len()))
    }

    /// Populates outlinks, and (if configured) qscore and inlink count.
    pub fn metadata(&mut self, page: &Page) -> Result<PageMetadata> {
        let outlinks = self.outlinks(page)?;
        let qscore = if self.config.parse_qscores {
            self.qscore(page)
        } else {
            None
        };
        let num_inlinks = if self.config.parse_inlinks {
            self.num_inlinks(page)?
        } else {
            None
        };
        Ok(PageMetadata {
            qscore,
            outlinks,
            num_inlinks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_loop_and_duplicates_are_removed_preserving_order() {
        // Scenario 5: P with outlinks [P, Q, Q, R] => clean_links emits [Q, R].
        let links = vec![
            "P".to_string(),
            "Q".to_string(),
            "Q".to_string(),
            "R".to_string(),
        ];
        assert_eq!(clean_links("P", links), vec!["Q".to_string(), "R".to_string()]);
    }

    #[test]
    fn entry_url_accepts_bare_strings_and_tuples() {
        assert_eq!(
            entry_url(&serde_json::json!("https://a.example/")),
            Some("https://a.example/".to_string())
        );
        assert_eq!(
            entry_url(&serde_json::json!(["https://a.example/", "anchor text"])),
            Some("https://a.example/".to_string())
        );
    }

    #[test]
    fn outlinks_missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let qtable = QScoreTable::default();
        let mut parser = Parser::new(ParserConfig::default(), dir.path(), None, &qtable);
        let page = Page::new("https://a.example/", "doc-missing-00-00000".to_string(), 0);
        assert!(parser.outlinks(&page).unwrap().is_none());
    }
}
