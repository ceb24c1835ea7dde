//! Immutable URL <-> DocId <-> DocNo mapping, loaded once per process and
//! shared by reference.

use crawlsim_core::{DocId, DocNo, Error, Result};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// A single URL/DocId pair as stored on disk. DocNo is never persisted: it
/// is always the pair's position in the list (invariant 1).
#[derive(serde::Serialize, serde::Deserialize)]
struct UrlDocIdPair {
    url: String,
    docid: DocId,
}

#[derive(Debug, Default)]
pub struct CorpusIndex {
    url_to_docid: HashMap<String, DocId>,
    url_to_docno: HashMap<String, DocNo>,
    docno_to_url: Vec<String>,
    docno_to_docid: Vec<DocId>,
}

impl CorpusIndex {
    /// Builds an index directly from an ordered list of (url, docid) pairs.
    /// DocNo is the pair's index. Intended for tests and for the
    /// `build-index` offline helper.
    pub fn from_pairs(pairs: Vec<(String, DocId)>) -> Self {
        let mut url_to_docid = HashMap::with_capacity(pairs.len());
        let mut url_to_docno = HashMap::with_capacity(pairs.len());
        let mut docno_to_url = Vec::with_capacity(pairs.len());
        let mut docno_to_docid = Vec::with_capacity(pairs.len());
        for (docno, (url, docid)) in pairs.into_iter().enumerate() {
            let url = url.trim_end_matches('\n').to_string();
            url_to_docid.insert(url.clone(), docid.clone());
            url_to_docno.insert(url.clone(), docno as DocNo);
            docno_to_url.push(url);
            docno_to_docid.push(docid);
        }
        Self {
            url_to_docid,
            url_to_docno,
            docno_to_url,
            docno_to_docid,
        }
    }

    /// Loads a CorpusIndex file: zlib-compressed bytes of a JSON array of
    /// `{url, docid}` pairs in insertion order.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut compressed = Vec::new();
        File::open(path.as_ref())?.read_to_end(&mut compressed)?;
        let mut raw = Vec::new();
        ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut raw)?;
        let pairs: Vec<UrlDocIdPair> = serde_json::from_slice(&raw)
            .map_err(|e| Error::InvariantViolation(format!("corpus index is malformed: {e}")))?;
        Ok(Self::from_pairs(
            pairs.into_iter().map(|p| (p.url, p.docid)).collect(),
        ))
    }

    /// Writes a CorpusIndex file in the format `load` reads. Used by the
    /// `build-index` offline helper.
    pub fn save(path: impl AsRef<Path>, pairs: &[(String, DocId)]) -> Result<()> {
        let records: Vec<UrlDocIdPair> = pairs
            .iter()
            .map(|(url, docid)| UrlDocIdPair {
                url: url.clone(),
                docid: docid.clone(),
            })
            .collect();
        let raw = serde_json::to_vec(&records)
            .map_err(|e| Error::InvariantViolation(format!("cannot serialise pairs: {e}")))?;
        let file = File::create(path.as_ref())?;
        let mut encoder = ZlibEncoder::new(BufWriter::new(file), Compression::default());
        encoder.write_all(&raw)?;
        encoder.finish()?;
        Ok(())
    }

    pub fn url_to_docid(&self, url: &str) -> Option<&DocId> {
        self.url_to_docid.get(url)
    }

    pub fn url_to_docno(&self, url: &str) -> Option<DocNo> {
        self.url_to_docno.get(url).copied()
    }

    pub fn docno_to_url(&self, docno: DocNo) -> Option<&str> {
        self.docno_to_url.get(docno as usize).map(String::as_str)
    }

    pub fn docno_to_docid(&self, docno: DocNo) -> Option<&DocId> {
        self.docno_to_docid.get(docno as usize)
    }

    pub fn len(&self) -> usize {
        self.docno_to_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docno_to_url.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CorpusIndex {
        CorpusIndex::from_pairs(vec![
            ("https://a.example/".into(), "cw-00-00-00000".into()),
            ("https://b.example/".into(), "cw-00-00-00001".into()),
            ("https://c.example/\n".into(), "cw-00-00-00002".into()),
        ])
    }

    #[test]
    fn docno_is_insertion_index() {
        let idx = sample();
        assert_eq!(idx.url_to_docno("https://a.example/"), Some(0));
        assert_eq!(idx.url_to_docno("https://b.example/"), Some(1));
        assert_eq!(idx.url_to_docno("https://c.example/"), Some(2));
        assert_eq!(idx.len(), 3);
    }

    #[test]
    fn trailing_newline_is_trimmed_on_ingest() {
        let idx = sample();
        assert!(idx.url_to_docid("https://c.example/").is_some());
        assert!(idx.url_to_docid("https://c.example/\n").is_none());
    }

    #[test]
    fn missing_keys_return_none() {
        let idx = sample();
        assert!(idx.url_to_docid("https://missing.example/").is_none());
        assert!(idx.url_to_docno("https://missing.example/").is_none());
        assert!(idx.docno_to_url(99).is_none());
    }

    #[test]
    fn bijection_holds_for_every_docno() {
        let idx = sample();
        for docno in 0..idx.len() as DocNo {
            let url = idx.docno_to_url(docno).unwrap();
            let via_url = idx.url_to_docid(url).unwrap();
            let via_docno = idx.docno_to_docid(docno).unwrap();
            assert_eq!(via_url, via_docno);
        }
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.index");
        let pairs = vec![
            ("https://a.example/".into(), "cw-00-00-00000".into()),
            ("https://b.example/".into(), "cw-00-00-00001".into()),
        ];
        CorpusIndex::save(&path, &pairs).unwrap();
        let idx = CorpusIndex::load(&path).unwrap();
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.url_to_docno("https://b.example/"), Some(1));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Builds distinct-url pairs from an arbitrary list of docids, so
    /// `from_pairs`'s url-keyed maps can't collapse entries out from under
    /// the bijection check.
    fn pairs_from_docids(docids: Vec<DocId>) -> Vec<(String, DocId)> {
        docids
            .into_iter()
            .enumerate()
            .map(|(i, docid)| (format!("https://u{i}.example/"), docid))
            .collect()
    }

    proptest! {
        #[test]
        fn bijection_holds_for_arbitrary_pairs(docids in proptest::collection::vec("[a-z0-9-]{1,12}", 0..100)) {
            let pairs = pairs_from_docids(docids);
            let idx = CorpusIndex::from_pairs(pairs.clone());
            prop_assert_eq!(idx.len(), pairs.len());
            for (docno, (url, docid)) in pairs.iter().enumerate() {
                let docno = docno as DocNo;
                prop_assert_eq!(idx.docno_to_url(docno), Some(url.as_str()));
                prop_assert_eq!(idx.docno_to_docid(docno), Some(docid));
                prop_assert_eq!(idx.url_to_docno(url), Some(docno));
                prop_assert_eq!(idx.url_to_docid(url), Some(docid));
            }
        }

        #[test]
        fn save_then_load_round_trips_every_pair(docids in proptest::collection::vec("[a-z0-9-]{1,12}", 0..50)) {
            let pairs = pairs_from_docids(docids);
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("corpus.index");
            CorpusIndex::save(&path, &pairs).unwrap();
            let idx = CorpusIndex::load(&path).unwrap();
            prop_assert_eq!(idx.len(), pairs.len());
            for (docno, (url, docid)) in pairs.iter().enumerate() {
                prop_assert_eq!(idx.docno_to_docid(docno as DocNo), Some(docid));
                prop_assert_eq!(idx.url_to_docno(url), Some(docno as DocNo));
            }
        }
    }
}
