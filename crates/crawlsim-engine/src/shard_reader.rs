//! Random-access reader for per-document JSON records stored in gzip shards,
//! addressed through fixed-width offset sidecar files.

use crawlsim_core::{DocId, Error, Result};
use flate2::read::GzDecoder;
use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Width in bytes of one offset record: 10 decimal digits + `\n`.
const OFFSET_RECORD_LEN: u64 = 11;

/// How many shard/offset file handles to keep open at once.
const HANDLE_CACHE_CAPACITY: usize = 64;

struct Decomposed {
    subdir: String,
    file_seq: String,
    doc_seq: u64,
}

/// Splits a DocId of the form `"<prefix>-<subdir>-<file_seq>-<doc_seq>"`
/// into its shard-addressing components.
fn decompose(docid: &DocId) -> Option<Decomposed> {
    let parts: Vec<&str> = docid.split('-').collect();
    if parts.len() != 4 {
        return None;
    }
    let doc_seq = parts[3].parse::<u64>().ok()?;
    Some(Decomposed {
        subdir: parts[1].to_string(),
        file_seq: parts[2].to_string(),
        doc_seq,
    })
}

/// A tiny least-recently-used file handle cache, bounded at
/// `HANDLE_CACHE_CAPACITY` entries.
#[derive(Default)]
struct HandleCache {
    order: VecDeque<PathBuf>,
    handles: HashMap<PathBuf, File>,
}

impl HandleCache {
    fn get_or_open(&mut self, path: &Path) -> std::io::Result<&mut File> {
        if !self.handles.contains_key(path) {
            let file = File::open(path)?;
            if self.order.len() >= HANDLE_CACHE_CAPACITY {
                if let Some(evicted) = self.order.pop_front() {
                    self.handles.remove(&evicted);
                }
            }
            self.order.push_back(path.to_path_buf());
            self.handles.insert(path.to_path_buf(), file);
        } else {
            self.order.retain(|p| p != path);
            self.order.push_back(path.to_path_buf());
        }
        Ok(self.handles.get_mut(path).expect("just inserted"))
    }
}

pub struct ShardReader {
    dir: PathBuf,
    handles: HandleCache,
}

impl ShardReader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            handles: HandleCache::default(),
        }
    }

    fn shard_paths(&self, subdir: &str, file_seq: &str) -> (PathBuf, PathBuf) {
        let base = self.dir.join(subdir);
        (
            base.join(format!("{subdir}-{file_seq}.json.gz")),
            base.join(format!("{subdir}-{file_seq}.offset")),
        )
    }

    /// Reads the byte offset stored at `record_idx` in `offset_path`, or
    /// `None` if the record doesn't fully exist (short/empty read, meaning
    /// "read to EOF").
    fn read_offset(&mut self, offset_path: &Path, record_idx: u64) -> Result<Option<u64>> {
        let file = match self.handles.get_or_open(offset_path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        file.seek(SeekFrom::Start(record_idx * OFFSET_RECORD_LEN))?;
        let mut buf = [0u8; OFFSET_RECORD_LEN as usize];
        let mut read_total = 0usize;
        loop {
            match file.read(&mut buf[read_total..])? {
                0 => break,
                n => {
                    read_total += n;
                    if read_total == buf.len() {
                        break;
                    }
                }
            }
        }
        if read_total < 10 {
            return Ok(None);
        }
        let digits = std::str::from_utf8(&buf[..10])
            .map_err(|e| Error::InvariantViolation(format!("offset record not utf-8: {e}")))?;
        let offset = digits
            .parse::<u64>()
            .map_err(|e| Error::InvariantViolation(format!("offset record not decimal: {e}")))?;
        Ok(Some(offset))
    }

    /// Reads, decompresses and parses the JSON record for `docid`. Returns
    /// `Ok(None)` for a missing shard/offset file or malformed JSON; I/O
    /// errors propagate.
    pub fn read(&mut self, docid: &DocId) -> Result<Option<serde_json::Value>> {
        let Some(parts) = decompose(docid) else {
            return Ok(None);
        };
        let (shard_path, offset_path) = self.shard_paths(&parts.subdir, &parts.file_seq);

        let start = match self.read_offset(&offset_path, parts.doc_seq)? {
            Some(s) => s,
            None => return Ok(None),
        };
        let end = self.read_offset(&offset_path, parts.doc_seq + 1)?;

        let file = match self.handles.get_or_open(&shard_path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        file.seek(SeekFrom::Start(start))?;
        let mut raw = Vec::new();
        match end {
            Some(end) if end > start => {
                let mut limited = file.take(end - start);
                limited.read_to_end(&mut raw)?;
            }
            _ => {
                file.read_to_end(&mut raw)?;
            }
        }

        let mut decompressed = Vec::new();
        if GzDecoder::new(raw.as_slice())
            .read_to_end(&mut decompressed)
            .is_err()
        {
            return Ok(None);
        }
        match serde_json::from_slice(&decompressed) {
            Ok(v) => Ok(Some(v)),
            Err(_) => Ok(None),
        }
    }
}
