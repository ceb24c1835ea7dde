//! Append-only, chunked, checkpointed persistence of the download order.
//! Checkpoint files are written to a temporary sibling path and atomically
//! renamed into place, the same write-then-rename pattern used elsewhere
//! in this codebase for durable cache writes.

use crawlsim_core::{DocNo, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub struct DownloadLog {
    path_prefix: PathBuf,
    save_every_n_pages: u64,
    buffered: Vec<DocNo>,
    persisted: u64,
}

impl DownloadLog {
    pub fn new(path_prefix: impl Into<PathBuf>, save_every_n_pages: u64) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            save_every_n_pages,
            buffered: Vec::new(),
            persisted: 0,
        }
    }

    fn checkpoint_path(path_prefix: &Path, checkpoint_id: u64) -> PathBuf {
        let mut os = path_prefix.as_os_str().to_owned();
        os.push(format!("_{checkpoint_id}"));
        PathBuf::from(os)
    }

    pub fn push(&mut self, docno: DocNo) {
        self.buffered.push(docno);
    }

    pub fn buffered_len(&self) -> usize {
        self.buffered.len()
    }

    pub fn total_len(&self) -> u64 {
        self.persisted + self.buffered.len() as u64
    }

    /// Flushes the in-memory buffer to a numbered checkpoint file, returning
    /// the checkpoint id written. `final_flush` adds 1 to the id, so a run's
    /// terminal, possibly-partial chunk lands on a distinct checkpoint id
    /// from the last complete one.
    pub fn checkpoint(&mut self, final_flush: bool) -> Result<u64> {
        let checkpoint_id =
            self.total_len() / self.save_every_n_pages.max(1) + if final_flush { 1 } else { 0 };
        let dest = Self::checkpoint_path(&self.path_prefix, checkpoint_id);
        let tmp = dest.with_extension("tmp");
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        {
            let file = File::create(&tmp)?;
            let mut w = BufWriter::new(file);
            w.write_all(&(self.buffered.len() as u64).to_le_bytes())?;
            for docno in &self.buffered {
                w.write_all(&docno.to_le_bytes())?;
            }
            w.flush()?;
        }
        std::fs::rename(&tmp, &dest)?;
        self.persisted += self.buffered.len() as u64;
        self.buffered.clear();
        Ok(checkpoint_id)
    }

    /// Reads checkpoint files `<path_prefix>_1`, `_2`, ... in ascending
    /// order, concatenating their contents; stops at the first missing
    /// suffix or once `limit` records have been read, whichever comes
    /// first.
    pub fn load_all(path_prefix: impl AsRef<Path>, limit: Option<u64>) -> Result<Vec<DocNo>> {
        let path_prefix = path_prefix.as_ref();
        let mut out = Vec::new();
        let mut checkpoint_id = 1u64;
        loop {
            if let Some(limit) = limit {
                if out.len() as u64 >= limit {
                    break;
                }
            }
            let path = Self::checkpoint_path(path_prefix, checkpoint_id);
            let file = match File::open(&path) {
                Ok(f) => f,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => break,
                Err(e) => return Err(e.into()),
            };
            let mut r = BufReader::new(file);
            let mut len_bytes = [0u8; 8];
            r.read_exact(&mut len_bytes)?;
            let count = u64::from_le_bytes(len_bytes);
            for _ in 0..count {
                let mut buf = [0u8; 8];
                r.read_exact(&mut buf)?;
                out.push(u64::from_le_bytes(buf));
            }
            checkpoint_id += 1;
        }
        if let Some(limit) = limit {
            out.truncate(limit as usize);
        }
        Ok(out)
    }
}
