//! Minimal TREC run format writer: hands a crawl's download order to an
//! external evaluation tool without a second implementation effort.

use crawlsim_core::{DocNo, Result};
use std::io::Write;

/// Writes one TREC run line per docno: `qid Q0 docno rank score run_name`.
/// `docnos` is assumed to already be in descending-preference order (the
/// DownloadLog's download order); rank starts at 1 and score is a simple
/// descending value derived from rank so relative order is preserved.
pub fn write_trec_run(
    mut out: impl Write,
    query_id: &str,
    run_name: &str,
    docnos: &[DocNo],
) -> Result<()> {
    for (i, docno) in docnos.iter().enumerate() {
        let rank = i + 1;
        let score = docnos.len() - i;
        writeln!(out, "{query_id} Q0 {docno} {rank} {score} {run_name}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_one_line_per_docno_with_descending_score() {
        let mut buf = Vec::new();
        write_trec_run(&mut buf, "q1", "crawlsim-bfs", &[10, 20, 30]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "q1 Q0 10 1 3 crawlsim-bfs");
        assert_eq!(lines[1], "q1 Q0 20 2 2 crawlsim-bfs");
        assert_eq!(lines[2], "q1 Q0 30 3 1 crawlsim-bfs");
    }

    #[test]
    fn empty_docnos_produces_empty_output() {
        let mut buf = Vec::new();
        write_trec_run(&mut buf, "q1", "run", &[]).unwrap();
        assert!(buf.is_empty());
    }
}
