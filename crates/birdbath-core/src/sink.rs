//! Output sinks — batched CSV store writer and the immediate failure log.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Buffered CSV writer flushed in batches.
///
/// The header row is written only when the flush that creates the file
/// runs; later flushes append bare rows. Appends are not atomic: a crash
/// mid-flush can leave a partial final row behind, which the simple
/// append strategy accepts rather than papers over.
#[derive(Debug)]
pub struct CsvBatchWriter<T> {
    path: PathBuf,
    buf: Vec<T>,
}

impl<T: Serialize> CsvBatchWriter<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            buf: Vec::new(),
        }
    }

    /// Buffer one row for the next flush.
    pub fn push(&mut self, row: T) {
        self.buf.push(row);
    }

    /// Rows currently buffered
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all buffered rows to the store, returning how many went out.
    ///
    /// The buffer is drained before the write is attempted: a failed
    /// flush loses exactly those rows and the next run re-fetches them.
    /// Callers decide whether to continue (they do).
    pub fn flush(&mut self) -> std::io::Result<usize> {
        if self.buf.is_empty() {
            return Ok(0);
        }
        let rows = std::mem::take(&mut self.buf);
        let n = rows.len();

        let exists = self.path.exists();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(!exists)
            .from_writer(file);
        for row in rows {
            writer.serialize(row).map_err(std::io::Error::other)?;
        }
        writer.flush()?;
        Ok(n)
    }
}

/// Append-only log of permanently failed identifiers, one per line.
///
/// Writes happen immediately, not batched: a failure survives even if the
/// process dies before the next store flush. Duplicate lines across runs
/// are harmless (the ledger reads the file as a set).
#[derive(Debug)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one identifier.
    pub fn record(&self, id: &str) -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize)]
    struct Row {
        id: String,
        text: String,
    }

    fn row(id: &str, text: &str) -> Row {
        Row {
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn flush_empty_buffer_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let mut writer: CsvBatchWriter<Row> = CsvBatchWriter::new(&path);
        assert_eq!(writer.flush().unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn first_flush_writes_header_later_flushes_append_bare_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let mut writer = CsvBatchWriter::new(&path);

        writer.push(row("1", "a"));
        writer.push(row("2", "b"));
        assert_eq!(writer.flush().unwrap(), 2);

        writer.push(row("3", "c"));
        assert_eq!(writer.flush().unwrap(), 1);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["id,text", "1,a", "2,b", "3,c"]);
        // Header exactly once
        assert_eq!(lines.iter().filter(|l| **l == "id,text").count(), 1);
    }

    #[test]
    fn flush_quotes_embedded_commas_and_newlines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let mut writer = CsvBatchWriter::new(&path);
        writer.push(row("1", "hello, \"world\"\nsecond line"));
        writer.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"hello, \"\"world\"\"\nsecond line\""));

        // Round-trips through a reader
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[1], "hello, \"world\"\nsecond line");
    }

    #[test]
    fn failed_flush_still_drains_the_buffer() {
        let dir = TempDir::new().unwrap();
        // Directory as target: open fails
        let mut writer = CsvBatchWriter::new(dir.path());
        writer.push(row("1", "a"));
        assert!(writer.flush().is_err());
        assert!(writer.is_empty());
    }

    #[test]
    fn flush_clears_buffer_on_success() {
        let dir = TempDir::new().unwrap();
        let mut writer = CsvBatchWriter::new(dir.path().join("out.csv"));
        writer.push(row("1", "a"));
        assert_eq!(writer.len(), 1);
        writer.flush().unwrap();
        assert!(writer.is_empty());
    }

    #[test]
    fn failure_log_appends_immediately() {
        let dir = TempDir::new().unwrap();
        let log = FailureLog::new(dir.path().join("failed.txt"));
        log.record("111").unwrap();
        log.record("222").unwrap();
        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content, "111\n222\n");
    }

    #[test]
    fn failure_log_append_preserves_existing_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("failed.txt");
        std::fs::write(&path, "999\n").unwrap();
        FailureLog::new(&path).record("111").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "999\n111\n");
    }
}
