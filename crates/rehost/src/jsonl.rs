//! JSONL record files.
//!
//! Blank lines carry no record. Everything that counts positions (resume,
//! limits, progress) counts records, so input and output stay in 1:1
//! correspondence even when the input has blank lines.

use rehost_core::Record;
use rehost_error::{IoError, RehostResult};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Lines};
use tracing::warn;

/// Sequential reader over the records of a JSONL file.
#[derive(Debug)]
pub struct RecordReader {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
    line_number: usize,
}

impl RecordReader {
    /// Open `path` for reading.
    pub async fn open(path: &Path) -> RehostResult<Self> {
        let file = File::open(path).await.map_err(|e| io_error(path, e))?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            path: path.to_path_buf(),
            line_number: 0,
        })
    }

    /// 1-based number of the last line read.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Next non-blank line, unparsed.
    async fn next_line(&mut self) -> RehostResult<Option<String>> {
        loop {
            let line = self
                .lines
                .next_line()
                .await
                .map_err(|e| io_error(&self.path, e))?;
            match line {
                Some(line) => {
                    self.line_number += 1;
                    if !line.trim().is_empty() {
                        return Ok(Some(line));
                    }
                }
                None => return Ok(None),
            }
        }
    }

    /// Next record, or `None` at end of file.
    ///
    /// # Errors
    ///
    /// A line that is not a JSON object fails with a JSON error naming its
    /// line number.
    pub async fn next_record(&mut self) -> RehostResult<Option<Record>> {
        match self.next_line().await? {
            Some(line) => Record::from_line(&line, self.line_number).map(Some),
            None => Ok(None),
        }
    }

    /// Skip up to `count` records without parsing them. Returns how many
    /// were actually skipped.
    pub async fn skip_records(&mut self, count: usize) -> RehostResult<usize> {
        let mut skipped = 0;
        while skipped < count && self.next_line().await?.is_some() {
            skipped += 1;
        }
        Ok(skipped)
    }
}

/// Append-only writer producing one record per line.
#[derive(Debug)]
pub struct RecordWriter {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl RecordWriter {
    /// Create `path`, truncating any existing content.
    pub async fn create(path: &Path) -> RehostResult<Self> {
        let file = File::create(path).await.map_err(|e| io_error(path, e))?;
        Ok(Self::wrap(file, path))
    }

    /// Open `path` for appending, creating it if absent.
    pub async fn append(path: &Path) -> RehostResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| io_error(path, e))?;
        Ok(Self::wrap(file, path))
    }

    fn wrap(file: File, path: &Path) -> Self {
        Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
        }
    }

    /// Write one record and flush it, so an interrupted run leaves only
    /// whole lines behind.
    pub async fn write(&mut self, record: &Record) -> RehostResult<()> {
        let mut line = record.to_line()?;
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| io_error(&self.path, e))?;
        self.writer
            .flush()
            .await
            .map_err(|e| io_error(&self.path, e))?;
        Ok(())
    }
}

/// Prepare `path` for a resumed run and return how many records it holds.
///
/// Only newline-terminated lines count. A trailing fragment left by an
/// interrupted write is cut off, so appending resumes on a line boundary.
/// A missing file holds zero records.
pub async fn truncate_to_complete_records(path: &Path) -> RehostResult<usize> {
    if !tokio::fs::try_exists(path)
        .await
        .map_err(|e| io_error(path, e))?
    {
        return Ok(0);
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| io_error(path, e))?;
    let complete = bytes
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |idx| idx + 1);

    if complete < bytes.len() {
        warn!(
            path = %path.display(),
            dropped_bytes = bytes.len() - complete,
            "Discarding partial record at end of output"
        );
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .await
            .map_err(|e| io_error(path, e))?;
        file.set_len(complete as u64)
            .await
            .map_err(|e| io_error(path, e))?;
    }

    Ok(bytes[..complete]
        .split(|&b| b == b'\n')
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .count())
}

#[track_caller]
fn io_error(path: &Path, e: std::io::Error) -> IoError {
    IoError::new(format!("{}: {}", path.display(), e))
}
