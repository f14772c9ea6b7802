//! Trajectory logging and reading.
//!
//! `TrajectoryLogger` writes one JSON line per record immediately for crash
//! resilience; `TrajectoryReader` loads a log back for summarizing and
//! analysis.

use rlm_proto::{IterationRecord, RunMetadata, TrajectoryRecord};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Records trajectory events to a JSONL output.
///
/// The logger is thread-safe and writes each record as a JSON line
/// immediately. Write errors are swallowed: logging must never interrupt
/// a run.
///
/// # Example
///
/// ```
/// use rlm_core::TrajectoryLogger;
/// use rlm_proto::{IterationRecord, TrajectoryRecord};
///
/// let mut output = Vec::new();
/// {
///     let logger = TrajectoryLogger::new(&mut output);
///     logger.record(&TrajectoryRecord::Iteration(IterationRecord::new(1, vec![], None)));
/// }
/// let text = String::from_utf8_lossy(&output);
/// assert!(text.contains(r#""type":"iteration""#));
/// ```
pub struct TrajectoryLogger<W> {
    writer: Mutex<W>,
}

impl<W: Write> TrajectoryLogger<W> {
    /// Creates a logger writing to the given output.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Writes one record as a JSON line.
    pub fn record(&self, record: &TrajectoryRecord) {
        if let Ok(mut writer) = self.writer.lock() {
            // Ignore write errors - recording should not interrupt execution
            if let Ok(json) = serde_json::to_string(record) {
                let _ = writeln!(writer, "{}", json);
            }
        }
    }

    /// Flushes the underlying writer.
    pub fn flush(&self) -> io::Result<()> {
        self.writer
            .lock()
            .map_err(|_| io::Error::other("failed to acquire writer lock"))?
            .flush()
    }
}

impl TrajectoryLogger<File> {
    /// Creates a logger writing to `dir/stem_<unix_ms>.jsonl`, creating
    /// the directory if needed. Returns the logger and the log path.
    pub fn create(dir: impl AsRef<Path>, stem: &str) -> io::Result<(Self, PathBuf)> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let path = dir.join(format!("{stem}_{ts}.jsonl"));
        let file = File::create(&path)?;

        Ok((Self::new(file), path))
    }
}

impl<W: Write + Send + 'static> TrajectoryLogger<W> {
    /// Creates an observer closure suitable for `Session::add_observer`.
    pub fn make_observer(logger: Arc<Self>) -> impl Fn(&TrajectoryRecord) + Send + 'static {
        move |record| {
            logger.record(record);
        }
    }
}

/// Reads a trajectory log back into typed records.
///
/// Blank lines are skipped; a malformed JSON line fails the whole load
/// with [`io::ErrorKind::InvalidData`].
#[derive(Debug)]
pub struct TrajectoryReader {
    records: Vec<TrajectoryRecord>,
}

impl TrajectoryReader {
    /// Loads records from a JSONL reader.
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let record: TrajectoryRecord = serde_json::from_str(&line).map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("invalid JSON record: {}", e),
                )
            })?;
            records.push(record);
        }

        Ok(Self { records })
    }

    /// Loads records from a JSONL file.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Loads records from raw JSONL bytes.
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        Self::from_reader(BufReader::new(bytes))
    }

    /// Returns all records in file order.
    pub fn records(&self) -> &[TrajectoryRecord] {
        &self.records
    }

    /// Returns the total number of records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Returns the first metadata record, if any.
    pub fn metadata(&self) -> Option<&RunMetadata> {
        self.records.iter().find_map(|record| match record {
            TrajectoryRecord::Metadata(meta) => Some(meta),
            TrajectoryRecord::Iteration(_) => None,
        })
    }

    /// Returns all iteration records in file order.
    pub fn iterations(&self) -> Vec<&IterationRecord> {
        self.records
            .iter()
            .filter_map(|record| match record {
                TrajectoryRecord::Iteration(iteration) => Some(iteration),
                TrajectoryRecord::Metadata(_) => None,
            })
            .collect()
    }

    /// Returns the number of iteration records.
    pub fn iteration_count(&self) -> usize {
        self.iterations().len()
    }
}
