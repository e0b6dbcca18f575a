//! Local, append-only log file kept next to the benchmark for offline audit.
//!
//! Every telemetry string the session emits is also written here, whether or
//! not the collector ever receives it.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local, Timelike};
use thiserror::Error;

/// Attempts at finding a free file name before giving up.
const MAX_NAME_ATTEMPTS: usize = 100;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create log file {path}: {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Host identity used in log file names.
pub fn host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// `<YYYY_MM_DD_HH_MM_SS>_<benchmark>_ECC_<ecc>_<host>`, without extension.
pub fn log_file_stem(date: &DateTime<Local>, benchmark_name: &str, ecc: &str, host: &str) -> String {
    format!(
        "{}_{}_ECC_{}_{}",
        date.format("%Y_%m_%d_%H_%M_%S"),
        sanitize(benchmark_name),
        sanitize(ecc),
        sanitize(host)
    )
}

/// Keep file names on one path component.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c == '/' || c == '\\' || c.is_whitespace() { '_' } else { c })
        .collect()
}

pub fn begin_line(date: &DateTime<Local>) -> String {
    format!(
        "#BEGIN Y:{} M:{} D:{} Time:{}:{}:{}-{}",
        date.year(),
        date.month(),
        date.day(),
        date.hour(),
        date.minute(),
        date.second(),
        date.timestamp_subsec_micros()
    )
}

/// Append-only text sink backed by a uniquely named file.
pub struct LocalLogSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl LocalLogSink {
    /// Create a new log file under `dir`.
    ///
    /// The name is collision-checked with `create_new`; a taken name gets a
    /// numeric suffix.
    pub fn create(dir: &Path, stem: &str) -> Result<Self, SinkError> {
        std::fs::create_dir_all(dir).map_err(|source| SinkError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut attempt = 0;
        loop {
            let name = if attempt == 0 {
                format!("{}.log", stem)
            } else {
                format!("{}_{}.log", stem, attempt)
            };
            let path = dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    tracing::debug!(path = %path.display(), "local log created");
                    return Ok(Self {
                        path,
                        writer: BufWriter::new(file),
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt + 1 < MAX_NAME_ATTEMPTS => {
                    attempt += 1;
                }
                Err(source) => return Err(SinkError::CreateFile { path, source }),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line. Failures are logged, never returned.
    pub fn append(&mut self, line: &str) {
        if let Err(e) = writeln!(self.writer, "{}", line) {
            tracing::warn!(path = %self.path.display(), error = %e, "local log write failed");
        }
    }

    pub fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(path = %self.path.display(), error = %e, "local log flush failed");
        }
    }
}

impl Drop for LocalLogSink {
    fn drop(&mut self) {
        self.flush();
    }
}
