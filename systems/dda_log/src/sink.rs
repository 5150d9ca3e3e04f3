use std::{
    fmt::Write as _,
    fs::{self, OpenOptions},
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use heist_dda_core::DdaSample;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header row written at the top of every exported log.
pub const CSV_HEADER: &str = "Time;Difficulty";

const MAX_FILE_INDEX: u32 = 10_000;

/// Where exported difficulty logs are written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Folder name, resolved next to the application data directory.
    pub folder: String,
    /// Stem of exported files; `_<N>.csv` is appended.
    pub file_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            folder: "DdaLogs".to_owned(),
            file_name: "DdaValues".to_owned(),
        }
    }
}

impl LogConfig {
    /// Resolves the log folder as a sibling of `data_dir`.
    #[must_use]
    pub fn resolve_folder(&self, data_dir: &Path) -> PathBuf {
        match data_dir.parent() {
            Some(parent) => parent.join(&self.folder),
            None => PathBuf::from(&self.folder),
        }
    }

    /// Builds the CSV sink described by this configuration.
    #[must_use]
    pub fn sink(&self, data_dir: &Path) -> CsvFolderSink {
        CsvFolderSink::new(self.resolve_folder(data_dir), self.file_name.clone())
    }
}

/// Failures while persisting a difficulty log.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The log folder could not be created.
    #[error("could not create log folder {}", .path.display())]
    CreateFolder {
        /// Folder that could not be created.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A log file could not be written.
    #[error("could not write log file {}", .path.display())]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Every candidate file name is already taken.
    #[error("no free log file name for {} in {}", .file_name, .folder.display())]
    NamesExhausted {
        /// Folder that was searched.
        folder: PathBuf,
        /// Stem that was used.
        file_name: String,
    },
}

/// Description of a persisted log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistedRecord {
    /// Human-readable location of the record.
    pub location: String,
    /// Number of samples written.
    pub samples: usize,
}

/// Durable destination for a playthrough's difficulty samples.
pub trait SampleSink {
    /// Persists the complete ordered sequence as a new record.
    fn persist(&mut self, samples: &[DdaSample]) -> Result<PersistedRecord, PersistError>;
}

/// Renders samples as `;`-separated text with two decimals per field.
#[must_use]
pub fn render_csv(samples: &[DdaSample]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + samples.len() * 12);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for sample in samples {
        let _ = writeln!(
            out,
            "{:.2};{:.2}",
            sample.timestamp,
            sample.difficulty.get() as f32
        );
    }
    out
}

/// Writes each flush to `<folder>/<file_name>_<N>.csv`, never overwriting.
#[derive(Clone, Debug)]
pub struct CsvFolderSink {
    folder: PathBuf,
    file_name: String,
}

impl CsvFolderSink {
    /// Creates a sink writing into `folder`.
    #[must_use]
    pub fn new(folder: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            file_name: file_name.into(),
        }
    }

    /// Folder receiving exported files.
    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn candidate(&self, index: u32) -> PathBuf {
        self.folder.join(format!("{}_{index}.csv", self.file_name))
    }
}

impl SampleSink for CsvFolderSink {
    fn persist(&mut self, samples: &[DdaSample]) -> Result<PersistedRecord, PersistError> {
        fs::create_dir_all(&self.folder).map_err(|source| PersistError::CreateFolder {
            path: self.folder.clone(),
            source,
        })?;

        let contents = render_csv(samples);
        for index in 0..MAX_FILE_INDEX {
            let path = self.candidate(index);
            // `create_new` refuses existing files.
            let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(error) if error.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(PersistError::Write { path, source }),
            };
            write_record(file, &path, contents.as_bytes())?;

            return Ok(PersistedRecord {
                location: path.display().to_string(),
                samples: samples.len(),
            });
        }

        Err(PersistError::NamesExhausted {
            folder: self.folder.clone(),
            file_name: self.file_name.clone(),
        })
    }
}

/// Writes `contents` to the freshly created `path`, removing the file again on failure.
fn write_record(mut file: impl io::Write, path: &Path, contents: &[u8]) -> Result<(), PersistError> {
    let Err(source) = file.write_all(contents).and_then(|()| file.flush()) else {
        return Ok(());
    };
    drop(file);
    if let Err(error) = fs::remove_file(path) {
        log::warn!("could not remove partial log {}: {error}", path.display());
    }
    Err(PersistError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Keeps flushed records in memory; used for dry runs and tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    records: Vec<Vec<DdaSample>>,
}

impl MemorySink {
    /// Records persisted so far, oldest first.
    #[must_use]
    pub fn records(&self) -> &[Vec<DdaSample>] {
        &self.records
    }
}

impl SampleSink for MemorySink {
    fn persist(&mut self, samples: &[DdaSample]) -> Result<PersistedRecord, PersistError> {
        self.records.push(samples.to_vec());
        Ok(PersistedRecord {
            location: format!("memory #{}", self.records.len() - 1),
            samples: samples.len(),
        })
    }
}
