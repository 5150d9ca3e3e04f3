#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Append-only difficulty time series and its durable export.

mod sink;

use heist_dda_core::{DdaSample, DifficultyLevel};

pub use sink::{
    render_csv, CsvFolderSink, LogConfig, MemorySink, PersistError, PersistedRecord, SampleSink,
    CSV_HEADER,
};

/// Ordered difficulty samples recorded during one playthrough.
#[derive(Clone, Debug, Default)]
pub struct DdaLog {
    samples: Vec<DdaSample>,
}

impl DdaLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sample.
    ///
    /// Samples are never dropped. A timestamp earlier than the previous one is
    /// clamped forward so the sequence stays non-decreasing.
    pub fn record(&mut self, timestamp: f32, difficulty: DifficultyLevel) {
        let floor = self.samples.last().map_or(0.0, |last| last.timestamp);
        let timestamp = if timestamp >= floor {
            timestamp
        } else {
            log::warn!("dda sample at t={timestamp} precedes t={floor}; clamping");
            floor
        };
        self.samples.push(DdaSample::new(timestamp, difficulty));
    }

    /// Recorded samples in insertion order.
    #[must_use]
    pub fn samples(&self) -> &[DdaSample] {
        &self.samples
    }

    /// Number of recorded samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Reports whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Writes the full sequence to `sink`.
    ///
    /// The log itself is left untouched, so repeated flushes each produce a
    /// complete record.
    pub fn flush(&self, sink: &mut dyn SampleSink) -> Result<PersistedRecord, PersistError> {
        let record = sink.persist(&self.samples)?;
        log::info!(
            "flushed {} dda samples to {}",
            record.samples,
            record.location
        );
        Ok(record)
    }

    /// Discards every sample so a new playthrough starts empty.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
