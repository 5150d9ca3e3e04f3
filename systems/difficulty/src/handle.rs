use std::sync::{
    atomic::{AtomicI32, Ordering},
    Arc,
};

use heist_dda_core::DifficultyLevel;

/// Write side of the published difficulty value.
///
/// Exactly one handle exists per tracker. Readers only ever observe whole
/// values stored by [`DifficultyHandle::publish`].
#[derive(Debug)]
pub(crate) struct DifficultyHandle {
    cell: Arc<AtomicI32>,
}

impl DifficultyHandle {
    pub(crate) fn new(level: DifficultyLevel) -> Self {
        Self {
            cell: Arc::new(AtomicI32::new(level.get())),
        }
    }

    pub(crate) fn publish(&self, level: DifficultyLevel) {
        self.cell.store(level.get(), Ordering::Release);
    }

    pub(crate) fn reader(&self) -> DifficultyReader {
        DifficultyReader {
            cell: Arc::clone(&self.cell),
        }
    }
}

/// Read-only view of the published difficulty, safe to share across planning workers.
#[derive(Clone, Debug)]
pub struct DifficultyReader {
    cell: Arc<AtomicI32>,
}

impl DifficultyReader {
    /// Returns the value published by the most recent completed recompute.
    #[must_use]
    pub fn get(&self) -> DifficultyLevel {
        DifficultyLevel::new(self.cell.load(Ordering::Acquire))
    }
}
