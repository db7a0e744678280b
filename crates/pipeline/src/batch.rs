//! Batch planning for job runs.

use std::time::Duration;

/// Default number of records per batch.
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Default pause between batches.
pub const DEFAULT_BATCH_PAUSE: Duration = Duration::from_millis(2000);

/// How a job splits its records and how long it rests between batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    size: usize,
    pause: Duration,
}

impl BatchPlan {
    /// A zero size is bumped to 1 so a plan always makes progress.
    pub fn new(size: usize, pause: Duration) -> Self {
        Self {
            size: size.max(1),
            pause,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn pause(&self) -> Duration {
        self.pause
    }

    pub fn batches<'a, T>(&self, items: &'a [T]) -> std::slice::Chunks<'a, T> {
        items.chunks(self.size)
    }

    pub fn batch_count(&self, items: usize) -> usize {
        items.div_ceil(self.size)
    }
}

impl Default for BatchPlan {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, DEFAULT_BATCH_PAUSE)
    }
}
