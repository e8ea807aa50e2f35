//! Trailing debounce for store writes
//!
//! The core never sleeps: the host pumps [`PageManager::tick`] from its own
//! timer and the manager flushes synchronously before any navigation. Each
//! armed deadline carries the generation of the operation epoch it was
//! armed in; a deadline from an older epoch never fires, so a stale timer
//! cannot overwrite content written by a newer operation.
//!
//! [`PageManager::tick`]: crate::manager::PageManager::tick

/// Trailing-edge debounce state
#[derive(Debug, Default)]
pub struct Debounce {
    deadline_ms: Option<u64>,
    armed_generation: u64,
}

impl Debounce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the trailing deadline for the given epoch
    pub fn arm(&mut self, now_ms: u64, interval_ms: u64, generation: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(interval_ms));
        self.armed_generation = generation;
    }

    /// True when an armed deadline from the current epoch has passed
    pub fn due(&self, now_ms: u64, generation: u64) -> bool {
        self.armed_generation == generation
            && self.deadline_ms.is_some_and(|deadline| now_ms >= deadline)
    }

    /// Whether a write is pending
    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Disarm without firing
    pub fn clear(&mut self) {
        self.deadline_ms = None;
    }
}
