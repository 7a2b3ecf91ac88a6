//! High score persistence
//!
//! A single scalar read once at construction and written back whenever it
//! is beaten. Storage problems never reach the simulation: unreadable values
//! count as zero and failed writes are logged and dropped.

use std::fmt;

use crate::persistence::{KeyValueStore, MemoryStore};

pub struct HighScore {
    store: Box<dyn KeyValueStore>,
    best: u64,
    /// Raised since the last flush
    dirty: bool,
}

impl HighScore {
    /// Storage key for the persisted value
    pub const STORAGE_KEY: &'static str = "galaga_high_score";

    /// Read the stored high score, defaulting to 0 on any problem
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let best = match store.get(Self::STORAGE_KEY) {
            Ok(Some(raw)) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                log::warn!("Ignoring malformed high score {:?}", raw);
                0
            }),
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                0
            }
            Err(e) => {
                log::warn!("High score unavailable: {}", e);
                0
            }
        };
        Self {
            store,
            best,
            dirty: false,
        }
    }

    /// Not persisted anywhere beyond this process
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStore::new()))
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Raise the high score if `score` beats it. Returns true on a new record.
    pub fn submit(&mut self, score: u64) -> bool {
        if score > self.best {
            self.best = score;
            self.dirty = true;
            return true;
        }
        false
    }

    /// Write a pending record to the store
    pub fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        if let Err(e) = self.store.set(Self::STORAGE_KEY, &self.best.to_string()) {
            log::warn!("Failed to save high score {}: {}", self.best, e);
        }
    }
}

impl fmt::Debug for HighScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighScore")
            .field("best", &self.best)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
