//! Loop counters shared with other threads

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::sim::Score;

#[derive(Debug, Default)]
struct Counters {
    fps: AtomicU32,
    ups: AtomicU32,
    total_updates: AtomicU64,
    total_frames: AtomicU64,
    hits: AtomicU32,
    misses: AtomicU32,
    best_rally: AtomicU32,
}

/// Written by the loop thread, readable from anywhere without locking
#[derive(Debug, Clone, Default)]
pub struct LoopStats {
    inner: Arc<Counters>,
}

/// Point-in-time copy of `LoopStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStatsSnapshot {
    /// Frames drawn in the last report window
    pub fps: u32,
    /// Ticks run in the last report window
    pub ups: u32,
    pub total_updates: u64,
    pub total_frames: u64,
    pub hits: u32,
    pub misses: u32,
    pub best_rally: u32,
}

impl LoopStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, updates: u32, rendered: bool, score: &Score) {
        let c = &self.inner;
        c.total_updates
            .fetch_add(u64::from(updates), Ordering::Relaxed);
        if rendered {
            c.total_frames.fetch_add(1, Ordering::Relaxed);
        }
        c.hits.store(score.hits, Ordering::Relaxed);
        c.misses.store(score.misses, Ordering::Relaxed);
        c.best_rally.store(score.best_rally, Ordering::Relaxed);
    }

    pub(crate) fn publish_rates(&self, fps: u32, ups: u32) {
        self.inner.fps.store(fps, Ordering::Relaxed);
        self.inner.ups.store(ups, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LoopStatsSnapshot {
        let c = &self.inner;
        LoopStatsSnapshot {
            fps: c.fps.load(Ordering::Relaxed),
            ups: c.ups.load(Ordering::Relaxed),
            total_updates: c.total_updates.load(Ordering::Relaxed),
            total_frames: c.total_frames.load(Ordering::Relaxed),
            hits: c.hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            best_rally: c.best_rally.load(Ordering::Relaxed),
        }
    }
}
