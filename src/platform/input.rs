//! Thread-safe key state buffer
//!
//! Platform callbacks call `press`/`release` from their own thread. The loop
//! calls `update` once per tick and reads the snapshot, so a key held for
//! less than a tick is still observed exactly once.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    W,
    S,
}

impl Key {
    fn bit(self) -> u8 {
        match self {
            Key::Up => 1,
            Key::Down => 1 << 1,
            Key::W => 1 << 2,
            Key::S => 1 << 3,
        }
    }
}

/// Keys observed during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySnapshot(u8);

impl KeySnapshot {
    pub fn is_down(&self, key: Key) -> bool {
        self.0 & key.bit() != 0
    }
}

#[derive(Debug, Default)]
struct KeyBits {
    /// Currently held
    held: AtomicU8,
    /// Pressed since the last snapshot (catches taps shorter than a tick)
    latched: AtomicU8,
}

/// Cloneable handle onto shared key state
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    bits: Arc<KeyBits>,
    snapshot: KeySnapshot,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, key: Key) {
        self.bits.held.fetch_or(key.bit(), Ordering::AcqRel);
        self.bits.latched.fetch_or(key.bit(), Ordering::AcqRel);
    }

    pub fn release(&self, key: Key) {
        self.bits.held.fetch_and(!key.bit(), Ordering::AcqRel);
    }

    /// Take this tick's snapshot
    pub fn update(&mut self) -> KeySnapshot {
        let latched = self.bits.latched.swap(0, Ordering::AcqRel);
        let held = self.bits.held.load(Ordering::Acquire);
        self.snapshot = KeySnapshot(held | latched);
        self.snapshot
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.snapshot.is_down(key)
    }
}
