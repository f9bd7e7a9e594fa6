//! Background brain saves
//!
//! The loop thread hands over cloned snapshots through a channel of capacity
//! one. A snapshot offered while another is queued is dropped; the next
//! report interval offers a fresher one anyway.

use std::io;
use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};
use std::thread::{Builder, JoinHandle};

use super::BrainStore;
use crate::brain::NeuralNetwork;

pub struct SaveWorker {
    tx: Option<SyncSender<NeuralNetwork>>,
    handle: Option<JoinHandle<()>>,
    name: String,
}

impl SaveWorker {
    /// Start the writer thread for brain `name` in `store`
    pub fn spawn(store: BrainStore, name: impl Into<String>) -> io::Result<Self> {
        let name = name.into();
        let (tx, rx) = sync_channel(1);
        let thread_name = name.clone();
        let handle = Builder::new()
            .name("nong-save".to_string())
            .spawn(move || write_snapshots(store, &thread_name, rx))?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            name,
        })
    }

    /// Queue a snapshot without blocking. Returns false if it was dropped.
    pub fn try_submit(&self, snapshot: NeuralNetwork) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        match tx.try_send(snapshot) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::debug!("Save of {} still pending, skipping snapshot", self.name);
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("Save worker for {} is gone", self.name);
                false
            }
        }
    }

    /// Flush an optional last snapshot and wait for every pending write
    pub fn shutdown(mut self, last: Option<NeuralNetwork>) {
        if let (Some(tx), Some(snapshot)) = (&self.tx, last) {
            // Blocks only while one earlier snapshot is still queued
            if tx.send(snapshot).is_err() {
                log::warn!("Save worker for {} exited before the final save", self.name);
            }
        }
        self.join();
    }

    fn join(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Save worker for {} panicked", self.name);
            }
        }
    }
}

impl Drop for SaveWorker {
    fn drop(&mut self) {
        self.join();
    }
}

fn write_snapshots(store: BrainStore, name: &str, rx: Receiver<NeuralNetwork>) {
    for snapshot in rx {
        match store.save(&snapshot, name) {
            Ok(()) => log::debug!("Brain saved to {}", store.path_for(name).display()),
            Err(e) => log::warn!("Failed to save brain {}: {}", name, e),
        }
    }
}
