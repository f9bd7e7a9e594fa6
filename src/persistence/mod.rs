//! Brain files on disk
//!
//! Each brain lives at `<dir>/<name>.brain` in the binary format from
//! `brain::codec`. Writes go to a sibling `.tmp` file that is synced and then
//! renamed over the target, so a crash mid-save never leaves a torn file.

pub mod worker;

pub use worker::SaveWorker;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::brain::{self, NeuralNetwork};
use crate::error::BrainError;

/// File extension for persisted brains
pub const BRAIN_EXTENSION: &str = "brain";

/// Directory of named brain files
#[derive(Debug, Clone)]
pub struct BrainStore {
    dir: PathBuf,
}

impl BrainStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{BRAIN_EXTENSION}"))
    }

    fn temp_path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{BRAIN_EXTENSION}.tmp"))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// Read and decode a brain
    pub fn load(&self, name: &str) -> Result<NeuralNetwork, BrainError> {
        let bytes = self.read(name)?;
        brain::deserialize(&bytes)
    }

    /// Read a brain that must have exactly `topology`
    pub fn load_expecting(
        &self,
        name: &str,
        topology: &[usize],
    ) -> Result<NeuralNetwork, BrainError> {
        let bytes = self.read(name)?;
        brain::deserialize_expecting(&bytes, topology)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, BrainError> {
        let path = self.path_for(name);
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => BrainError::NotFound(path),
            _ => BrainError::Io(e),
        })
    }

    /// Atomically replace `<name>.brain` with `network`
    pub fn save(&self, network: &NeuralNetwork, name: &str) -> Result<(), BrainError> {
        fs::create_dir_all(&self.dir)?;
        let bytes = network.serialize();
        let tmp = self.temp_path_for(name);
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        let path = self.path_for(name);
        if let Err(e) = fs::rename(&tmp, &path) {
            fs::remove_file(&tmp).ok();
            return Err(e.into());
        }
        log::debug!("Saved brain ({} bytes) to {}", bytes.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    /// Unique scratch directory under the system temp dir
    pub fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("nong-{tag}-{}-{nanos}", std::process::id()))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::scratch_dir;
    use super::*;

    #[test]
    fn test_missing_brain_is_not_found() {
        let store = BrainStore::new(scratch_dir("missing"));
        assert!(!store.exists("brain"));
        match store.load("brain") {
            Err(BrainError::NotFound(path)) => assert_eq!(path, store.path_for("brain")),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_save_then_load_returns_same_network() {
        let dir = scratch_dir("save");
        let store = BrainStore::new(&dir);
        let network = NeuralNetwork::new(&[5, 6, 3], 11).unwrap();

        store.save(&network, "brain").unwrap();
        assert!(store.exists("brain"));
        assert!(!dir.join("brain.brain.tmp").exists());

        let loaded = store.load_expecting("brain", &[5, 6, 3]).unwrap();
        fs::remove_dir_all(&dir).ok();
        assert_eq!(loaded, network);
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = scratch_dir("replace");
        let store = BrainStore::new(&dir);
        let first = NeuralNetwork::new(&[5, 6, 3], 1).unwrap();
        let second = NeuralNetwork::new(&[5, 6, 3], 2).unwrap();

        store.save(&first, "brain").unwrap();
        store.save(&second, "brain").unwrap();

        let loaded = store.load("brain").unwrap();
        fs::remove_dir_all(&dir).ok();
        assert_eq!(loaded, second);
    }

    #[test]
    fn test_garbage_file_is_corrupt() {
        let dir = scratch_dir("garbage");
        let store = BrainStore::new(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(store.path_for("brain"), b"not a brain").unwrap();

        let result = store.load("brain");
        fs::remove_dir_all(&dir).ok();
        assert!(matches!(result, Err(BrainError::CorruptBrain(_))));
    }

    #[test]
    fn test_wrong_topology_is_rejected() {
        let dir = scratch_dir("topology");
        let store = BrainStore::new(&dir);
        store
            .save(&NeuralNetwork::new(&[5, 4, 3], 3).unwrap(), "brain")
            .unwrap();

        let result = store.load_expecting("brain", &[5, 6, 3]);
        fs::remove_dir_all(&dir).ok();
        assert!(result.is_err());
    }
}
