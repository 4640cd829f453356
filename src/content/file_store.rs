//! Directory-backed content store.
//!
//! Each node's content lives in `computer_{id}.txt` inside the store
//! directory. A new node's file is seeded with a one-line banner.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::{ContentError, ContentStore};
use crate::topology::NodeId;

/// Content store keeping one text file per node
#[derive(Debug, Clone)]
pub struct FileContentStore {
    dir: PathBuf,
}

impl FileContentStore {
    /// Use `dir` as the store directory, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the content file for node `id`
    pub fn path_for(&self, id: NodeId) -> PathBuf {
        self.dir.join(format!("computer_{}.txt", id))
    }
}

impl ContentStore for FileContentStore {
    fn create(&mut self, id: NodeId) -> Result<(), ContentError> {
        let path = self.path_for(id);
        fs::write(&path, format!("Computer {} data file\n", id))
            .map_err(|e| ContentError::from_io(id, e))?;
        debug!("Created content file {}", path.display());
        Ok(())
    }

    fn open_for_read(&self, id: NodeId) -> Result<Box<dyn Read>, ContentError> {
        let file = File::open(self.path_for(id)).map_err(|e| ContentError::from_io(id, e))?;
        Ok(Box::new(file))
    }

    fn open_for_append(&mut self, id: NodeId) -> Result<Box<dyn Write + '_>, ContentError> {
        let file = OpenOptions::new()
            .append(true)
            .open(self.path_for(id))
            .map_err(|e| ContentError::from_io(id, e))?;
        Ok(Box::new(file))
    }

    fn remove(&mut self, id: NodeId) -> Result<(), ContentError> {
        let path = self.path_for(id);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed content file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Content file {} was already missing", path.display());
                Ok(())
            }
            Err(e) => Err(ContentError::Io { id, source: e }),
        }
    }

    fn renumber(&mut self, old: NodeId, new: NodeId) -> Result<(), ContentError> {
        let from = self.path_for(old);
        if !from.exists() {
            warn!("No content file for computer {} to renumber", old);
            return Ok(());
        }
        fs::rename(&from, self.path_for(new)).map_err(|e| ContentError::from_io(old, e))?;
        debug!("Renumbered content file {} -> {}", old, new);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_seeds_banner() {
        let dir = TempDir::new().unwrap();
        let mut store = FileContentStore::new(dir.path()).unwrap();
        store.create(3).unwrap();

        let content = fs::read_to_string(dir.path().join("computer_3.txt")).unwrap();
        assert_eq!(content, "Computer 3 data file\n");
    }

    #[test]
    fn test_append_and_read_back() {
        let dir = TempDir::new().unwrap();
        let mut store = FileContentStore::new(dir.path()).unwrap();
        store.create(0).unwrap();
        {
            let mut sink = store.open_for_append(0).unwrap();
            sink.write_all(b"more\n").unwrap();
        }
        assert_eq!(store.read_all(0).unwrap(), b"Computer 0 data file\nmore\n");
    }

    #[test]
    fn test_missing_content_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut store = FileContentStore::new(dir.path()).unwrap();

        assert!(matches!(store.open_for_read(1), Err(ContentError::NotFound { id: 1 })));
        assert!(matches!(store.open_for_append(1), Err(ContentError::NotFound { id: 1 })));
        assert!(!store.path_for(1).exists());
    }

    #[test]
    fn test_remove_and_renumber() {
        let dir = TempDir::new().unwrap();
        let mut store = FileContentStore::new(dir.path()).unwrap();
        for id in 0..3 {
            store.create(id).unwrap();
        }

        store.remove(1).unwrap();
        store.renumber(2, 1).unwrap();

        assert!(!store.path_for(2).exists());
        assert_eq!(store.read_all(1).unwrap(), b"Computer 2 data file\n");
        // removing twice is tolerated
        store.remove(2).unwrap();
    }

    #[test]
    fn test_new_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileContentStore::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested.as_path());
    }
}
