//! In-memory content store.

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read, Write};

use super::{ContentError, ContentStore};
use crate::topology::NodeId;

/// Content store keeping every node's bytes in a map.
///
/// Individual nodes can be marked read-only, which makes
/// `open_for_append` report them as missing.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    contents: HashMap<NodeId, Vec<u8>>,
    read_only: HashSet<NodeId>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the content of `id`
    pub fn insert(&mut self, id: NodeId, content: impl Into<Vec<u8>>) {
        self.contents.insert(id, content.into());
    }

    /// Current content of `id`, if any
    pub fn get(&self, id: NodeId) -> Option<&[u8]> {
        self.contents.get(&id).map(Vec::as_slice)
    }

    /// Refuse (or allow again) appends to `id`
    pub fn set_read_only(&mut self, id: NodeId, read_only: bool) {
        if read_only {
            self.read_only.insert(id);
        } else {
            self.read_only.remove(&id);
        }
    }
}

/// Append sink borrowing one node's buffer
struct MemorySink<'a> {
    buffer: &'a mut Vec<u8>,
}

impl Write for MemorySink<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl ContentStore for MemoryContentStore {
    fn create(&mut self, id: NodeId) -> Result<(), ContentError> {
        self.insert(id, format!("Computer {} data file\n", id));
        Ok(())
    }

    fn open_for_read(&self, id: NodeId) -> Result<Box<dyn Read>, ContentError> {
        let content = self.contents.get(&id).ok_or(ContentError::NotFound { id })?;
        Ok(Box::new(Cursor::new(content.clone())))
    }

    fn open_for_append(&mut self, id: NodeId) -> Result<Box<dyn Write + '_>, ContentError> {
        if self.read_only.contains(&id) {
            return Err(ContentError::NotFound { id });
        }
        let buffer = self.contents.get_mut(&id).ok_or(ContentError::NotFound { id })?;
        Ok(Box::new(MemorySink { buffer }))
    }

    fn remove(&mut self, id: NodeId) -> Result<(), ContentError> {
        self.contents.remove(&id);
        self.read_only.remove(&id);
        Ok(())
    }

    fn renumber(&mut self, old: NodeId, new: NodeId) -> Result<(), ContentError> {
        if let Some(content) = self.contents.remove(&old) {
            self.contents.insert(new, content);
        }
        if self.read_only.remove(&old) {
            self.read_only.insert(new);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_is_a_snapshot() {
        let mut store = MemoryContentStore::new();
        store.insert(0, "abc");
        let mut reader = store.open_for_read(0).unwrap();
        store.open_for_append(0).unwrap().write_all(b"def").unwrap();

        let mut seen = String::new();
        reader.read_to_string(&mut seen).unwrap();
        assert_eq!(seen, "abc");
        assert_eq!(store.get(0), Some(&b"abcdef"[..]));
    }

    #[test]
    fn test_read_only_refuses_append() {
        let mut store = MemoryContentStore::new();
        store.create(1).unwrap();
        store.set_read_only(1, true);
        assert!(matches!(store.open_for_append(1), Err(ContentError::NotFound { id: 1 })));
        store.set_read_only(1, false);
        assert!(store.open_for_append(1).is_ok());
    }

    #[test]
    fn test_renumber_moves_content() {
        let mut store = MemoryContentStore::new();
        store.create(0).unwrap();
        store.create(1).unwrap();
        store.remove(0).unwrap();
        store.renumber(1, 0).unwrap();

        assert_eq!(store.get(0), Some(&b"Computer 1 data file\n"[..]));
        assert_eq!(store.get(1), None);
    }
}
