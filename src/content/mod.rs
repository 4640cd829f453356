//! Per-node content storage.
//!
//! Every node owns a byte sequence (the simulated computer's data file).
//! The transfer engine reads the source node's content as a sequence of
//! packets and appends them to the destination node's content. The network
//! facade keeps the store's keys in sync with node renumbering through
//! `remove` and `renumber`.
//!
//! Two implementations are provided:
//!
//! - `FileContentStore`: one `computer_{id}.txt` file per node in a directory
//! - `MemoryContentStore`: in-process buffers, handy for tests and embedding

pub mod chunks;
pub mod file_store;
pub mod memory_store;

use std::io::{Read, Write};

use crate::topology::NodeId;

pub use chunks::{ChunkReader, DEFAULT_PACKET_SIZE};
pub use file_store::FileContentStore;
pub use memory_store::MemoryContentStore;

/// Errors that can occur while accessing node content
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Content for computer {id} not found")]
    NotFound { id: NodeId },

    #[error("I/O error on content of computer {id}: {source}")]
    Io {
        id: NodeId,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    /// Map an I/O error for node `id`, folding "not found" into `NotFound`
    pub fn from_io(id: NodeId, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            ContentError::NotFound { id }
        } else {
            ContentError::Io { id, source }
        }
    }
}

/// Byte-content repository keyed by node id
pub trait ContentStore {
    /// Initialise the content of a freshly added node
    fn create(&mut self, id: NodeId) -> Result<(), ContentError>;

    /// Open the content of `id` for sequential reading.
    ///
    /// The returned reader does not borrow the store, so a sink can be opened
    /// while it is alive.
    fn open_for_read(&self, id: NodeId) -> Result<Box<dyn Read>, ContentError>;

    /// Open an append-only sink on the content of `id`
    fn open_for_append(&mut self, id: NodeId) -> Result<Box<dyn Write + '_>, ContentError>;

    /// Delete the content of `id`. Deleting missing content is not an error.
    fn remove(&mut self, id: NodeId) -> Result<(), ContentError>;

    /// Move the content stored under `old` to `new`
    fn renumber(&mut self, old: NodeId, new: NodeId) -> Result<(), ContentError>;

    /// Read the whole content of `id`
    fn read_all(&self, id: NodeId) -> Result<Vec<u8>, ContentError> {
        let mut reader = self.open_for_read(id)?;
        let mut content = Vec::new();
        reader
            .read_to_end(&mut content)
            .map_err(|e| ContentError::from_io(id, e))?;
        Ok(content)
    }
}
