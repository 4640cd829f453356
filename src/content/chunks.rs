//! Packet framing for node content.
//!
//! A packet carries at most `packet_size` bytes and never spans a line
//! break: a packet ends right after a `\n` even if it is shorter than the
//! packet size.

use std::io::{self, BufRead, BufReader, Read};

/// Default number of content bytes per packet
pub const DEFAULT_PACKET_SIZE: usize = 9;

/// Splits a reader into line-framed packets
pub struct ChunkReader<R> {
    reader: BufReader<R>,
    packet_size: usize,
}

impl<R: Read> ChunkReader<R> {
    /// Wrap `reader`; a packet size of 0 is treated as 1
    pub fn new(reader: R, packet_size: usize) -> Self {
        Self {
            reader: BufReader::new(reader),
            packet_size: packet_size.max(1),
        }
    }

    pub fn packet_size(&self) -> usize {
        self.packet_size
    }

    /// Read the next packet, or `None` once the reader is exhausted
    pub fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut chunk = Vec::with_capacity(self.packet_size);
        while chunk.len() < self.packet_size {
            let available = self.reader.fill_buf()?;
            if available.is_empty() {
                break;
            }
            let wanted = self.packet_size - chunk.len();
            let window = &available[..available.len().min(wanted)];
            let (take, line_end) = match window.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (window.len(), false),
            };
            chunk.extend_from_slice(&window[..take]);
            self.reader.consume(take);
            if line_end {
                break;
            }
        }
        Ok(if chunk.is_empty() { None } else { Some(chunk) })
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}
