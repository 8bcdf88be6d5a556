use std::io::{self, Read};

use crate::core::config::DEFAULT_CHUNK_SIZE;

/// Reads a body through a fixed-size buffer and reports how many bytes each read
/// produced. The bytes themselves are discarded.
pub struct ChunkCounter<R> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R: Read> ChunkCounter<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            buffer: vec![0; chunk_size.max(1)],
        }
    }

    pub fn with_default_chunk_size(reader: R) -> Self {
        Self::new(reader, DEFAULT_CHUNK_SIZE)
    }

    /// Length of the next chunk, `None` at end of body.
    pub fn next_chunk(&mut self) -> io::Result<Option<usize>> {
        loop {
            match self.reader.read(&mut self.buffer) {
                Ok(0) => return Ok(None),
                Ok(n) => return Ok(Some(n)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.buffer.len()
    }
}

impl<R: Read> Iterator for ChunkCounter<R> {
    type Item = io::Result<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}
