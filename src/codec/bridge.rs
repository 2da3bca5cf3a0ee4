//! Pull/push adapters between arenas and the external codecs.
//!
//! Codecs from the `image` and `png` crates speak `std::io`. These adapters
//! give them a bounded view of an arena: [`ArenaReader`] never reads past the
//! recorded file length and [`ArenaWriter`] never writes past the file
//! capacity, counting what it had to drop instead.

use std::io::{self, BufRead, Read, Seek, SeekFrom, Write};

use crate::arena::RasterArena;

// =============================================================================
// Arena Reader
// =============================================================================

/// Cursor over the file bytes of an arena.
#[derive(Debug, Clone)]
pub struct ArenaReader<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> ArenaReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    /// Return up to `requested` bytes at the cursor and advance past them.
    ///
    /// Fewer bytes are returned only when the cursor reaches the end of the
    /// buffer.
    pub fn pull(&mut self, requested: usize) -> &'a [u8] {
        let start = self.cursor.min(self.data.len());
        let end = start + requested.min(self.data.len() - start);
        self.cursor = end;
        &self.data[start..end]
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Read for ArenaReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let chunk = self.pull(buf.len());
        buf[..chunk.len()].copy_from_slice(chunk);
        Ok(chunk.len())
    }
}

impl BufRead for ArenaReader<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        let start = self.cursor.min(self.data.len());
        Ok(&self.data[start..])
    }

    fn consume(&mut self, amt: usize) {
        self.cursor = self.cursor.saturating_add(amt).min(self.data.len());
    }
}

impl Seek for ArenaReader<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.data.len() as i128;
        let target = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::End(delta) => len + delta as i128,
            SeekFrom::Current(delta) => self.cursor as i128 + delta as i128,
        };

        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before the start of the arena file",
            ));
        }

        // Positions past the end read as end-of-buffer
        self.cursor = target.min(len) as usize;
        Ok(self.cursor as u64)
    }
}

// =============================================================================
// Arena Writer
// =============================================================================

/// Appends encoder output to an arena's file buffer.
///
/// Bytes beyond the arena's capacity are dropped and counted in the arena's
/// `overflow_write`. As an `io::Write` it always reports the whole buffer as
/// written, so an encoder never aborts mid-stream; callers check
/// [`ArenaWriter::overflowed`] afterwards.
#[derive(Debug)]
pub struct ArenaWriter<'a> {
    arena: &'a mut RasterArena,
    pushed: usize,
}

impl<'a> ArenaWriter<'a> {
    pub fn new(arena: &'a mut RasterArena) -> Self {
        Self { arena, pushed: 0 }
    }

    /// Append `data`, clipped to the remaining capacity.
    ///
    /// Returns the number of bytes actually stored.
    pub fn push(&mut self, data: &[u8]) -> usize {
        self.pushed += data.len();
        self.arena.push_file(data)
    }

    /// Total bytes offered to this writer, stored or not.
    pub fn pushed(&self) -> usize {
        self.pushed
    }

    /// Whether any byte had to be dropped.
    pub fn overflowed(&self) -> bool {
        self.arena.overflow_write() > 0
    }
}

impl Write for ArenaWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.push(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
