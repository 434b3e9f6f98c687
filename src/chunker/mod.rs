// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Fixed-size chunker for splitting file contents into individually
//! addressable blocks.

use std::io::{self, Read};
use std::num::NonZeroUsize;

/// 256 KiB
pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = NonZeroUsize::new(256 * 1024).unwrap();

/// Splits a byte stream into chunks of exactly `chunk_size` bytes, except for
/// the last one which holds the remainder.
///
/// Boundaries depend only on the stream contents: short reads from the inner
/// reader are coalesced. An empty stream yields a single empty chunk, so every
/// file maps to at least one block.
pub struct Chunker<R> {
    reader: R,
    chunk_size: NonZeroUsize,
    emitted: bool,
    done: bool,
}

impl<R: Read> Chunker<R> {
    pub fn new(reader: R, chunk_size: NonZeroUsize) -> Self {
        Self {
            reader,
            chunk_size,
            emitted: false,
            done: false,
        }
    }

    fn fill(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; self.chunk_size.get()];
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }
}

impl<R: Read> Iterator for Chunker<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.fill() {
            Ok(chunk) if chunk.is_empty() => {
                self.done = true;
                // An empty file still gets one (empty) chunk.
                (!self.emitted).then(|| {
                    self.emitted = true;
                    Ok(chunk)
                })
            }
            Ok(chunk) => {
                if chunk.len() < self.chunk_size.get() {
                    self.done = true;
                }
                self.emitted = true;
                Some(Ok(chunk))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
