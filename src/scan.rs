//! Free-space search in binary images.
//!
//! Unused regions of a ROM image are filled with a sentinel byte (usually
//! `0xFF`). [`FreeSpaceScanner`] finds the lowest offset where a run of at
//! least `run_length` sentinel bytes starts.
//!
//! ## Algorithm Overview
//!
//! 1. Read the source in bounded chunks, so arbitrarily large files are never
//!    fully buffered
//! 2. Test candidate start positions at stride `run_length`: the last byte of
//!    the candidate first, then the first byte, then the interior from the
//!    back
//! 3. On a mismatch, resume right after the mismatching byte; no qualifying
//!    start can lie at or before it
//! 4. Carry the unscanned tail of each chunk (always shorter than
//!    `run_length`) into the next one, so runs straddling a chunk boundary
//!    are found

use std::path::Path;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::io::{LocalFileReader, ReadAt};

/// Byte value that marks free space by default
pub const DEFAULT_SENTINEL: u8 = 0xFF;

/// Default read chunk size (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Configuration for the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Byte value that marks free space
    pub sentinel: u8,
    /// Number of bytes read per chunk
    pub chunk_size: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ScannerConfig {
    /// Creates a new scanner config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the free-space byte
    pub fn sentinel(mut self, sentinel: u8) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// Sets the read chunk size
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

/// Outcome of scanning one window
enum WindowScan {
    /// Run starts at this window index
    Found(usize),
    /// No run yet; the next candidate starts at this window index
    Resume(usize),
}

/// Chunked free-space scanner
#[derive(Debug, Clone, Default)]
pub struct FreeSpaceScanner {
    config: ScannerConfig,
}

impl FreeSpaceScanner {
    /// Creates a new scanner with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new scanner with custom configuration
    pub fn with_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Returns the scanner configuration
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Find the first run of `run_length` sentinel bytes at or after
    /// `start_offset`.
    ///
    /// Returns `Ok(None)` when the source has no such run, including when
    /// fewer than `run_length` bytes remain after `start_offset`.
    ///
    /// # Errors
    ///
    /// Fails on a zero `run_length` or chunk size, and on read errors.
    pub fn find<R: ReadAt + ?Sized>(
        &self,
        source: &R,
        run_length: usize,
        start_offset: u64,
    ) -> Result<Option<u64>> {
        if run_length == 0 {
            return Err(Error::invalid_argument("run length must be at least 1"));
        }
        if self.config.chunk_size == 0 {
            return Err(Error::invalid_argument("chunk size must be at least 1"));
        }

        let size = source.size();
        if start_offset >= size || size - start_offset < run_length as u64 {
            return Ok(None);
        }

        let sentinel = self.config.sentinel;
        let mut chunk = vec![0u8; self.config.chunk_size];
        let mut window: Vec<u8> = Vec::with_capacity(self.config.chunk_size + run_length);
        // File offset of window[0]
        let mut window_offset = start_offset;
        let mut read_offset = start_offset;

        loop {
            let n = source.read_full_at(read_offset, &mut chunk)?;
            if n == 0 {
                break;
            }
            read_offset += n as u64;
            window.extend_from_slice(&chunk[..n]);
            trace!(window_offset, window_len = window.len(), "scanning chunk");

            match scan_window(&window, sentinel, run_length) {
                WindowScan::Found(index) => {
                    let offset = window_offset + index as u64;
                    debug!(offset, run_length, sentinel, "found free space");
                    return Ok(Some(offset));
                }
                WindowScan::Resume(next) => {
                    window.drain(..next);
                    window_offset += next as u64;
                }
            }
        }

        debug!(run_length, sentinel, start_offset, "no free space found");
        Ok(None)
    }

    /// Open `path` read-only and search it with [`find`](Self::find).
    pub fn find_in_file(
        &self,
        path: &Path,
        run_length: usize,
        start_offset: u64,
    ) -> Result<Option<u64>> {
        let reader = LocalFileReader::new(path)?;
        self.find(&reader, run_length, start_offset)
    }
}

fn scan_window(buf: &[u8], sentinel: u8, run_length: usize) -> WindowScan {
    let mut start = 0;

    while start + run_length <= buf.len() {
        let last = start + run_length - 1;

        if buf[last] != sentinel {
            start = last + 1;
            continue;
        }

        if buf[start] != sentinel {
            start += 1;
            continue;
        }

        // Empty when the run is a single byte
        let interior = buf.get(start + 1..last).unwrap_or_default();
        match interior.iter().rposition(|&b| b != sentinel) {
            Some(i) => start += i + 2,
            None => return WindowScan::Found(start),
        }
    }

    WindowScan::Resume(start)
}
