//! ZIP archive parsing and extraction.
//!
//! This module reads update payloads: a conservative, in-memory ZIP reader
//! that validates every entry before anything is accepted.
//!
//! ## Architecture
//!
//! - [`structures`]: fixed-layout records (EOCD, central and local headers)
//! - [`parser`]: locating and slicing those records inside the archive
//! - [`extractor`]: decompression, verification and writing to disk
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end, optionally
//!    followed by an archive comment
//!
//! ## Supported Features
//!
//! - STORED (no compression) method
//! - DEFLATE compression method (raw deflate streams)
//! - IBM437 and UTF-8 entry names
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No ZIP64
//! - Any entry with another compression method rejects the whole archive

mod extractor;
mod names;
mod parser;
mod structures;

#[cfg(test)]
pub(crate) mod fixtures;

pub use extractor::{ExtractSummary, ZipExtractor};
pub use names::{decode_cp437, decode_entry_name};
pub use parser::{LocalEntry, ZipParser};
pub use structures::*;
