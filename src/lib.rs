//! # romforge
//!
//! A binary-format toolkit for ROM hacking.
//!
//! The library reads and writes the binary formats a ROM editor deals with:
//! ZIP update payloads, fixed-layout cartridge headers and runs of unused
//! space inside an image. Everything works on byte buffers or files on disk;
//! only the self-update flow touches the network.
//!
//! ## Features
//!
//! - Extract ZIP archives (STORED and DEFLATE), verifying size and CRC-32 of
//!   every entry before accepting the archive
//! - Decode and encode packed little-endian records through [`BinaryRecord`]
//! - Read and rewrite Game Boy, Game Boy Color and Game Boy Advance headers
//! - Find free space (runs of a sentinel byte) in arbitrarily large images
//! - Check for, download and install updates
//!
//! ## Example
//!
//! ```no_run
//! use romforge::{FreeSpaceScanner, ScannerConfig, ZipExtractor};
//! use std::path::Path;
//!
//! let archive = std::fs::read("update.zip")?;
//! if !ZipExtractor::extract(&archive, Path::new("out"), true) {
//!     eprintln!("update archive rejected");
//! }
//!
//! let scanner = FreeSpaceScanner::with_config(ScannerConfig::new().sentinel(0xFF));
//! if let Some(offset) = scanner.find_in_file(Path::new("firered.gba"), 0x200, 0x71_0000)? {
//!     println!("free space at {:#x}", offset);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod checksum;
pub mod cli;
pub mod error;
pub mod io;
pub mod record;
pub mod rom;
pub mod scan;
pub mod update;
pub mod zip;

pub use checksum::crc32;
pub use cli::Cli;
pub use error::{Error, Result};
pub use io::{HostFile, LocalFileReader, ReadAt};
pub use record::BinaryRecord;
pub use rom::{GameHeader, RomImage, RomKind};
pub use scan::{FreeSpaceScanner, ScannerConfig};
pub use update::{UpdateClient, UpdateConfig, UpdateInfo};
pub use zip::ZipExtractor;
