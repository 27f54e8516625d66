//! Low-level ZIP archive parser.
//!
//! This module handles the binary parsing of ZIP file structures from an
//! in-memory archive buffer.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) by scanning backwards, so an
//!    archive comment of any length is skipped
//! 2. Walk the Central Directory, one record per step, keeping only entries
//!    the extractor supports
//! 3. For extraction, read each entry's Local File Header and payload
//!
//! The local header is authoritative for the payload location and sizes; the
//! central record is only consulted when sizes are deferred to a data
//! descriptor.

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::record::{self, BinaryRecord};

use super::names::decode_entry_name;
use super::structures::*;

/// An entry located through its Local File Header.
#[derive(Debug, Clone)]
pub struct LocalEntry<'a> {
    /// Decoded entry name
    pub name: String,
    /// Offset of the Local File Header
    pub header_offset: u64,
    /// Compression method from the local header
    pub method: CompressionMethod,
    /// Declared CRC-32 of the decompressed payload
    pub crc32: u32,
    /// Declared decompressed size
    pub uncompressed_size: u64,
    /// Compressed payload, exactly as many bytes as declared
    pub payload: &'a [u8],
}

/// Low-level ZIP parser over an archive held in memory.
///
/// Typically used through [`ZipExtractor`](super::ZipExtractor) rather than
/// directly.
///
/// ## Example
///
/// ```ignore
/// let parser = ZipParser::new(&bytes);
/// for central in parser.list_files()? {
///     let entry = parser.read_local_entry(&central)?;
///     // Decompress entry.payload...
/// }
/// ```
pub struct ZipParser<'a> {
    /// The complete archive
    data: &'a [u8],
}

impl<'a> ZipParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Scans backwards from the end of the buffer for the EOCD signature and
    /// takes the last occurrence that still has room for a complete record.
    ///
    /// # Returns
    ///
    /// A tuple of (EOCD record, offset of EOCD in the buffer).
    ///
    /// # Errors
    ///
    /// Fails if the buffer is too small, has no EOCD, or the EOCD declares
    /// zero entries or an empty central directory.
    pub fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        let size = EndOfCentralDirectory::SIZE;
        if self.data.len() <= size {
            return Err(Error::ArchiveTooSmall {
                len: self.data.len(),
            });
        }

        // A signature closer to the end than `size` bytes cannot start a record
        let signature = EndOfCentralDirectory::SIGNATURE.to_le_bytes();
        let search_area = &self.data[..self.data.len() - size + signature.len()];
        let offset = search_area
            .windows(signature.len())
            .rposition(|window| window == signature)
            .ok_or(Error::MissingEndOfCentralDirectory)? as u64;

        let eocd: EndOfCentralDirectory = self.record_at(offset)?;
        debug!(
            offset,
            total_entries = eocd.total_entries,
            cd_size = eocd.cd_size,
            cd_offset = eocd.cd_offset,
            "found end of central directory"
        );

        if eocd.total_entries == 0 || eocd.cd_size == 0 {
            return Err(Error::EmptyArchive {
                entries: eocd.total_entries,
                cd_size: eocd.cd_size,
            });
        }

        Ok((eocd, offset))
    }

    /// List every supported entry in the archive.
    ///
    /// Walks exactly `cd_size` bytes starting at `cd_offset`, consuming one
    /// record per step whether or not it is accepted. Only entries with a
    /// valid signature, a Store or Deflate method and a non-empty name are
    /// returned.
    ///
    /// # Errors
    ///
    /// Fails if a record overruns the declared directory span, or if the
    /// number of accepted entries differs from the EOCD total. A single
    /// unsupported entry therefore rejects the whole archive.
    pub fn list_files(&self) -> Result<Vec<CentralDirectoryHeader>> {
        let (eocd, _) = self.find_eocd()?;

        let mut offset = eocd.cd_offset as u64;
        let end = offset + eocd.cd_size as u64;
        let mut entries = Vec::with_capacity(eocd.total_entries as usize);

        while offset < end {
            let header: CentralDirectoryHeader = self.record_at(offset)?;
            let next = offset + header.record_len();
            if next > end {
                return Err(Error::malformed(CentralDirectoryHeader::NAME, offset));
            }

            if header.is_acceptable() {
                trace!(offset, lfh_offset = header.lfh_offset, "accepted central record");
                entries.push(header);
            } else {
                debug!(
                    offset,
                    signature = header.signature,
                    method = header.compression_method,
                    name_len = header.file_name_length,
                    "rejected central record"
                );
            }

            offset = next;
        }

        if entries.len() != eocd.total_entries as usize {
            return Err(Error::EntryCountMismatch {
                accepted: entries.len(),
                declared: eocd.total_entries,
            });
        }

        Ok(entries)
    }

    /// Read the Local File Header of an entry and slice out its payload.
    ///
    /// # Errors
    ///
    /// Fails if the local header is missing, has a wrong signature or an
    /// empty name, or if the declared payload runs past the buffer.
    pub fn read_local_entry(&self, central: &CentralDirectoryHeader) -> Result<LocalEntry<'a>> {
        let offset = central.lfh_offset as u64;
        let header: LocalFileHeader = self
            .record_at(offset)
            .map_err(|_| Error::InvalidLocalHeader { offset })?;

        if header.signature != LocalFileHeader::SIGNATURE || header.file_name_length == 0 {
            return Err(Error::InvalidLocalHeader { offset });
        }

        let name_offset = offset + LocalFileHeader::SIZE as u64;
        let name_bytes = self
            .slice(name_offset, header.file_name_length as u64)
            .ok_or(Error::InvalidLocalHeader { offset })?;
        let name = decode_entry_name(name_bytes, header.is_utf8());

        // Sizes deferred to a data descriptor are zero in the local header
        let (crc32, compressed_size, uncompressed_size) = if header.has_data_descriptor() {
            (
                central.crc32,
                central.compressed_size,
                central.uncompressed_size,
            )
        } else {
            (
                header.crc32,
                header.compressed_size,
                header.uncompressed_size,
            )
        };

        let data_offset =
            name_offset + header.file_name_length as u64 + header.extra_field_length as u64;
        let payload = self
            .slice(data_offset, compressed_size as u64)
            .ok_or_else(|| Error::PayloadOutOfBounds { name: name.clone() })?;

        debug!(
            %name,
            offset,
            method = header.compression_method,
            compressed_size,
            uncompressed_size,
            "read local header"
        );

        Ok(LocalEntry {
            name,
            header_offset: offset,
            method: header.method(),
            crc32,
            uncompressed_size: uncompressed_size as u64,
            payload,
        })
    }

    /// Decode a fixed-layout record at `offset`, bounds-checked.
    fn record_at<T: BinaryRecord>(&self, offset: u64) -> Result<T> {
        let bytes = self
            .slice(offset, T::SIZE as u64)
            .ok_or(Error::malformed(T::NAME, offset))?;
        record::decode(bytes)
    }

    fn slice(&self, offset: u64, len: u64) -> Option<&'a [u8]> {
        let start = usize::try_from(offset).ok()?;
        let end = start.checked_add(usize::try_from(len).ok()?)?;
        self.data.get(start..end)
    }
}
