//! Hand-built archives for tests.

use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

use crate::checksum::crc32;
use crate::record;

use super::structures::*;

const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;
const FLAG_UTF8: u16 = 1 << 11;

pub(crate) struct EntrySpec {
    name: Vec<u8>,
    data: Vec<u8>,
    method: u16,
    flags: u16,
    crc: Option<u32>,
}

impl EntrySpec {
    pub(crate) fn stored(name: &str, data: &[u8]) -> Self {
        Self::raw_name(name.as_bytes(), data)
    }

    pub(crate) fn deflated(name: &str, data: &[u8]) -> Self {
        Self {
            method: 8,
            ..Self::stored(name, data)
        }
    }

    pub(crate) fn raw_name(name: &[u8], data: &[u8]) -> Self {
        Self {
            name: name.to_vec(),
            data: data.to_vec(),
            method: 0,
            flags: 0,
            crc: None,
        }
    }

    /// Override the method code; the payload is still written as built
    pub(crate) fn method(mut self, method: u16) -> Self {
        self.method = method;
        self
    }

    pub(crate) fn utf8(mut self) -> Self {
        self.flags |= FLAG_UTF8;
        self
    }

    pub(crate) fn data_descriptor(mut self) -> Self {
        self.flags |= FLAG_DATA_DESCRIPTOR;
        self
    }

    pub(crate) fn crc(mut self, crc: u32) -> Self {
        self.crc = Some(crc);
        self
    }

    fn payload(&self) -> Vec<u8> {
        if self.method != 8 {
            return self.data.clone();
        }
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&self.data).unwrap();
        encoder.finish().unwrap()
    }
}

#[derive(Default)]
pub(crate) struct ArchiveBuilder {
    entries: Vec<EntrySpec>,
    comment: Vec<u8>,
    total_entries: Option<u16>,
}

impl ArchiveBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn entry(mut self, entry: EntrySpec) -> Self {
        self.entries.push(entry);
        self
    }

    pub(crate) fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    pub(crate) fn total_entries(mut self, total: u16) -> Self {
        self.total_entries = Some(total);
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for entry in &self.entries {
            let payload = entry.payload();
            let crc = entry.crc.unwrap_or_else(|| crc32(&entry.data));
            let deferred = entry.flags & FLAG_DATA_DESCRIPTOR != 0;
            let lfh_offset = out.len() as u32;

            let local = LocalFileHeader {
                signature: LocalFileHeader::SIGNATURE,
                version_needed: 20,
                flags: entry.flags,
                compression_method: entry.method,
                last_mod_time: 0,
                last_mod_date: 0x21,
                crc32: if deferred { 0 } else { crc },
                compressed_size: if deferred { 0 } else { payload.len() as u32 },
                uncompressed_size: if deferred { 0 } else { entry.data.len() as u32 },
                file_name_length: entry.name.len() as u16,
                extra_field_length: 0,
            };
            out.extend_from_slice(&record::encode(&local));
            out.extend_from_slice(&entry.name);
            out.extend_from_slice(&payload);
            if deferred {
                out.extend_from_slice(b"PK\x07\x08");
                out.extend_from_slice(&crc.to_le_bytes());
                out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
                out.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
            }

            let header = CentralDirectoryHeader {
                signature: CentralDirectoryHeader::SIGNATURE,
                version_made_by: 20,
                version_needed: 20,
                flags: entry.flags,
                compression_method: entry.method,
                last_mod_time: 0,
                last_mod_date: 0x21,
                crc32: crc,
                compressed_size: payload.len() as u32,
                uncompressed_size: entry.data.len() as u32,
                file_name_length: entry.name.len() as u16,
                extra_field_length: 0,
                file_comment_length: 0,
                disk_number_start: 0,
                internal_attrs: 0,
                external_attrs: 0,
                lfh_offset,
            };
            central.extend_from_slice(&record::encode(&header));
            central.extend_from_slice(&entry.name);
        }

        let cd_offset = out.len() as u32;
        out.extend_from_slice(&central);

        let count = self.entries.len() as u16;
        let eocd = EndOfCentralDirectory {
            signature: EndOfCentralDirectory::SIGNATURE,
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: count,
            total_entries: self.total_entries.unwrap_or(count),
            cd_size: central.len() as u32,
            cd_offset,
            comment_len: self.comment.len() as u16,
        };
        out.extend_from_slice(&record::encode(&eocd));
        out.extend_from_slice(&self.comment);
        out
    }
}
