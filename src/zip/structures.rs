use crate::error::Result;
use crate::record::{BinaryRecord, RecordReader, RecordWriter};

/// General purpose flag: sizes and CRC follow the payload in a data descriptor
const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;
/// General purpose flag: file name is UTF-8 (language encoding flag)
const FLAG_UTF8: u16 = 1 << 11;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, CompressionMethod::Unknown(_))
    }
}

/// End of Central Directory (EOCD) - 22 bytes without the trailing comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub signature: u32,
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: u32 = 0x0605_4b50;
}

impl BinaryRecord for EndOfCentralDirectory {
    const NAME: &'static str = "end of central directory";
    const SIZE: usize = 22;

    fn read_fields(r: &mut RecordReader<'_>) -> Result<Self> {
        Ok(Self {
            signature: r.u32()?,
            disk_number: r.u16()?,
            disk_with_cd: r.u16()?,
            disk_entries: r.u16()?,
            total_entries: r.u16()?,
            cd_size: r.u32()?,
            cd_offset: r.u32()?,
            comment_len: r.u16()?,
        })
    }

    fn write_fields(&self, w: &mut RecordWriter) {
        w.u32(self.signature);
        w.u16(self.disk_number);
        w.u16(self.disk_with_cd);
        w.u16(self.disk_entries);
        w.u16(self.total_entries);
        w.u32(self.cd_size);
        w.u32(self.cd_offset);
        w.u16(self.comment_len);
    }
}

/// Central Directory File Header (CDFH) - 46 bytes before the variable fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryHeader {
    pub signature: u32,
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: u16,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
    pub file_comment_length: u16,
    pub disk_number_start: u16,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    pub lfh_offset: u32,
}

impl CentralDirectoryHeader {
    pub const SIGNATURE: u32 = 0x0201_4b50;

    /// Full on-disk length including name, extra field and comment
    pub fn record_len(&self) -> u64 {
        Self::SIZE as u64
            + self.file_name_length as u64
            + self.extra_field_length as u64
            + self.file_comment_length as u64
    }

    pub fn method(&self) -> CompressionMethod {
        CompressionMethod::from_u16(self.compression_method)
    }

    /// Whether the extractor can take this entry at all
    pub fn is_acceptable(&self) -> bool {
        self.signature == Self::SIGNATURE && self.method().is_supported() && self.file_name_length > 0
    }
}

impl BinaryRecord for CentralDirectoryHeader {
    const NAME: &'static str = "central directory header";
    const SIZE: usize = 46;

    fn read_fields(r: &mut RecordReader<'_>) -> Result<Self> {
        Ok(Self {
            signature: r.u32()?,
            version_made_by: r.u16()?,
            version_needed: r.u16()?,
            flags: r.u16()?,
            compression_method: r.u16()?,
            last_mod_time: r.u16()?,
            last_mod_date: r.u16()?,
            crc32: r.u32()?,
            compressed_size: r.u32()?,
            uncompressed_size: r.u32()?,
            file_name_length: r.u16()?,
            extra_field_length: r.u16()?,
            file_comment_length: r.u16()?,
            disk_number_start: r.u16()?,
            internal_attrs: r.u16()?,
            external_attrs: r.u32()?,
            lfh_offset: r.u32()?,
        })
    }

    fn write_fields(&self, w: &mut RecordWriter) {
        w.u32(self.signature);
        w.u16(self.version_made_by);
        w.u16(self.version_needed);
        w.u16(self.flags);
        w.u16(self.compression_method);
        w.u16(self.last_mod_time);
        w.u16(self.last_mod_date);
        w.u32(self.crc32);
        w.u32(self.compressed_size);
        w.u32(self.uncompressed_size);
        w.u16(self.file_name_length);
        w.u16(self.extra_field_length);
        w.u16(self.file_comment_length);
        w.u16(self.disk_number_start);
        w.u16(self.internal_attrs);
        w.u32(self.external_attrs);
        w.u32(self.lfh_offset);
    }
}

/// Local File Header (LFH) - 30 bytes before the name and extra field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHeader {
    pub signature: u32,
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: u16,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
}

impl LocalFileHeader {
    pub const SIGNATURE: u32 = 0x0403_4b50;

    pub fn method(&self) -> CompressionMethod {
        CompressionMethod::from_u16(self.compression_method)
    }

    pub fn is_utf8(&self) -> bool {
        self.flags & FLAG_UTF8 != 0
    }

    pub fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }
}

impl BinaryRecord for LocalFileHeader {
    const NAME: &'static str = "local file header";
    const SIZE: usize = 30;

    fn read_fields(r: &mut RecordReader<'_>) -> Result<Self> {
        Ok(Self {
            signature: r.u32()?,
            version_needed: r.u16()?,
            flags: r.u16()?,
            compression_method: r.u16()?,
            last_mod_time: r.u16()?,
            last_mod_date: r.u16()?,
            crc32: r.u32()?,
            compressed_size: r.u32()?,
            uncompressed_size: r.u32()?,
            file_name_length: r.u16()?,
            extra_field_length: r.u16()?,
        })
    }

    fn write_fields(&self, w: &mut RecordWriter) {
        w.u32(self.signature);
        w.u16(self.version_needed);
        w.u16(self.flags);
        w.u16(self.compression_method);
        w.u16(self.last_mod_time);
        w.u16(self.last_mod_date);
        w.u32(self.crc32);
        w.u32(self.compressed_size);
        w.u32(self.uncompressed_size);
        w.u16(self.file_name_length);
        w.u16(self.extra_field_length);
    }
}

/// A verified archive entry held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEntry {
    /// Decoded entry name, relative to the extraction root
    pub relative_path: String,
    /// Decompressed, CRC-checked payload
    pub data: Vec<u8>,
}

impl ExtractedEntry {
    pub fn is_directory(&self) -> bool {
        self.relative_path.ends_with('/')
    }
}
