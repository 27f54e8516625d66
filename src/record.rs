//! Fixed-layout binary records.
//!
//! A [`BinaryRecord`] is a byte-for-byte structure with explicit field widths,
//! no padding between fields and little-endian integers. Each implementor
//! reads and writes its fields in declaration order through a
//! [`RecordReader`] / [`RecordWriter`], so the layout never depends on host
//! alignment rules.
//!
//! ```
//! use romforge::record::{self, BinaryRecord, RecordReader, RecordWriter};
//!
//! #[derive(Debug, PartialEq)]
//! struct Marker {
//!     tag: [u8; 2],
//!     length: u16,
//! }
//!
//! impl BinaryRecord for Marker {
//!     const NAME: &'static str = "marker";
//!     const SIZE: usize = 4;
//!
//!     fn read_fields(r: &mut RecordReader<'_>) -> romforge::Result<Self> {
//!         Ok(Self { tag: r.array()?, length: r.u16()? })
//!     }
//!
//!     fn write_fields(&self, w: &mut RecordWriter) {
//!         w.bytes(&self.tag);
//!         w.u16(self.length);
//!     }
//! }
//!
//! let marker: Marker = record::decode(b"OK\x10\x00")?;
//! assert_eq!(marker.length, 16);
//! assert_eq!(record::encode(&marker), b"OK\x10\x00");
//! # Ok::<(), romforge::Error>(())
//! ```

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use crate::error::{Error, Result};

/// A record with a fixed, declared byte layout.
pub trait BinaryRecord: Sized {
    /// Human-readable record name used in errors
    const NAME: &'static str;

    /// Total size in bytes (sum of all field widths)
    const SIZE: usize;

    /// Read every field in declaration order.
    fn read_fields(reader: &mut RecordReader<'_>) -> Result<Self>;

    /// Write every field in declaration order.
    fn write_fields(&self, writer: &mut RecordWriter);
}

/// Decode a record from a buffer of exactly `T::SIZE` bytes.
///
/// # Errors
///
/// Returns [`Error::SizeMismatch`] when the buffer length differs from the
/// declared record size; nothing is decoded in that case.
pub fn decode<T: BinaryRecord>(bytes: &[u8]) -> Result<T> {
    if bytes.len() != T::SIZE {
        return Err(Error::SizeMismatch {
            record: T::NAME,
            expected: T::SIZE,
            actual: bytes.len(),
        });
    }

    let mut reader = RecordReader::new(bytes);
    T::read_fields(&mut reader)
}

/// Encode a record into a buffer of exactly `T::SIZE` bytes.
pub fn encode<T: BinaryRecord>(value: &T) -> Vec<u8> {
    let mut writer = RecordWriter::with_capacity(T::SIZE);
    value.write_fields(&mut writer);
    debug_assert_eq!(writer.len(), T::SIZE, "{} wrote a wrong length", T::NAME);
    writer.into_bytes()
}

/// Sequential little-endian field reader over a record buffer.
pub struct RecordReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> RecordReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.cursor.read_u8()?)
    }

    pub fn u16(&mut self) -> Result<u16> {
        Ok(self.cursor.read_u16::<LittleEndian>()?)
    }

    pub fn u32(&mut self) -> Result<u32> {
        Ok(self.cursor.read_u32::<LittleEndian>()?)
    }

    /// Read a fixed-size byte array verbatim (no trimming, no NUL handling).
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.cursor.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }
}

/// Sequential little-endian field writer.
#[derive(Debug, Default)]
pub struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn u16(&mut self, value: u16) {
        LittleEndian::write_u16(self.grow(2), value);
    }

    pub fn u32(&mut self, value: u32) {
        LittleEndian::write_u32(self.grow(4), value);
    }

    pub fn bytes(&mut self, value: &[u8]) {
        self.buf.extend_from_slice(value);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Append `len` zero bytes and return them for filling in.
    fn grow(&mut self, len: usize) -> &mut [u8] {
        let start = self.buf.len();
        self.buf.resize(start + len, 0);
        &mut self.buf[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Sample {
        kind: u8,
        flags: u16,
        offset: u32,
        label: [u8; 5],
    }

    impl BinaryRecord for Sample {
        const NAME: &'static str = "sample";
        const SIZE: usize = 12;

        fn read_fields(r: &mut RecordReader<'_>) -> Result<Self> {
            Ok(Self {
                kind: r.u8()?,
                flags: r.u16()?,
                offset: r.u32()?,
                label: r.array()?,
            })
        }

        fn write_fields(&self, w: &mut RecordWriter) {
            w.u8(self.kind);
            w.u16(self.flags);
            w.u32(self.offset);
            w.bytes(&self.label);
        }
    }

    #[test]
    fn test_little_endian_layout() {
        let bytes = [0x07, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, b'a', b'b', 0, 0, 0xFF];
        let sample: Sample = decode(&bytes).unwrap();

        assert_eq!(sample.kind, 0x07);
        assert_eq!(sample.flags, 0x1234);
        assert_eq!(sample.offset, 0x1234_5678);
        assert_eq!(&sample.label, b"ab\0\0\xFF");
    }

    #[test]
    fn test_encode_decode_is_identity_on_bytes() {
        let buffers: [[u8; 12]; 3] = [
            [0; 12],
            [0xFF; 12],
            [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
        ];
        for bytes in buffers {
            let sample: Sample = decode(&bytes).unwrap();
            assert_eq!(encode(&sample), bytes.to_vec());
        }
    }

    #[test]
    fn test_decode_encode_is_identity_on_values() {
        let sample = Sample {
            kind: 0xA5,
            flags: 0x0800,
            offset: 0xFFFF_0001,
            label: *b"ROM\0\x01",
        };
        let bytes = encode(&sample);
        assert_eq!(bytes.len(), Sample::SIZE);
        assert_eq!(decode::<Sample>(&bytes).unwrap(), sample);
    }

    #[test]
    fn test_size_mismatch() {
        for len in [0, 11, 13] {
            let err = decode::<Sample>(&vec![0; len]).unwrap_err();
            match err {
                Error::SizeMismatch {
                    record,
                    expected,
                    actual,
                } => {
                    assert_eq!(record, "sample");
                    assert_eq!(expected, 12);
                    assert_eq!(actual, len);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_reader_position() {
        let bytes = [1, 2, 3, 4, 5, 6, 7];
        let mut reader = RecordReader::new(&bytes);
        reader.u8().unwrap();
        reader.u16().unwrap();
        assert_eq!(reader.position(), 3);
        reader.u32().unwrap();
        assert!(reader.u8().is_err());
    }

    #[test]
    fn test_writer_field_widths() {
        let mut writer = RecordWriter::with_capacity(11);
        writer.u8(0xAB);
        writer.u16(0x1234);
        writer.u32(0xDEAD_BEEF);
        writer.bytes(b"ROM!");
        assert_eq!(writer.len(), 11);
        assert_eq!(
            writer.into_bytes(),
            vec![0xAB, 0x34, 0x12, 0xEF, 0xBE, 0xAD, 0xDE, b'R', b'O', b'M', b'!']
        );
    }
}
