//! ROM images and their cartridge headers.
//!
//! The platform is chosen from the file extension, which also fixes where
//! the header lives: `0x134` for the Game Boy family and `0xA0` for the
//! Game Boy Advance.
//!
//! ## Example
//!
//! ```no_run
//! use romforge::rom::RomImage;
//! use std::path::Path;
//!
//! let image = RomImage::open(Path::new("firered.gba"))?;
//! let mut header = image.read_header()?;
//! header.set_title("FIRERED")?;
//! image.write_header(&header)?;
//! # Ok::<(), romforge::Error>(())
//! ```

mod headers;

pub use headers::{GbHeader, GbaHeader, GbcHeader, SgbHeader, fixed_text, set_fixed_text};

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::io::{HostFile, LocalFileReader, ReadAt};
use crate::record::{self, BinaryRecord};

/// Extensions of Game Boy family images
const GB_EXTENSIONS: [&str; 4] = ["gb", "sgb", "cgb", "gbc"];
/// Extensions of Game Boy Advance images
const GBA_EXTENSIONS: [&str; 3] = ["gba", "agb", "bin"];

/// Header offset for the Game Boy family
pub const GB_HEADER_OFFSET: u64 = 0x134;
/// Header offset for the Game Boy Advance
pub const GBA_HEADER_OFFSET: u64 = 0xA0;

/// Platform of a ROM image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomKind {
    GameBoy,
    SuperGameBoy,
    GameBoyColor,
    GameBoyAdvance,
}

impl RomKind {
    /// Detect the platform from the file extension (case-insensitive).
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();

        if GBA_EXTENSIONS.contains(&ext.as_str()) {
            return Some(RomKind::GameBoyAdvance);
        }
        if !GB_EXTENSIONS.contains(&ext.as_str()) {
            return None;
        }

        Some(if ext.contains('s') {
            RomKind::SuperGameBoy
        } else if ext.contains('c') {
            RomKind::GameBoyColor
        } else {
            RomKind::GameBoy
        })
    }

    pub fn header_offset(&self) -> u64 {
        match self {
            RomKind::GameBoyAdvance => GBA_HEADER_OFFSET,
            _ => GB_HEADER_OFFSET,
        }
    }

    pub fn header_size(&self) -> usize {
        match self {
            RomKind::GameBoy => GbHeader::SIZE,
            RomKind::SuperGameBoy => SgbHeader::SIZE,
            RomKind::GameBoyColor => GbcHeader::SIZE,
            RomKind::GameBoyAdvance => GbaHeader::SIZE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RomKind::GameBoy => "Game Boy",
            RomKind::SuperGameBoy => "Super Game Boy",
            RomKind::GameBoyColor => "Game Boy Color",
            RomKind::GameBoyAdvance => "Game Boy Advance",
        }
    }
}

/// A cartridge header of any supported platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameHeader {
    Gb(GbHeader),
    Sgb(SgbHeader),
    Gbc(GbcHeader),
    Gba(GbaHeader),
}

impl GameHeader {
    /// Decode the header layout that belongs to `kind`.
    pub fn decode(kind: RomKind, bytes: &[u8]) -> Result<Self> {
        Ok(match kind {
            RomKind::GameBoy => GameHeader::Gb(record::decode(bytes)?),
            RomKind::SuperGameBoy => GameHeader::Sgb(record::decode(bytes)?),
            RomKind::GameBoyColor => GameHeader::Gbc(record::decode(bytes)?),
            RomKind::GameBoyAdvance => GameHeader::Gba(record::decode(bytes)?),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            GameHeader::Gb(h) => record::encode(h),
            GameHeader::Sgb(h) => record::encode(h),
            GameHeader::Gbc(h) => record::encode(h),
            GameHeader::Gba(h) => record::encode(h),
        }
    }

    pub fn kind(&self) -> RomKind {
        match self {
            GameHeader::Gb(_) => RomKind::GameBoy,
            GameHeader::Sgb(_) => RomKind::SuperGameBoy,
            GameHeader::Gbc(_) => RomKind::GameBoyColor,
            GameHeader::Gba(_) => RomKind::GameBoyAdvance,
        }
    }

    fn title_field(&self) -> &[u8] {
        match self {
            GameHeader::Gb(h) => &h.title,
            GameHeader::Sgb(h) => &h.title,
            GameHeader::Gbc(h) => &h.title,
            GameHeader::Gba(h) => &h.title,
        }
    }

    pub fn title(&self) -> String {
        fixed_text(self.title_field())
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        let field: &mut [u8] = match self {
            GameHeader::Gb(h) => &mut h.title,
            GameHeader::Sgb(h) => &mut h.title,
            GameHeader::Gbc(h) => &mut h.title,
            GameHeader::Gba(h) => &mut h.title,
        };
        set_fixed_text(field, title)
    }

    pub fn software_version(&self) -> u8 {
        match self {
            GameHeader::Gb(h) => h.software_version,
            GameHeader::Sgb(h) => h.software_version,
            GameHeader::Gbc(h) => h.software_version,
            GameHeader::Gba(h) => h.software_version,
        }
    }

    pub fn header_checksum(&self) -> u8 {
        match self {
            GameHeader::Gb(h) => h.header_checksum,
            GameHeader::Sgb(h) => h.header_checksum,
            GameHeader::Gbc(h) => h.header_checksum,
            GameHeader::Gba(h) => h.header_checksum,
        }
    }
}

/// A ROM image on disk whose platform was detected from its extension
#[derive(Debug, Clone)]
pub struct RomImage {
    path: PathBuf,
    kind: RomKind,
}

impl RomImage {
    pub fn open(path: &Path) -> Result<Self> {
        let kind = RomKind::detect(path).ok_or_else(|| Error::UnknownRomFormat {
            path: path.to_path_buf(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            kind,
        })
    }

    pub fn kind(&self) -> RomKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the header at the platform's fixed offset.
    ///
    /// A truncated image fails with [`Error::SizeMismatch`].
    pub fn read_header(&self) -> Result<GameHeader> {
        let reader = LocalFileReader::new(&self.path)?;
        let mut buf = vec![0u8; self.kind.header_size()];
        let n = reader.read_full_at(self.kind.header_offset(), &mut buf)?;
        debug!(
            path = %self.path.display(),
            kind = self.kind.name(),
            bytes = n,
            "read header"
        );
        GameHeader::decode(self.kind, &buf[..n])
    }

    /// Write `header` back at the platform's fixed offset.
    pub fn write_header(&self, header: &GameHeader) -> Result<()> {
        if header.kind() != self.kind {
            return Err(Error::HeaderKindMismatch {
                header: header.kind().name(),
                image: self.kind.name(),
            });
        }

        let offset = self.kind.header_offset();
        let end = offset + self.kind.header_size() as u64;
        let size = LocalFileReader::new(&self.path)?.size();
        if size < end {
            return Err(Error::invalid_argument(format!(
                "'{}' is {} bytes, too small for a header ending at {:#x}",
                self.path.display(),
                size,
                end
            )));
        }

        HostFile::open(&self.path)?.write_at(offset, &header.encode())?;
        debug!(path = %self.path.display(), offset, "wrote header");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_detect_kind() {
        let cases = [
            ("red.gb", Some(RomKind::GameBoy)),
            ("RED.GB", Some(RomKind::GameBoy)),
            ("blue.sgb", Some(RomKind::SuperGameBoy)),
            ("crystal.gbc", Some(RomKind::GameBoyColor)),
            ("crystal.cgb", Some(RomKind::GameBoyColor)),
            ("ruby.gba", Some(RomKind::GameBoyAdvance)),
            ("ruby.AGB", Some(RomKind::GameBoyAdvance)),
            ("dump.bin", Some(RomKind::GameBoyAdvance)),
            ("notes.txt", None),
            ("no_extension", None),
        ];
        for (name, expected) in cases {
            assert_eq!(RomKind::detect(Path::new(name)), expected, "{name}");
        }
    }

    #[test]
    fn test_offsets_and_sizes() {
        assert_eq!(RomKind::GameBoy.header_offset(), 0x134);
        assert_eq!(RomKind::GameBoyColor.header_offset(), 0x134);
        assert_eq!(RomKind::GameBoyAdvance.header_offset(), 0xA0);
        assert_eq!(RomKind::SuperGameBoy.header_size(), 28);
        assert_eq!(RomKind::GameBoyAdvance.header_size(), 30);
    }

    fn gba_image(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("firered.gba");
        let mut data = vec![0xFFu8; 0x400];
        data[0xA0..0xAC].copy_from_slice(b"POKEMON FIRE");
        data[0xAC..0xB0].copy_from_slice(b"BPRE");
        data[0xB0..0xB2].copy_from_slice(b"01");
        data[0xB2] = 0x96;
        data[0xB3..0xBD].fill(0);
        data[0xBD] = 0x68;
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_read_header() {
        let dir = TempDir::new().unwrap();
        let image = RomImage::open(&gba_image(&dir)).unwrap();
        let header = image.read_header().unwrap();

        assert_eq!(header.kind(), RomKind::GameBoyAdvance);
        assert_eq!(header.title(), "POKEMON FIRE");
        assert_eq!(header.software_version(), 0);
        assert_eq!(header.header_checksum(), 0x68);
        match header {
            GameHeader::Gba(h) => assert_eq!(&h.game_code, b"BPRE"),
            other => panic!("unexpected header: {other:?}"),
        }
    }

    #[test]
    fn test_write_header_only_touches_header_bytes() {
        let dir = TempDir::new().unwrap();
        let path = gba_image(&dir);
        let before = fs::read(&path).unwrap();

        let image = RomImage::open(&path).unwrap();
        let mut header = image.read_header().unwrap();
        header.set_title("HACKED").unwrap();
        image.write_header(&header).unwrap();

        let after = fs::read(&path).unwrap();
        assert_eq!(after.len(), before.len());
        assert_eq!(&after[..0xA0], &before[..0xA0]);
        assert_eq!(&after[0xA0..0xAC], b"HACKED\0\0\0\0\0\0");
        assert_eq!(&after[0xAC..], &before[0xAC..]);
        assert_eq!(image.read_header().unwrap().title(), "HACKED");
    }

    #[test]
    fn test_truncated_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny.gb");
        fs::write(&path, vec![0u8; 0x140]).unwrap();

        let image = RomImage::open(&path).unwrap();
        assert!(matches!(
            image.read_header(),
            Err(Error::SizeMismatch {
                expected: 28,
                actual: 12,
                ..
            })
        ));
    }

    #[test]
    fn test_header_kind_mismatch() {
        let dir = TempDir::new().unwrap();
        let image = RomImage::open(&gba_image(&dir)).unwrap();
        let gb = GameHeader::decode(RomKind::GameBoy, &[0u8; 28]).unwrap();

        assert!(matches!(
            image.write_header(&gb),
            Err(Error::HeaderKindMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_format() {
        assert!(matches!(
            RomImage::open(Path::new("save.sav")),
            Err(Error::UnknownRomFormat { .. })
        ));
    }
}
