//! Cartridge header layouts.
//!
//! Text fields are fixed-width byte arrays copied verbatim; padding bytes
//! survive a decode/encode cycle untouched. Multi-byte integers are
//! little-endian like every other record in the crate.

use crate::error::{Error, Result};
use crate::record::{BinaryRecord, RecordReader, RecordWriter};

/// Game Boy header, 28 bytes at `0x134`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GbHeader {
    pub title: [u8; 16],
    pub reserved: [u8; 3],
    pub cartridge_type: u8,
    pub rom_size: u8,
    pub ram_size: u8,
    pub destination_code: u8,
    pub licensee_code: u8,
    pub software_version: u8,
    pub header_checksum: u8,
    pub global_checksum: u16,
}

impl BinaryRecord for GbHeader {
    const NAME: &'static str = "Game Boy header";
    const SIZE: usize = 28;

    fn read_fields(r: &mut RecordReader<'_>) -> Result<Self> {
        Ok(Self {
            title: r.array()?,
            reserved: r.array()?,
            cartridge_type: r.u8()?,
            rom_size: r.u8()?,
            ram_size: r.u8()?,
            destination_code: r.u8()?,
            licensee_code: r.u8()?,
            software_version: r.u8()?,
            header_checksum: r.u8()?,
            global_checksum: r.u16()?,
        })
    }

    fn write_fields(&self, w: &mut RecordWriter) {
        w.bytes(&self.title);
        w.bytes(&self.reserved);
        w.u8(self.cartridge_type);
        w.u8(self.rom_size);
        w.u8(self.ram_size);
        w.u8(self.destination_code);
        w.u8(self.licensee_code);
        w.u8(self.software_version);
        w.u8(self.header_checksum);
        w.u16(self.global_checksum);
    }
}

/// Super Game Boy header, 28 bytes at `0x134`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SgbHeader {
    pub title: [u8; 16],
    pub licensee_code_new: [u8; 2],
    pub sgb_flag: u8,
    pub cartridge_type: u8,
    pub rom_size: u8,
    pub ram_size: u8,
    pub destination_code: u8,
    pub licensee_code_old: u8,
    pub software_version: u8,
    pub header_checksum: u8,
    pub global_checksum: u16,
}

impl BinaryRecord for SgbHeader {
    const NAME: &'static str = "Super Game Boy header";
    const SIZE: usize = 28;

    fn read_fields(r: &mut RecordReader<'_>) -> Result<Self> {
        Ok(Self {
            title: r.array()?,
            licensee_code_new: r.array()?,
            sgb_flag: r.u8()?,
            cartridge_type: r.u8()?,
            rom_size: r.u8()?,
            ram_size: r.u8()?,
            destination_code: r.u8()?,
            licensee_code_old: r.u8()?,
            software_version: r.u8()?,
            header_checksum: r.u8()?,
            global_checksum: r.u16()?,
        })
    }

    fn write_fields(&self, w: &mut RecordWriter) {
        w.bytes(&self.title);
        w.bytes(&self.licensee_code_new);
        w.u8(self.sgb_flag);
        w.u8(self.cartridge_type);
        w.u8(self.rom_size);
        w.u8(self.ram_size);
        w.u8(self.destination_code);
        w.u8(self.licensee_code_old);
        w.u8(self.software_version);
        w.u8(self.header_checksum);
        w.u16(self.global_checksum);
    }
}

/// Game Boy Color header, 28 bytes at `0x134`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GbcHeader {
    pub title: [u8; 15],
    pub gbc_flag: u8,
    pub licensee_code_new: [u8; 2],
    pub sgb_flag: u8,
    pub cartridge_type: u8,
    pub rom_size: u8,
    pub ram_size: u8,
    pub destination_code: u8,
    pub licensee_code_old: u8,
    pub software_version: u8,
    pub header_checksum: u8,
    pub global_checksum: u16,
}

impl BinaryRecord for GbcHeader {
    const NAME: &'static str = "Game Boy Color header";
    const SIZE: usize = 28;

    fn read_fields(r: &mut RecordReader<'_>) -> Result<Self> {
        Ok(Self {
            title: r.array()?,
            gbc_flag: r.u8()?,
            licensee_code_new: r.array()?,
            sgb_flag: r.u8()?,
            cartridge_type: r.u8()?,
            rom_size: r.u8()?,
            ram_size: r.u8()?,
            destination_code: r.u8()?,
            licensee_code_old: r.u8()?,
            software_version: r.u8()?,
            header_checksum: r.u8()?,
            global_checksum: r.u16()?,
        })
    }

    fn write_fields(&self, w: &mut RecordWriter) {
        w.bytes(&self.title);
        w.u8(self.gbc_flag);
        w.bytes(&self.licensee_code_new);
        w.u8(self.sgb_flag);
        w.u8(self.cartridge_type);
        w.u8(self.rom_size);
        w.u8(self.ram_size);
        w.u8(self.destination_code);
        w.u8(self.licensee_code_old);
        w.u8(self.software_version);
        w.u8(self.header_checksum);
        w.u16(self.global_checksum);
    }
}

/// Game Boy Advance header, 30 bytes at `0xA0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GbaHeader {
    pub title: [u8; 12],
    pub game_code: [u8; 4],
    pub maker_code: [u8; 2],
    pub fixed_value: u8,
    pub main_unit_code: u8,
    pub device_type: u8,
    pub reserved: [u8; 7],
    pub software_version: u8,
    pub header_checksum: u8,
}

impl BinaryRecord for GbaHeader {
    const NAME: &'static str = "Game Boy Advance header";
    const SIZE: usize = 30;

    fn read_fields(r: &mut RecordReader<'_>) -> Result<Self> {
        Ok(Self {
            title: r.array()?,
            game_code: r.array()?,
            maker_code: r.array()?,
            fixed_value: r.u8()?,
            main_unit_code: r.u8()?,
            device_type: r.u8()?,
            reserved: r.array()?,
            software_version: r.u8()?,
            header_checksum: r.u8()?,
        })
    }

    fn write_fields(&self, w: &mut RecordWriter) {
        w.bytes(&self.title);
        w.bytes(&self.game_code);
        w.bytes(&self.maker_code);
        w.u8(self.fixed_value);
        w.u8(self.main_unit_code);
        w.u8(self.device_type);
        w.bytes(&self.reserved);
        w.u8(self.software_version);
        w.u8(self.header_checksum);
    }
}

/// Display form of a fixed-width text field: trailing NULs dropped.
pub fn fixed_text(field: &[u8]) -> String {
    let end = field
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |i| i + 1);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Store `text` into a fixed-width field, NUL-padding the remainder.
pub fn set_fixed_text(field: &mut [u8], text: &str) -> Result<()> {
    let bytes = text.as_bytes();
    if !text.is_ascii() || bytes.len() > field.len() {
        return Err(Error::invalid_argument(format!(
            "'{}' does not fit a {}-byte ASCII field",
            text,
            field.len()
        )));
    }
    field.fill(0);
    field[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use pretty_assertions::assert_eq;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 37 + 11) as u8).collect()
    }

    #[test]
    fn test_byte_round_trips() {
        let bytes = pattern(28);
        assert_eq!(record::encode(&record::decode::<GbHeader>(&bytes).unwrap()), bytes);
        assert_eq!(record::encode(&record::decode::<SgbHeader>(&bytes).unwrap()), bytes);
        assert_eq!(record::encode(&record::decode::<GbcHeader>(&bytes).unwrap()), bytes);

        let bytes = pattern(30);
        assert_eq!(record::encode(&record::decode::<GbaHeader>(&bytes).unwrap()), bytes);
    }

    #[test]
    fn test_gba_field_offsets() {
        let mut bytes = vec![0u8; GbaHeader::SIZE];
        bytes[..7].copy_from_slice(b"POKEMON");
        bytes[8..12].copy_from_slice(b"FIRE");
        bytes[12..16].copy_from_slice(b"BPRE");
        bytes[16..18].copy_from_slice(b"01");
        bytes[18] = 0x96;
        bytes[28] = 0x01;
        bytes[29] = 0x68;

        let header: GbaHeader = record::decode(&bytes).unwrap();
        assert_eq!(&header.title, b"POKEMON\0FIRE");
        assert_eq!(&header.game_code, b"BPRE");
        assert_eq!(&header.maker_code, b"01");
        assert_eq!(header.fixed_value, 0x96);
        assert_eq!(header.software_version, 1);
        assert_eq!(header.header_checksum, 0x68);
        assert_eq!(fixed_text(&header.title), "POKEMON\0FIRE");
    }

    #[test]
    fn test_gb_global_checksum_is_little_endian() {
        let mut bytes = vec![0u8; GbHeader::SIZE];
        bytes[26] = 0x34;
        bytes[27] = 0x12;
        let header: GbHeader = record::decode(&bytes).unwrap();
        assert_eq!(header.global_checksum, 0x1234);
    }

    #[test]
    fn test_gbc_title_and_flag() {
        let mut bytes = vec![0u8; GbcHeader::SIZE];
        bytes[..11].copy_from_slice(b"POKEMON_SLV");
        bytes[15] = 0x80;
        let header: GbcHeader = record::decode(&bytes).unwrap();
        assert_eq!(fixed_text(&header.title), "POKEMON_SLV");
        assert_eq!(header.gbc_flag, 0x80);
    }

    #[test]
    fn test_wrong_size() {
        assert!(matches!(
            record::decode::<GbaHeader>(&[0u8; 28]),
            Err(Error::SizeMismatch {
                expected: 30,
                actual: 28,
                ..
            })
        ));
    }

    #[test]
    fn test_set_fixed_text() {
        let mut field = [0xFFu8; 12];
        set_fixed_text(&mut field, "EMERALD").unwrap();
        assert_eq!(&field, b"EMERALD\0\0\0\0\0");
        assert_eq!(fixed_text(&field), "EMERALD");

        assert!(set_fixed_text(&mut field, "THIRTEEN CHRS").is_err());
        assert!(set_fixed_text(&mut field, "POKéMON").is_err());
    }
}
