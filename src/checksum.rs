//! CRC-32 checksum.
//!
//! Standard reflected CRC-32 (ISO-HDLC, the one used by ZIP) with the
//! polynomial `0xEDB88320`. The lookup table is built at compile time.

/// Reflected CRC-32 polynomial
const POLY_REFLECTED: u32 = 0xEDB8_8320;

/// Byte-indexed lookup table
static TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (POLY_REFLECTED & mask);
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Compute the CRC-32 of `data`.
///
/// # Examples
///
/// ```
/// assert_eq!(romforge::crc32(b"123456789"), 0xCBF4_3926);
/// ```
pub fn crc32(data: &[u8]) -> u32 {
    let crc = data.iter().fold(0xFFFF_FFFFu32, |crc, &b| {
        TABLE[((crc ^ b as u32) & 0xFF) as usize] ^ (crc >> 8)
    });
    !crc
}
