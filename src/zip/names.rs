//! Entry name decoding.
//!
//! Names are IBM437 unless the language encoding flag (bit 11) is set, in
//! which case they are UTF-8.

/// IBM437 code points for bytes `0x80..=0xFF`; the lower half is ASCII
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00A0}',
];

/// Decode IBM437 bytes; every byte maps to exactly one character.
pub fn decode_cp437(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b < 0x80 {
                b as char
            } else {
                CP437_HIGH[(b - 0x80) as usize]
            }
        })
        .collect()
}

/// Decode an entry name according to its general purpose flags.
pub fn decode_entry_name(bytes: &[u8], utf8: bool) -> String {
    if utf8 {
        // Use lossy conversion to handle malformed names gracefully
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        decode_cp437(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_is_unchanged() {
        assert_eq!(decode_cp437(b"update/tool.exe"), "update/tool.exe");
    }

    #[test]
    fn test_cp437_high_half() {
        assert_eq!(decode_cp437(&[0x80, 0x81, 0x82]), "Çüé");
        assert_eq!(decode_cp437(&[0x50, 0x94, 0x6B, 0xE9]), "PökΘ");
        assert_eq!(decode_cp437(&[0xFF]), "\u{00A0}");
    }

    #[test]
    fn test_flag_selects_encoding() {
        let utf8 = "Pokémon.txt".as_bytes();
        assert_eq!(decode_entry_name(utf8, true), "Pokémon.txt");
        // The same bytes read as IBM437 give box-drawing characters
        assert_eq!(decode_entry_name(utf8, false), "Pok├⌐mon.txt");
    }
}
