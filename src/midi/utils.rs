/// Decode a variable-length quantity starting at `offset`.
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// data ends before the terminating byte (high bit clear) is reached.
/// At most four bytes are read, as SMF quantities are limited to 28 bits.
pub fn decode_variable_length(data: &[u8], offset: usize) -> Option<(u32, usize)> {
    let mut result = 0u32;
    for (i, &byte) in data.get(offset..)?.iter().take(4).enumerate() {
        result = (result << 7) | u32::from(byte & 0x7F);
        if (byte & 0x80) == 0 {
            return Some((result, i + 1));
        }
    }
    None
}

/// Append `value` to `out` as a variable-length quantity.
pub fn encode_variable_length(value: u32, out: &mut Vec<u8>) {
    let value = value & 0x0FFF_FFFF;
    let mut buf = [0u8; 4];
    let mut len = 0;
    let mut rest = value;
    loop {
        buf[len] = (rest & 0x7F) as u8;
        len += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    for i in (0..len).rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        out.push(buf[i] | continuation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_values() {
        let cases: [(u32, &[u8]); 6] = [
            (0, &[0x00]),
            (0x40, &[0x40]),
            (0x7F, &[0x7F]),
            (0x80, &[0x81, 0x00]),
            (0x2000, &[0xC0, 0x00]),
            (0x0FFF_FFFF, &[0xFF, 0xFF, 0xFF, 0x7F]),
        ];
        for (value, bytes) in cases {
            let mut out = Vec::new();
            encode_variable_length(value, &mut out);
            assert_eq!(out, bytes, "encoding {value:#x}");
            assert_eq!(decode_variable_length(bytes, 0), Some((value, bytes.len())));
        }
    }

    #[test]
    fn decode_stops_at_truncated_input() {
        assert_eq!(decode_variable_length(&[0x81], 0), None);
        assert_eq!(decode_variable_length(&[0x00], 1), None);
        assert_eq!(decode_variable_length(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F], 0), None);
    }

    #[test]
    fn decode_respects_offset() {
        assert_eq!(decode_variable_length(&[0x90, 0x83, 0x60], 1), Some((0x1E0, 2)));
    }
}
