//! Unsigned LEB128 varints used as slot keys.
//!
//! Seven payload bits per byte, least significant group first, high bit set
//! on every byte but the last. Encodings are always minimal, so each slot has
//! exactly one key.

/// Longest encoding of a `u64`.
pub const MAX_LEN: usize = 10;

/// Encode `value` into its minimal varint form.
pub fn encode(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_LEN);
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
    out
}

/// Decode a varint that spans all of `bytes`.
///
/// Returns `None` on truncation, overflow, trailing bytes or a non-minimal
/// encoding.
pub fn decode(bytes: &[u8]) -> Option<u64> {
    let mut value = 0u64;
    for (i, &byte) in bytes.iter().enumerate() {
        if i >= MAX_LEN {
            return None;
        }
        let group = u64::from(byte & 0x7f);
        if i == MAX_LEN - 1 && group > 1 {
            return None;
        }
        value |= group << (7 * i);

        if byte & 0x80 == 0 {
            let last = i + 1 == bytes.len();
            let minimal = i == 0 || byte != 0;
            return (last && minimal).then_some(value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_encodings() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(1), vec![0x01]);
        assert_eq!(encode(127), vec![0x7f]);
        assert_eq!(encode(128), vec![0x80, 0x01]);
        assert_eq!(encode(300), vec![0xac, 0x02]);
        assert_eq!(encode(u64::MAX).len(), MAX_LEN);
    }

    #[test]
    fn test_decode_inverts_encode() {
        for value in [0, 1, 127, 128, 16_383, 16_384, 1 << 35, u64::MAX] {
            assert_eq!(decode(&encode(value)), Some(value), "value {}", value);
        }
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(decode(&[]), None);
        // Continuation bit with nothing after it.
        assert_eq!(decode(&[0x80]), None);
        // Trailing byte.
        assert_eq!(decode(&[0x01, 0x01]), None);
        // Padded form of 1.
        assert_eq!(decode(&[0x81, 0x00]), None);
        // Eleven bytes.
        assert_eq!(decode(&[0xff; 11]), None);
        // Tenth byte overflows 64 bits.
        let mut overflow = vec![0xff; 9];
        overflow.push(0x02);
        assert_eq!(decode(&overflow), None);
    }
}
