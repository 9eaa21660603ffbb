//! Padding-free Base32 codec (RFC 4648 alphabet, uppercase, no `=` emitted).
//!
//! Secrets travel as Base32 strings; this codec is the bit-level contract
//! they round-trip through. Encoding never appends padding, decoding accepts
//! lowercase input and discards trailing bits shorter than a byte.

use crate::OtpError;

/// Lookup table for decode. The trailing `=` is a legacy artifact kept for
/// compatibility: it maps to index 32 and is never produced by [`encode`].
const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567=";

/// Base32-encodes `data` without padding.
///
/// The input is treated as a big-endian bit stream consumed 5 bits at a
/// time; a final group shorter than 5 bits is left-shifted to a full group.
/// Empty input yields an empty string.
pub fn encode(data: &[u8]) -> String {
    let mut encoded = String::with_capacity(data.len().div_ceil(5) * 8);
    let mut remainder: u32 = 0;
    let mut remainder_bits = 0;

    for &byte in data {
        remainder = (remainder << 8) | u32::from(byte);
        remainder_bits += 8;
        while remainder_bits > 4 {
            remainder_bits -= 5;
            let index = (remainder >> remainder_bits) & 31;
            encoded.push(CHARS[index as usize] as char);
        }
    }
    if remainder_bits > 0 {
        let index = (remainder << (5 - remainder_bits)) & 31;
        encoded.push(CHARS[index as usize] as char);
    }

    encoded
}

/// Decodes a padding-free Base32 string back into bytes.
///
/// Case-insensitive. Trailing bits that do not fill a whole byte are
/// discarded, so `decode(&encode(x))` recovers `x` exactly. Any byte outside
/// the alphabet fails with [`OtpError::InvalidEncoding`] carrying the
/// offending ordinal.
pub fn decode(encoded: &str) -> Result<Vec<u8>, OtpError> {
    let encoded = encoded.to_ascii_uppercase();
    let mut decoded = Vec::with_capacity(encoded.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut buffer_bits = 0;

    for byte in encoded.bytes() {
        let index = CHARS
            .iter()
            .position(|&c| c == byte)
            .ok_or(OtpError::InvalidEncoding(byte))?;
        buffer = (buffer << 5) | index as u32;
        buffer_bits += 5;
        if buffer_bits > 7 {
            buffer_bits -= 8;
            decoded.push((buffer >> buffer_bits) as u8);
        }
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{base32, OtpError};

    #[rstest]
    #[case(b"", "")]
    #[case(b"f", "MY")]
    #[case(b"fo", "MZXQ")]
    #[case(b"foo", "MZXW6")]
    #[case(b"foob", "MZXW6YQ")]
    #[case(b"fooba", "MZXW6YTB")]
    #[case(b"foobar", "MZXW6YTBOI")]
    fn encode_test(#[case] input: &[u8], #[case] expected: &str) {
        assert_eq!(expected, base32::encode(input));
    }

    #[rstest]
    #[case(b"This is a test string to be encoded")]
    #[case(b"")]
    #[case(&[0x00])]
    #[case(&[0xff, 0x00, 0xab, 0x12, 0x34])]
    #[case(&[0xde, 0xad, 0xbe, 0xef])]
    fn round_trip_test(#[case] input: &[u8]) {
        assert_eq!(input, base32::decode(&base32::encode(input)).unwrap());
    }

    #[rstest]
    fn encode_matches_rfc4648_nopad() {
        // The hand-rolled bit packing must agree with the reference codec
        // for every input length mod 5.
        for len in 0..=16 {
            let data: Vec<u8> = (0..len).map(|i| (i as u8).wrapping_mul(37)).collect();
            assert_eq!(
                data_encoding::BASE32_NOPAD.encode(&data),
                base32::encode(&data)
            );
        }
    }

    #[rstest]
    fn decode_is_case_insensitive() {
        assert_eq!(b"foobar".to_vec(), base32::decode("mzxw6ytboi").unwrap());
    }

    #[rstest]
    fn decode_rejects_unknown_chars() {
        // 'I'..'D' are all valid letters; the first offender is '0' (#48).
        let err = base32::decode("InvalidEncoded0987").unwrap_err();
        assert!(matches!(err, OtpError::InvalidEncoding(48)));
    }

    #[rstest]
    #[case("A!", 33)]
    #[case("MZXW 6", 32)]
    fn decode_reports_offending_ordinal(#[case] input: &str, #[case] ordinal: u8) {
        let err = base32::decode(input).unwrap_err();
        assert!(matches!(err, OtpError::InvalidEncoding(o) if o == ordinal));
    }
}
