//! IP-only dynamic chain parser
//
// Wire format: two big-endian bytes, `SN[15:0]`. Field-read style
// follows `sixlo::headers::FragHeader::decode`'s fixed-width reads
// with an offset return.

use crate::bits::ExtractedBits;
use crate::cursor::BitCursor;
use crate::error::ParseError;

/// Parse the IP-only dynamic chain for one IP header: a 16-bit
/// master sequence number, absolute (not LSB-encoded).
///
/// Returns the number of bytes consumed (always 2 on success).
pub fn parse_dynamic_ip(buf: &[u8], bits: &mut ExtractedBits) -> Result<usize, ParseError> {
    let mut cursor = BitCursor::new(buf);
    let sn = cursor.take_u16_be()?;

    bits.sn = sn;
    bits.sn_nr = 16;
    bits.is_sn_enc = false;

    Ok(cursor.consumed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s3_dynamic_ip_sn() {
        let mut bits = ExtractedBits::default();
        let n = parse_dynamic_ip(&[0x12, 0x34], &mut bits).unwrap();
        assert_eq!(n, 2);
        assert_eq!(bits.sn, 0x1234);
        assert_eq!(bits.sn_nr, 16);
        assert!(!bits.is_sn_enc);
    }

    #[test]
    fn too_short_is_rejected() {
        let mut bits = ExtractedBits::default();
        assert_eq!(
            parse_dynamic_ip(&[0x12], &mut bits),
            Err(ParseError::TooShort)
        );
        assert_eq!(
            parse_dynamic_ip(&[], &mut bits),
            Err(ParseError::TooShort)
        );
    }

    /// Round-trip property, densely enumerated over the high byte.
    #[test]
    fn round_trips_every_high_byte() {
        for hi in 0u8..=255 {
            let mut bits = ExtractedBits::default();
            let buf = [hi, 0xAB];
            let n = parse_dynamic_ip(&buf, &mut bits).unwrap();
            assert_eq!(n, 2);
            assert_eq!(bits.sn, u16::from_be_bytes([hi, 0xAB]));
        }
    }
}
