//! Generic IP header flags/fields parser
//
// `InnerHdrFlagsFieldsParser` is a thin wrapper over this generic
// header-flags-fields parser. Bitflags-driven conditional field
// parsing follows `sixlo::headers::{IphcFlags0, IphcFlags1, Hc1Flags}`.

use crate::bits::IpHeaderBits;
use crate::cursor::BitCursor;
use crate::error::ParseError;
use crate::ip::IpVersion;
use crate::trace::{report, TraceCallback, TraceEvent, TraceLevel};

bitflags::bitflags! {
    /// Per-header flags byte: which generic IP fields are carried
    /// inline in the fields region that follows.
    pub struct HeaderFlags: u8 {
        const TOS      = 0b1000_0000;
        const TTL      = 0b0100_0000;
        const PROTOCOL = 0b0010_0000;
        const ADDRESS  = 0b0001_0000;
        /// Must be zero; only the inner-header wrapper enforces this.
        const RESERVED = 0b0000_1000;
    }
}

/// Parse the fields region selected by `flags` into an
/// [`IpHeaderBits`], advancing `cursor` past whichever fields are
/// present. Returns the number of bytes consumed from the fields
/// region.
pub fn parse_flags_fields(
    flags: HeaderFlags,
    cursor: &mut BitCursor,
    version: IpVersion,
) -> Result<(IpHeaderBits, usize), ParseError> {
    let start = cursor.consumed();
    let mut bits = IpHeaderBits::default();

    if flags.contains(HeaderFlags::TOS) {
        bits.tos = Some(cursor.take_u8()?);
    }
    if flags.contains(HeaderFlags::TTL) {
        bits.ttl = Some(cursor.take_u8()?);
    }
    if flags.contains(HeaderFlags::PROTOCOL) {
        bits.protocol = Some(cursor.take_u8()?);
    }
    if flags.contains(HeaderFlags::ADDRESS) {
        bits.address = Some(match version {
            IpVersion::V4 => {
                let b = cursor.take_bytes(4)?;
                crate::ip::IpAddress::V4([b[0], b[1], b[2], b[3]])
            }
            IpVersion::V6 => {
                let b = cursor.take_bytes(16)?;
                let mut a = [0u8; 16];
                a.copy_from_slice(b);
                crate::ip::IpAddress::V6(a)
            }
        });
    }

    Ok((bits, cursor.consumed() - start))
}

/// Thin wrapper over [`parse_flags_fields`] for the inner IP header:
/// the reserved flag bit must be zero.
pub fn parse_inner_flags_fields(
    flags_byte: u8,
    cursor: &mut BitCursor,
    version: IpVersion,
    trace: Option<TraceCallback>,
    strict: bool,
) -> Result<(IpHeaderBits, usize), ParseError> {
    let flags = HeaderFlags::from_bits_truncate(flags_byte);

    if flags.contains(HeaderFlags::RESERVED) {
        report(trace, TraceLevel::Warn, TraceEvent::ReservedFlagSet);
        if strict {
            return Err(ParseError::MalformedReservedFlag);
        }
    }

    parse_flags_fields(flags, cursor, version)
}
