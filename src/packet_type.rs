//! ROHC packet-type discrimination from the leading byte
//
// Mirrors the bit-prefix enum + mask style of `sixlo::headers::{HeaderType,
// DispatchBits}`, generalized to the five overlapping UO-0/UO-1/UOR-2/
// IR-DYN/IR prefixes.

/// Discriminated ROHC packet format.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketType {
    Uo0,
    Uo1,
    Uor2,
    IrDyn,
    Ir,
    Unknown,
}

const UO0_MASK: u8 = 0b1000_0000;
const UO0_VALUE: u8 = 0b0000_0000;

const UO1_MASK: u8 = 0b1100_0000;
const UO1_VALUE: u8 = 0b1000_0000;

const UOR2_MASK: u8 = 0b1110_0000;
const UOR2_VALUE: u8 = 0b1100_0000;

const IR_DYN_BYTE: u8 = 0b1111_1000;

const IR_MASK: u8 = 0b1111_1110;
const IR_VALUE: u8 = 0b1111_1100;

/// Map the first byte of a (CID-stripped) ROHC packet to a
/// [`PacketType`]. Total and side-effect-free; depends only on
/// `packet[0]`.
///
/// Precedence is fixed and must be evaluated in this exact order: the
/// narrower UO-0/UO-1/UOR-2 prefixes are tested before the `111111xx`
/// space shared by IR and IR-DYN.
pub fn detect_packet_type(packet: &[u8]) -> PacketType {
    let b = match packet.first() {
        Some(b) => *b,
        None => return PacketType::Unknown,
    };

    if b & UO0_MASK == UO0_VALUE {
        PacketType::Uo0
    } else if b & UO1_MASK == UO1_VALUE {
        PacketType::Uo1
    } else if b & UOR2_MASK == UOR2_VALUE {
        PacketType::Uor2
    } else if b == IR_DYN_BYTE {
        PacketType::IrDyn
    } else if b & IR_MASK == IR_VALUE {
        PacketType::Ir
    } else {
        PacketType::Unknown
    }
}
