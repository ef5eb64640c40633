//! Per-packet extracted-bits aggregate
//
// Generalizes the `Header{mesh,bcast,frag}` aggregate-of-optionals
// shape of `sixlo::headers::Header`, but every field here is always
// present (defaulted), since downstream `decode_bits`/`build_hdrs`
// need to distinguish "present with N valid bits" from "absent".

use crate::ip::IpAddress;

/// Bits extracted for one IP header (inner or outer) during a single
/// packet parse.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IpHeaderBits {
    /// IP-ID bits, up to 16.
    pub id: u16,
    /// Number of valid bits in `id` (0, 8 or 16).
    pub id_nr: u8,
    /// Whether `id` is LSB-encoded (true) or an absolute value (false).
    pub is_id_enc: bool,

    /// Traffic-class / type-of-service octet, if carried in this
    /// packet.
    pub tos: Option<u8>,
    /// Hop-limit / time-to-live, if carried in this packet.
    pub ttl: Option<u8>,
    /// Next-header / protocol number, if carried in this packet.
    pub protocol: Option<u8>,
    /// Source or destination address, if carried in this packet.
    pub address: Option<IpAddress>,
}

impl IpHeaderBits {
    /// True once an earlier stage has already populated the IP-ID:
    /// the target header's `id_nr` must be zero for a fresh
    /// assignment, and a non-zero prior value is malformed.
    pub fn has_prior_id(&self) -> bool {
        self.id_nr > 0 && self.id != 0
    }
}

/// Aggregate of all bits extracted while parsing one ROHC packet.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExtractedBits {
    /// Master sequence number bits, up to 16.
    pub sn: u16,
    /// Number of valid bits in `sn` (0, 8 or 16).
    pub sn_nr: u8,
    /// Whether `sn` is LSB-encoded (true) or an absolute value
    /// (false).
    pub is_sn_enc: bool,

    /// ROHC mode bits (1=U, 2=O, 3=R; 0 reserved).
    pub mode: u8,
    /// Number of valid bits in `mode` (0 or 2).
    pub mode_nr: u8,

    /// Latched from context before extension-3 parsing: does the flow
    /// carry two stacked IP headers?
    pub multiple_ip: bool,

    pub inner_ip: IpHeaderBits,
    pub outer_ip: IpHeaderBits,
}

impl Default for ExtractedBits {
    fn default() -> Self {
        Self {
            sn: 0,
            sn_nr: 0,
            is_sn_enc: false,
            mode: 0,
            mode_nr: 0,
            multiple_ip: false,
            inner_ip: IpHeaderBits::default(),
            outer_ip: IpHeaderBits::default(),
        }
    }
}
