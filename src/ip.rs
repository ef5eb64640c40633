//! IP header data model
//
// Per-header IP state: RND flag and last decoded IP-ID per header.
// This module supplies the representation, following the field set
// of `binator_network::ipv4::IPv4Header` and the address shape of
// `lpwan::sixlo::headers::V6Addr`.

/// IP version of a (de)compressed header.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IpVersion {
    V4,
    V6,
}

/// An IPv4 or IPv6 address.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IpAddress {
    V4([u8; 4]),
    V6([u8; 16]),
}

impl IpAddress {
    pub fn version(&self) -> IpVersion {
        match self {
            IpAddress::V4(_) => IpVersion::V4,
            IpAddress::V6(_) => IpVersion::V6,
        }
    }
}

/// Persistent per-IP-header context state: the pieces of RFC 3095's
/// generic header state that the IP-only extension-3 parser needs to
/// decide where a decoded IP-ID belongs.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IpHeaderState {
    pub version: IpVersion,
    /// RFC 3095 "random IP-ID" flag: when set, this header's IP-ID is
    /// transmitted uncompressed and is not subject to delta decoding.
    pub rnd: bool,
    /// Last IP-ID decoded for this header (IPv4 only; meaningless for
    /// v6, kept at 0).
    pub last_id: u16,
}

impl Default for IpHeaderState {
    fn default() -> Self {
        Self {
            version: IpVersion::V4,
            rnd: false,
            last_id: 0,
        }
    }
}

impl IpHeaderState {
    /// True when this header is IPv4 and its IP-ID is not random,
    /// i.e. it is a legal target for a decoded extension-3 IP-ID.
    pub fn is_ipv4_non_rnd_pkt(&self) -> bool {
        self.version == IpVersion::V4 && !self.rnd
    }
}
