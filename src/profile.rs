//! IP-only profile registration (RFC 3843, profile ID 0x0004)
//
// The external interface is a table of callback-valued fields the
// framework takes a stable reference to at startup. Kept as a literal
// fn-pointer struct to match that description, but the actual
// per-packet work happens through the `Profile` capability interface
// in `framework`: `IpProfile` is the implementor `ProfileHooks`'
// function pointers delegate to.

use crate::bits::ExtractedBits;
use crate::config::DecompressorConfig;
use crate::dynamic::parse_dynamic_ip;
use crate::error::ParseError;
use crate::ext3::{parse_ext3, Ext3Context};
use crate::framework::{
    attempt_repair, build_hdrs, decode_bits, get_sn, parse_pkt, update_ctxt, DecodedIp,
    PersistentContext, Profile, VolatileContext,
};
use crate::packet_type::{detect_packet_type, PacketType};
use crate::trace::TraceCallback;

/// `id = 0x0004` from RFC 3843.
pub const PROFILE_ID: u8 = 0x0004;
/// This profile's master sequence number is fixed at 16 bits.
pub const MSN_MAX_BITS: u8 = 16;

/// The IP-only profile: stateless, since all per-flow state lives in
/// [`PersistentContext`]/[`VolatileContext`].
pub struct IpProfile;

impl Profile for IpProfile {
    fn id(&self) -> u8 {
        PROFILE_ID
    }

    fn msn_max_bits(&self) -> u8 {
        MSN_MAX_BITS
    }

    fn detect_pkt_type(&self, buf: &[u8]) -> PacketType {
        detect_packet_type(buf)
    }

    fn parse_dyn_next_hdr(&self, buf: &[u8], bits: &mut ExtractedBits) -> Result<usize, ParseError> {
        parse_dynamic_ip(buf, bits)
    }

    fn parse_ext3(
        &self,
        buf: &[u8],
        bits: &mut ExtractedBits,
        ctx: &Ext3Context,
    ) -> Result<usize, ParseError> {
        parse_ext3(buf, bits, ctx)
    }
}

/// Allocate the persistent context, wire the trace callback, set the
/// SN LSB window to 16 bits. The profile-ID and window width are
/// implied by [`IpProfile`] rather than stored redundantly on the
/// context.
pub fn create_context(config: DecompressorConfig, trace: Option<TraceCallback>) -> PersistentContext {
    PersistentContext::new(config, trace)
}

/// Release persistent and volatile contexts. With no heap allocation
/// in this implementation, destruction is just drop order; this
/// function exists so the hook table has a concrete symbol to
/// register, matching the framework's lifecycle contract.
pub fn destroy_context(_ctx: PersistentContext, _volatile: VolatileContext) {}

/// Profile registration record: a table of callback-valued fields the
/// framework holds a stable reference to.
pub struct ProfileHooks {
    pub id: u8,
    pub msn_max_bits: u8,
    pub detect_pkt_type: fn(&[u8]) -> PacketType,
    pub parse_pkt: fn(&dyn Profile, &PersistentContext, &[u8]) -> Result<ExtractedBits, ParseError>,
    pub decode_bits: fn(&PersistentContext, &ExtractedBits) -> DecodedIp,
    pub build_hdrs: fn(&DecodedIp, &mut [u8]) -> usize,
    pub update_ctxt: fn(&mut PersistentContext, &DecodedIp),
    pub attempt_repair: fn(&PersistentContext, &ExtractedBits) -> Option<ExtractedBits>,
    pub get_sn: fn(&PersistentContext) -> u16,
}

/// The registration record for this profile. `new_context`/
/// `free_context` are not fn-pointer fields here since they need the
/// per-call `config`/`trace` arguments; callers invoke
/// [`create_context`]/[`destroy_context`] directly, as the framework
/// would at CID setup and eviction.
pub const HOOKS: ProfileHooks = ProfileHooks {
    id: PROFILE_ID,
    msn_max_bits: MSN_MAX_BITS,
    detect_pkt_type: detect_packet_type,
    parse_pkt,
    decode_bits,
    build_hdrs,
    update_ctxt,
    attempt_repair,
    get_sn,
};
