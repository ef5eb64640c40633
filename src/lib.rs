#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod bits;
pub mod config;
pub mod cursor;
pub mod dynamic;
pub mod error;
pub mod ext3;
pub mod flags_fields;
pub mod framework;
pub mod ip;
pub mod packet_type;
pub mod profile;
pub mod trace;

pub mod prelude {
    //! Common imports for callers driving a decompressor context.
    pub use crate::bits::{ExtractedBits, IpHeaderBits};
    pub use crate::config::DecompressorConfig;
    pub use crate::error::ParseError;
    pub use crate::framework::{DecodedIp, PersistentContext, Profile, VolatileContext};
    pub use crate::ip::{IpAddress, IpHeaderState, IpVersion};
    pub use crate::packet_type::PacketType;
    pub use crate::profile::{create_context, destroy_context, IpProfile, ProfileHooks, HOOKS};
    pub use crate::trace::{TraceCallback, TraceEvent, TraceLevel};
}
