//! Diagnostic trace callback
//
// The framework supplies a trace callback at context-creation time so
// it can receive ordered warnings as packets are parsed. Kept as a
// plain function pointer, the same no-allocation, no-dyn style used
// throughout this crate (fn-pointer and generic-trait-bound
// capabilities, never `Box<dyn _>`), so a `PersistentContext`
// carrying one stays `Copy` and fits in the fn-pointer `ProfileHooks`
// registration record unmodified.

use core::fmt::{self, Display, Formatter};

/// Severity of a diagnostic raised during parsing.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TraceLevel {
    Warn,
    Info,
}

/// One diagnostic event, reported to the framework's trace callback
/// and mirrored to the `log` crate.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TraceEvent {
    /// Extension-3 mode field was 0.
    ReservedModeZero,
    /// Inner-header reserved flag bit was set.
    ReservedFlagSet,
    /// IP-ID target already carried a non-zero decoded value.
    IpIdAlreadyUpdated,
}

impl Display for TraceEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::ReservedModeZero => write!(f, "extension-3 mode field is reserved (0)"),
            TraceEvent::ReservedFlagSet => {
                write!(f, "inner-header reserved flag bit is non-zero")
            }
            TraceEvent::IpIdAlreadyUpdated => {
                write!(f, "IP-ID already updated for target header, overwriting")
            }
        }
    }
}

/// Function pointer the framework wires into a context at creation
/// time.
pub type TraceCallback = fn(TraceLevel, TraceEvent);

/// Report a diagnostic to both the injected callback (if any) and the
/// ambient `log` crate.
pub fn report(callback: Option<TraceCallback>, level: TraceLevel, event: TraceEvent) {
    if let Some(cb) = callback {
        cb(level, event);
    }
    match level {
        TraceLevel::Warn => log::warn!("{}", event),
        TraceLevel::Info => log::info!("{}", event),
    }
}
