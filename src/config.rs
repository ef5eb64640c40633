//! Decompressor configuration
//
// Follows the struct-with-`Default`-impl pattern used for
// `FragConfig`/`SixLoConfig`. The decompressor's strictness is a
// runtime configuration field rather than a compile-time flag.

/// Per-decompressor runtime configuration.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecompressorConfig {
    /// When true, `MalformedReservedFlag`, `MalformedMode` and
    /// `IpIdAlreadySet` diagnostics become fatal parse errors instead
    /// of warn-and-continue.
    pub strict_decompressor: bool,
}

impl Default for DecompressorConfig {
    fn default() -> Self {
        Self {
            strict_decompressor: false,
        }
    }
}
