//! Error types for machine construction and image loading.
//!
//! Bus accesses never fail; only configuration and loaders do.

use thiserror::Error;

/// Construction failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Vic20Error {
    /// A ROM image has the wrong length.
    #[error("{name} ROM must be {expected} bytes, got {actual}")]
    RomSize {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Program or cartridge image rejected by a loader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// A program image needs a load address plus at least one byte.
    #[error("program image too short ({len} bytes, need at least 3)")]
    ProgramTooShort { len: usize },

    /// No slot was given and the image length does not carry a header.
    #[error("cartridge image of {len} bytes has no load address header; pass a slot")]
    MissingCartridgeAddress { len: usize },

    /// The header names an address no cartridge slot decodes.
    #[error("unsupported cartridge load address ${0:04X}")]
    UnsupportedCartridgeAddress(u16),
}
