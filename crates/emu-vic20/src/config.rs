//! VIC-20 configuration: ROM images and memory expansion.

use crate::error::Vic20Error;

/// Kernal ROM length.
pub const KERNAL_ROM_SIZE: usize = 8192;
/// BASIC ROM length.
pub const BASIC_ROM_SIZE: usize = 8192;
/// Character ROM length.
pub const CHAR_ROM_SIZE: usize = 4096;

/// Number of expansion RAM blocks.
pub const RAM_BLOCKS: usize = 5;

/// RAM expansion presets.
///
/// Each preset fills a fixed set of the five expansion blocks:
///
/// | Block | Range         | Size |
/// |-------|---------------|------|
/// | 0     | $0400-$0FFF   | 3K   |
/// | 1     | $2000-$3FFF   | 8K   |
/// | 2     | $4000-$5FFF   | 8K   |
/// | 3     | $6000-$7FFF   | 8K   |
/// | 4     | $A000-$BFFF   | 8K   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RamExpansion {
    /// Stock 5K machine.
    #[default]
    Unexpanded,
    /// +3K: block 0.
    Ram3K,
    /// +8K: block 1.
    Ram8K,
    /// +16K: blocks 1-2.
    Ram16K,
    /// +24K: blocks 1-3.
    Ram24K,
    /// +27K: blocks 0-3.
    Ram27K,
    /// +32K: blocks 1-4.
    Ram32K,
    /// +35K: all five blocks.
    Ram35K,
}

impl RamExpansion {
    /// Which expansion blocks are present, indexed 0-4.
    #[must_use]
    pub const fn blocks(self) -> [bool; RAM_BLOCKS] {
        match self {
            Self::Unexpanded => [false, false, false, false, false],
            Self::Ram3K => [true, false, false, false, false],
            Self::Ram8K => [false, true, false, false, false],
            Self::Ram16K => [false, true, true, false, false],
            Self::Ram24K => [false, true, true, true, false],
            Self::Ram27K => [true, true, true, true, false],
            Self::Ram32K => [false, true, true, true, true],
            Self::Ram35K => [true, true, true, true, true],
        }
    }

    /// Extra RAM in kilobytes.
    #[must_use]
    pub const fn kilobytes(self) -> u16 {
        match self {
            Self::Unexpanded => 0,
            Self::Ram3K => 3,
            Self::Ram8K => 8,
            Self::Ram16K => 16,
            Self::Ram24K => 24,
            Self::Ram27K => 27,
            Self::Ram32K => 32,
            Self::Ram35K => 35,
        }
    }
}

/// Configuration for constructing a VIC-20 instance.
#[derive(Debug, Clone)]
pub struct Vic20Config {
    /// Kernal ROM (8,192 bytes, mapped at $E000).
    pub kernal_rom: Vec<u8>,
    /// BASIC ROM (8,192 bytes, mapped at $C000).
    pub basic_rom: Vec<u8>,
    /// Character ROM (4,096 bytes, mapped at $8000).
    pub char_rom: Vec<u8>,
    /// Expansion RAM fitted at power-on.
    pub ram_expansion: RamExpansion,
}

impl Vic20Config {
    /// Check every ROM image has its exact hardware size.
    pub fn validate(&self) -> Result<(), Vic20Error> {
        check_rom("KERNAL", &self.kernal_rom, KERNAL_ROM_SIZE)?;
        check_rom("BASIC", &self.basic_rom, BASIC_ROM_SIZE)?;
        check_rom("character", &self.char_rom, CHAR_ROM_SIZE)
    }
}

fn check_rom(name: &'static str, rom: &[u8], expected: usize) -> Result<(), Vic20Error> {
    if rom.len() == expected {
        Ok(())
    } else {
        Err(Vic20Error::RomSize {
            name,
            expected,
            actual: rom.len(),
        })
    }
}
