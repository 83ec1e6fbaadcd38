//! PRG file loader.
//!
//! A PRG file is a 2-byte little-endian load address followed by the
//! data bytes. After copying, the BASIC pointers are patched so that the
//! interpreter sees the program as if it had been LOADed.

#![allow(clippy::cast_possible_truncation)]

use emu_core::Bus;
use tracing::debug;

use crate::error::LoadError;

/// Start of BASIC variables (VARTAB).
const VARTAB: u16 = 0x002D;
/// Start of BASIC arrays (ARYTAB).
const ARYTAB: u16 = 0x002F;
/// End of BASIC arrays (STREND).
const STREND: u16 = 0x0031;
/// Load/save start pointer, cleared after a load.
const LOAD_START: u16 = 0x00AC;
/// End of the loaded program.
const LOAD_END: u16 = 0x00AE;

/// Where a program landed in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedProgram {
    /// First byte written.
    pub start: u16,
    /// One past the last byte written.
    pub end: u16,
}

impl LoadedProgram {
    /// Number of bytes loaded.
    #[must_use]
    pub fn len(&self) -> u16 {
        self.end.wrapping_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Load a PRG image through `bus` and patch the BASIC pointers.
///
/// # Errors
///
/// Returns [`LoadError::ProgramTooShort`] when there is no data after the
/// load address. Nothing is written in that case.
pub fn load_prg<B: Bus + ?Sized>(bus: &mut B, data: &[u8]) -> Result<LoadedProgram, LoadError> {
    let [lo, hi, payload @ ..] = data else {
        return Err(LoadError::ProgramTooShort { len: data.len() });
    };
    if payload.is_empty() {
        return Err(LoadError::ProgramTooShort { len: data.len() });
    }

    let start = u16::from_le_bytes([*lo, *hi]);
    for (i, &byte) in payload.iter().enumerate() {
        bus.write(start.wrapping_add(i as u16), byte);
    }
    let end = start.wrapping_add(payload.len() as u16);

    for pointer in [VARTAB, ARYTAB, STREND, LOAD_END] {
        bus.write_word(pointer, end);
    }
    bus.write_word(LOAD_START, 0);

    debug!(start = format_args!("${start:04X}"), end = format_args!("${end:04X}"), "program loaded");
    Ok(LoadedProgram { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlatBus {
        ram: Vec<u8>,
        writes: usize,
    }

    impl FlatBus {
        fn new() -> Self {
            Self {
                ram: vec![0; 0x10000],
                writes: 0,
            }
        }
    }

    impl Bus for FlatBus {
        fn read(&mut self, address: u16) -> u8 {
            self.ram[usize::from(address)]
        }

        fn write(&mut self, address: u16, value: u8) {
            self.writes += 1;
            self.ram[usize::from(address)] = value;
        }
    }

    #[test]
    fn loads_payload_and_patches_pointers() {
        let mut bus = FlatBus::new();
        bus.ram[0xAC] = 0x55;
        bus.ram[0xAD] = 0x66;

        let program = load_prg(&mut bus, &[0x01, 0x10, 0xAA, 0xBB, 0xCC]).expect("load");
        assert_eq!(program, LoadedProgram { start: 0x1001, end: 0x1004 });
        assert_eq!(program.len(), 3);

        assert_eq!(bus.read(0x1000), 0x00);
        assert_eq!(bus.read(0x1001), 0xAA);
        assert_eq!(bus.read(0x1002), 0xBB);
        assert_eq!(bus.read(0x1003), 0xCC);
        assert_eq!(bus.read(0x1004), 0x00);

        for pointer in [0x2D, 0x2F, 0x31, 0xAE] {
            assert_eq!(bus.read_word(pointer), 0x1004, "pointer ${pointer:02X}");
        }
        assert_eq!(bus.read_word(0xAC), 0x0000);
    }

    #[test]
    fn too_short_writes_nothing() {
        for data in [&[][..], &[0x01][..], &[0x01, 0x10][..]] {
            let mut bus = FlatBus::new();
            assert_eq!(
                load_prg(&mut bus, data),
                Err(LoadError::ProgramTooShort { len: data.len() })
            );
            assert_eq!(bus.writes, 0);
        }
    }

    #[test]
    fn end_address_wraps() {
        let mut bus = FlatBus::new();
        let program = load_prg(&mut bus, &[0xFF, 0xFF, 0x11, 0x22]).expect("load");
        assert_eq!(program.end, 0x0001);
        assert_eq!(bus.read(0xFFFF), 0x11);
        assert_eq!(bus.read(0x0000), 0x22);
    }
}
