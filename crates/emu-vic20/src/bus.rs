//! VIC-20 bus: memory and I/O routing.
//!
//! Implements `emu_core::Bus` for the VIC-20. The I/O block at
//! $9000-$93FF is decoded here; everything else goes to `Vic20Memory`.
//!
//! | Range       | Chip                                             |
//! |-------------|--------------------------------------------------|
//! | $9000-$90FF | VIC, register = A3-A0                            |
//! | $9100-$93FF | VIA1 when A4 is set, else VIA2 when A5 is set    |

#![allow(clippy::cast_possible_truncation)]

use emu_core::Bus;
use mos_via_6522::Via6522;

use crate::memory::{Vic20Memory, floating_bus};
use crate::ports::{Via1Wiring, Via2Wiring};
use crate::vic::Vic;
use crate::video::PixelSink;

/// Which I/O chip an address in $9000-$93FF selects.
enum IoTarget {
    Vic(u8),
    Via1(u8),
    Via2(u8),
}

fn decode_io(addr: u16) -> Option<IoTarget> {
    let reg = (addr & 0x0F) as u8;
    match addr {
        0x9000..=0x90FF => Some(IoTarget::Vic(reg)),
        0x9100..=0x93FF if addr & 0x10 != 0 => Some(IoTarget::Via1(reg)),
        0x9100..=0x93FF if addr & 0x20 != 0 => Some(IoTarget::Via2(reg)),
        _ => None,
    }
}

/// The VIC-20 bus, implementing `emu_core::Bus`.
///
/// Owns every chip the CPU can reach. The machine ticks the chips
/// through these fields between instructions.
pub struct Vic20Bus {
    pub memory: Vic20Memory,
    pub vic: Vic,
    pub via1: Via6522<Via1Wiring>,
    pub via2: Via6522<Via2Wiring>,
}

impl Vic20Bus {
    /// Wire `memory` to a fresh VIC and both VIAs.
    #[must_use]
    pub fn new(memory: Vic20Memory) -> Self {
        Self {
            memory,
            vic: Vic::new(),
            via1: Via6522::new(Via1Wiring::default()),
            via2: Via6522::new(Via2Wiring::default()),
        }
    }

    /// Tick the VIC one cycle, drawing into `sink`.
    pub fn tick_video<S: PixelSink + ?Sized>(&mut self, sink: &mut S) {
        self.vic.tick(&self.memory, sink);
    }

    /// Read what the CPU would see at `addr`, without side effects.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        match decode_io(addr) {
            Some(IoTarget::Vic(reg)) => self.vic.peek(reg),
            Some(IoTarget::Via1(reg)) => self.via1.peek(reg),
            Some(IoTarget::Via2(reg)) => self.via2.peek(reg),
            None => self.memory.peek(addr),
        }
    }
}

impl Bus for Vic20Bus {
    fn read(&mut self, addr: u16) -> u8 {
        match decode_io(addr) {
            Some(IoTarget::Vic(reg)) => self.vic.read(reg),
            Some(IoTarget::Via1(reg)) => self.via1.read(reg),
            Some(IoTarget::Via2(reg)) => self.via2.read(reg),
            None if (0x9000..=0x93FF).contains(&addr) => floating_bus(addr),
            None => self.memory.cpu_read(addr),
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match decode_io(addr) {
            Some(IoTarget::Vic(reg)) => self.vic.write(reg, value),
            Some(IoTarget::Via1(reg)) => self.via1.write(reg, value),
            Some(IoTarget::Via2(reg)) => self.via2.write(reg, value),
            None => self.memory.cpu_write(addr, value),
        }
    }
}
