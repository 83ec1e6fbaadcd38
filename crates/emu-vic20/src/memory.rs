//! VIC-20 memory subsystem.
//!
//! # CPU memory map
//!
//! | Range         | Contents                                        |
//! |---------------|-------------------------------------------------|
//! | $0000-$03FF   | 1K RAM                                          |
//! | $0400-$0FFF   | 3K expansion RAM (block 0)                      |
//! | $1000-$1FFF   | 4K RAM                                          |
//! | $2000-$7FFF   | BLK1-3: cartridge ROM or expansion RAM (1-3)    |
//! | $8000-$8FFF   | Character ROM                                   |
//! | $9000-$93FF   | I/O: VIC and both VIAs (routed by the bus)      |
//! | $9400-$97FF   | Colour RAM (4 bits per cell)                    |
//! | $A000-$BFFF   | BLK5: cartridge ROM or expansion RAM (block 4)  |
//! | $C000-$DFFF   | BASIC ROM                                       |
//! | $E000-$FFFF   | Kernal ROM                                      |
//!
//! Anything not backed by a store reads as the high byte of the address,
//! which is what the undriven data bus holds after the opcode fetch.
//!
//! The VIC sees only the internal RAM, the character ROM and colour RAM.

#![allow(clippy::cast_possible_truncation)]

use crate::cartridge::{Cartridge, CartridgeSlot};
use crate::config::RAM_BLOCKS;

/// Size of expansion block 0 ($0400-$0FFF).
const BLOCK0_SIZE: usize = 0x0C00;
/// Size of expansion blocks 1-4.
const BLOCK_SIZE: usize = 0x2000;

/// Value seen on the data bus when nothing drives it.
#[must_use]
pub const fn floating_bus(addr: u16) -> u8 {
    (addr >> 8) as u8
}

/// VIC-20 memory: internal RAM, ROMs, colour RAM and expansion slots.
pub struct Vic20Memory {
    /// 1K RAM at $0000-$03FF.
    low_ram: Box<[u8; 0x0400]>,
    /// 4K RAM at $1000-$1FFF.
    main_ram: Box<[u8; 0x1000]>,
    /// Colour RAM at $9400-$97FF (low nibble only).
    colour_ram: Box<[u8; 0x0400]>,
    /// Character ROM (4K, mapped at $8000-$8FFF).
    char_rom: Vec<u8>,
    /// BASIC ROM (8K, mapped at $C000-$DFFF).
    basic_rom: Vec<u8>,
    /// Kernal ROM (8K, mapped at $E000-$FFFF).
    kernal_rom: Vec<u8>,
    /// Expansion RAM blocks 0-4, allocated only while fitted.
    expansion: [Option<Box<[u8]>>; RAM_BLOCKS],
    /// Cartridge ROMs in BLK1, BLK2, BLK3, BLK5.
    cartridges: [Option<Cartridge>; 4],
}

impl Vic20Memory {
    /// Create the memory subsystem with the given ROMs and no expansions.
    ///
    /// ROM sizes are checked by `Vic20Config::validate`.
    #[must_use]
    pub fn new(kernal_rom: &[u8], basic_rom: &[u8], char_rom: &[u8]) -> Self {
        Self {
            low_ram: Box::new([0; 0x0400]),
            main_ram: Box::new([0; 0x1000]),
            colour_ram: Box::new([0; 0x0400]),
            char_rom: char_rom.to_vec(),
            basic_rom: basic_rom.to_vec(),
            kernal_rom: kernal_rom.to_vec(),
            expansion: [None, None, None, None, None],
            cartridges: [None, None, None, None],
        }
    }

    /// CPU read of everything except the I/O area, which the bus routes
    /// to the chips before calling this.
    #[must_use]
    pub fn cpu_read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x03FF => self.low_ram[addr as usize],
            0x0400..=0x0FFF => self.expansion_read(0, addr),
            0x1000..=0x1FFF => self.main_ram[(addr - 0x1000) as usize],
            0x2000..=0x7FFF => {
                let block = (addr >> 13) as usize;
                self.window_read(block - 1, block, addr)
            }
            0x8000..=0x8FFF => rom_read(&self.char_rom, addr - 0x8000, addr),
            0x9400..=0x97FF => self.colour_ram[(addr - 0x9400) as usize] & 0x0F,
            0xA000..=0xBFFF => self.window_read(3, 4, addr),
            0xC000..=0xDFFF => rom_read(&self.basic_rom, addr - 0xC000, addr),
            0xE000..=0xFFFF => rom_read(&self.kernal_rom, addr - 0xE000, addr),
            _ => floating_bus(addr),
        }
    }

    /// CPU write. ROM, cartridge windows and unbacked addresses ignore it.
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x03FF => self.low_ram[addr as usize] = value,
            0x0400..=0x0FFF => self.expansion_write(0, addr, value),
            0x1000..=0x1FFF => self.main_ram[(addr - 0x1000) as usize] = value,
            0x2000..=0x7FFF => {
                let block = (addr >> 13) as usize;
                self.window_write(block - 1, block, addr, value);
            }
            0x9400..=0x97FF => self.colour_ram[(addr - 0x9400) as usize] = value & 0x0F,
            0xA000..=0xBFFF => self.window_write(3, 4, addr, value),
            _ => {}
        }
    }

    /// VIC read: internal RAM, character ROM and colour RAM only.
    #[must_use]
    pub fn video_read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x03FF => self.low_ram[addr as usize],
            0x1000..=0x1FFF => self.main_ram[(addr - 0x1000) as usize],
            0x8000..=0x8FFF => rom_read(&self.char_rom, addr - 0x8000, addr),
            0x9400..=0x97FF => self.colour_ram[(addr - 0x9400) as usize] & 0x0F,
            _ => floating_bus(addr),
        }
    }

    /// Peek: read memory without side effects (for observation/debugging).
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        self.cpu_read(addr)
    }

    /// Fit (zeroed) or remove expansion RAM block `block` (0-4).
    ///
    /// Fitting a block that is already present keeps its contents.
    /// Out-of-range block numbers are ignored.
    pub fn enable_ram_block(&mut self, block: usize, enabled: bool) {
        let Some(slot) = self.expansion.get_mut(block) else {
            return;
        };
        match (enabled, slot.is_some()) {
            (true, false) => {
                let size = if block == 0 { BLOCK0_SIZE } else { BLOCK_SIZE };
                *slot = Some(vec![0; size].into_boxed_slice());
            }
            (false, true) => *slot = None,
            _ => {}
        }
    }

    /// Is expansion RAM block `block` fitted?
    #[must_use]
    pub fn ram_block_present(&self, block: usize) -> bool {
        self.expansion.get(block).is_some_and(Option::is_some)
    }

    /// Install a cartridge in its slot, replacing any previous one.
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        let index = cartridge.slot().index();
        self.cartridges[index] = Some(cartridge);
    }

    /// Remove the cartridge from `slot`, returning it.
    pub fn eject_cartridge(&mut self, slot: CartridgeSlot) -> Option<Cartridge> {
        self.cartridges[slot.index()].take()
    }

    /// The cartridge in `slot`, if any.
    #[must_use]
    pub fn cartridge(&self, slot: CartridgeSlot) -> Option<&Cartridge> {
        self.cartridges[slot.index()].as_ref()
    }

    // --- Internal helpers ---

    fn expansion_read(&self, block: usize, addr: u16) -> u8 {
        match &self.expansion[block] {
            Some(ram) => ram[(addr - block_base(block)) as usize],
            None => floating_bus(addr),
        }
    }

    fn expansion_write(&mut self, block: usize, addr: u16, value: u8) {
        if let Some(ram) = self.expansion[block].as_mut() {
            ram[(addr - block_base(block)) as usize] = value;
        }
    }

    /// An 8K window: cartridge `slot` first, else expansion RAM `block`.
    fn window_read(&self, slot: usize, block: usize, addr: u16) -> u8 {
        match &self.cartridges[slot] {
            Some(cartridge) => cartridge.read(addr & 0x1FFF).unwrap_or(floating_bus(addr)),
            None => self.expansion_read(block, addr),
        }
    }

    fn window_write(&mut self, slot: usize, block: usize, addr: u16, value: u8) {
        if self.cartridges[slot].is_none() {
            self.expansion_write(block, addr, value);
        }
    }
}

/// CPU address of the first byte of expansion block `block`.
const fn block_base(block: usize) -> u16 {
    match block {
        0 => 0x0400,
        1 => 0x2000,
        2 => 0x4000,
        3 => 0x6000,
        _ => 0xA000,
    }
}

fn rom_read(rom: &[u8], offset: u16, addr: u16) -> u8 {
    rom.get(offset as usize)
        .copied()
        .unwrap_or(floating_bus(addr))
}
