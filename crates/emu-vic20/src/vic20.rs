//! Top-level VIC-20 system.
//!
//! The CPU executes one instruction at a time; every cycle it consumed
//! is then replayed through the chips. One frame is 22,152 cycles
//! (284 × 312 pixels at 4 pixels per cycle).
//!
//! # Tick loop
//!
//! Each cycle:
//! 1. VIA1: tick timers and CA1, rising IRQ output → CPU NMI (edge-triggered)
//! 2. VIA2: tick timers, IRQ output → CPU IRQ if the CPU accepts it
//! 3. VIC: advance the beam and draw 4 pixels
//!
//! Cycles spent entering an interrupt are replayed the same way.

use std::collections::VecDeque;
use std::time::Duration;

use emu_core::{Bus, Cpu, MasterClock, Observable, Ticks, Value, parse_address};
use tracing::debug;

use crate::bus::Vic20Bus;
use crate::cartridge::{Cartridge, CartridgeSlot};
use crate::config::{RAM_BLOCKS, RamExpansion, Vic20Config};
use crate::error::{LoadError, Vic20Error};
use crate::input::{Joystick, JoystickButton, Vic20Key};
use crate::memory::Vic20Memory;
use crate::prg::{self, LoadedProgram};
use crate::vic::CYCLES_PER_FRAME;
use crate::video::{FrameBuffer, PixelSink};

/// PAL CPU clock.
pub const CPU_CLOCK_HZ: u64 = 1_108_405;

/// Keyboard buffer fill count ($00C6).
const KEYBOARD_COUNT: u16 = 0x00C6;
/// Keyboard buffer capacity ($0289).
const KEYBOARD_MAX: u16 = 0x0289;
/// Keyboard buffer ($0277).
const KEYBOARD_BUFFER: u16 = 0x0277;

/// PETSCII carriage return.
const RETURN: u8 = 0x0D;

/// VIC-20 system, generic over the CPU core that drives it.
pub struct Vic20<C: Cpu<Vic20Bus>> {
    cpu: C,
    bus: Vic20Bus,
    framebuffer: FrameBuffer,
    clock: MasterClock,
    /// Master clock: counts CPU cycles.
    master_clock: u64,
    /// Completed frame counter.
    frame_count: u64,
    /// Cycles already run towards the current frame (overshoot carry).
    frame_cycles: u32,
    /// Previous VIA1 IRQ output (for NMI edge detection).
    nmi_prev: bool,
    /// Characters waiting to be fed into the KERNAL keyboard buffer.
    typed: VecDeque<u8>,
}

impl<C: Cpu<Vic20Bus>> Vic20<C> {
    /// Build a VIC-20 from `config` around `cpu`, then reset it.
    ///
    /// # Errors
    ///
    /// Returns [`Vic20Error::RomSize`] if a ROM image has the wrong size.
    pub fn new(config: &Vic20Config, cpu: C) -> Result<Self, Vic20Error> {
        config.validate()?;

        let memory = Vic20Memory::new(&config.kernal_rom, &config.basic_rom, &config.char_rom);
        let mut vic20 = Self {
            cpu,
            bus: Vic20Bus::new(memory),
            framebuffer: FrameBuffer::new(),
            clock: MasterClock::new(CPU_CLOCK_HZ),
            master_clock: 0,
            frame_count: 0,
            frame_cycles: 0,
            nmi_prev: false,
            typed: VecDeque::new(),
        };
        vic20.set_ram_expansion(config.ram_expansion);
        vic20.reset();
        Ok(vic20)
    }

    /// Reset every chip and the CPU to power-on state.
    ///
    /// RAM, expansion blocks and cartridges are kept.
    pub fn reset(&mut self) {
        self.bus.via1.reset();
        self.bus.via2.reset();
        self.bus.vic.reset();

        // RESTORE released (CA1 pulled up), idle port levels
        self.bus.via1.set_ca1(true);
        self.bus.via1.set_port_a(0x7E);
        self.bus.via1.set_port_b(0xFF);

        self.bus.via1.wiring_mut().joystick = Joystick::default();
        self.bus.via2.wiring_mut().joystick_right = false;
        self.bus.via2.wiring_mut().keyboard.release_all();

        self.nmi_prev = false;
        self.frame_cycles = 0;
        self.typed.clear();

        let cycles = self.cpu.reset(&mut self.bus);
        self.master_clock += u64::from(cycles);
        debug!(pc = format_args!("${:04X}", self.cpu.pc()), "reset");
    }

    /// Run one frame into the machine's own frame buffer.
    ///
    /// Returns the number of CPU cycles executed.
    pub fn run_frame(&mut self) -> u64 {
        let mut framebuffer = std::mem::replace(&mut self.framebuffer, FrameBuffer::detached());
        let cycles = self.run_frame_into(&mut framebuffer);
        self.framebuffer = framebuffer;
        cycles
    }

    /// Run one frame, sending the VIC's pixels to `sink`.
    ///
    /// Instructions run until the frame budget is met; any overshoot
    /// of the last instruction counts towards the next frame. Queued
    /// typed characters are fed to the KERNAL afterwards.
    pub fn run_frame_into<S: PixelSink + ?Sized>(&mut self, sink: &mut S) -> u64 {
        let start_clock = self.master_clock;

        while self.frame_cycles < CYCLES_PER_FRAME {
            // A core that reports no cycles still moves time on
            let cycles = self.cpu.step(&mut self.bus).max(1);
            self.run_cycles(cycles, sink);
        }
        self.frame_cycles -= CYCLES_PER_FRAME;
        self.frame_count += 1;

        self.inject_typed_text();

        self.master_clock - start_clock
    }

    /// Replay `cycles` CPU cycles through the chips.
    fn run_cycles<S: PixelSink + ?Sized>(&mut self, cycles: u32, sink: &mut S) {
        let mut remaining = cycles;
        while remaining > 0 {
            remaining -= 1;
            self.master_clock += 1;
            self.frame_cycles += 1;

            // 1. VIA1 → NMI on the rising edge only
            self.bus.via1.tick();
            let nmi_now = self.bus.via1.irq_active();
            if nmi_now && !self.nmi_prev {
                remaining += self.cpu.nmi(&mut self.bus);
            }
            self.nmi_prev = nmi_now;

            // 2. VIA2 → IRQ while asserted and accepted
            self.bus.via2.tick();
            if self.bus.via2.irq_active() && self.cpu.irq_enabled() {
                remaining += self.cpu.irq(&mut self.bus);
            }

            // 3. VIC
            self.bus.tick_video(sink);
        }
    }

    /// Feed queued characters into the KERNAL keyboard buffer while it
    /// has room. Whatever does not fit waits for the next frame.
    fn inject_typed_text(&mut self) {
        while let Some(&ch) = self.typed.front() {
            let count = self.bus.read(KEYBOARD_COUNT);
            if count >= self.bus.read(KEYBOARD_MAX) {
                break;
            }
            self.bus.write(KEYBOARD_BUFFER.wrapping_add(u16::from(count)), ch);
            self.bus.write(KEYBOARD_COUNT, count.wrapping_add(1));
            self.typed.pop_front();
        }
    }

    /// Queue text to be typed through the KERNAL keyboard buffer.
    ///
    /// `\n` becomes RETURN. Characters outside ASCII are dropped.
    pub fn type_text(&mut self, text: &str) {
        self.typed.extend(text.chars().filter_map(|c| match c {
            '\n' => Some(RETURN),
            c if c.is_ascii() => Some(c as u8),
            _ => None,
        }));
    }

    /// Characters still waiting to be typed.
    #[must_use]
    pub fn pending_text(&self) -> usize {
        self.typed.len()
    }

    /// Jump the CPU to `address`.
    pub fn go(&mut self, address: u16) {
        self.cpu.set_pc(address);
    }

    /// Press a key.
    pub fn press_key(&mut self, key: Vic20Key) {
        let (row, col) = key.matrix();
        self.bus.via2.wiring_mut().keyboard.set_key(row, col, true);
    }

    /// Release a key.
    pub fn release_key(&mut self, key: Vic20Key) {
        let (row, col) = key.matrix();
        self.bus.via2.wiring_mut().keyboard.set_key(row, col, false);
    }

    /// Release all keys.
    pub fn release_all_keys(&mut self) {
        self.bus.via2.wiring_mut().keyboard.release_all();
    }

    /// Press or release a joystick switch.
    pub fn set_joystick(&mut self, button: JoystickButton, pressed: bool) {
        match button {
            JoystickButton::Right => self.bus.via2.wiring_mut().joystick_right = pressed,
            _ => self.bus.via1.wiring_mut().joystick.set(button, pressed),
        }
    }

    /// Hold or release RESTORE. The key pulls VIA1 CA1 low while held.
    pub fn set_restore(&mut self, pressed: bool) {
        self.bus.via1.set_ca1(!pressed);
    }

    /// Load a PRG image into memory, optionally typing `RUN`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ProgramTooShort`] for images without data.
    pub fn load_prg(&mut self, data: &[u8], run: bool) -> Result<LoadedProgram, LoadError> {
        let program = prg::load_prg(&mut self.bus, data)?;
        if run {
            self.type_text("RUN\r");
        }
        Ok(program)
    }

    /// Install a cartridge image, optionally resetting afterwards.
    ///
    /// With `slot` of `None` the load address is taken from the image's
    /// 2-byte header. Returns the slot the cartridge went into.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] when the slot cannot be determined.
    pub fn load_cartridge(
        &mut self,
        data: &[u8],
        slot: Option<CartridgeSlot>,
        reset: bool,
    ) -> Result<CartridgeSlot, LoadError> {
        let cartridge = Cartridge::from_image(data, slot)?;
        let slot = cartridge.slot();
        debug!(
            address = format_args!("${:04X}", slot.address()),
            len = cartridge.rom().len(),
            "cartridge inserted"
        );
        self.bus.memory.insert_cartridge(cartridge);
        if reset {
            self.reset();
        }
        Ok(slot)
    }

    /// Remove the cartridge in `slot`.
    pub fn eject_cartridge(&mut self, slot: CartridgeSlot) -> Option<Cartridge> {
        self.bus.memory.eject_cartridge(slot)
    }

    /// Fit the expansion RAM blocks of a preset, removing the others.
    pub fn set_ram_expansion(&mut self, expansion: RamExpansion) {
        for (block, enabled) in expansion.blocks().into_iter().enumerate() {
            self.bus.memory.enable_ram_block(block, enabled);
        }
        debug!(kilobytes = expansion.kilobytes(), "RAM expansion set");
    }

    /// Fit or remove a single expansion RAM block (0-4).
    pub fn enable_ram_block(&mut self, block: usize, enabled: bool) {
        if block < RAM_BLOCKS {
            self.bus.memory.enable_ram_block(block, enabled);
            debug!(block, enabled, "RAM block changed");
        }
    }

    /// The machine's frame buffer (ARGB32).
    #[must_use]
    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    /// Frame buffer width in pixels.
    #[must_use]
    pub fn framebuffer_width(&self) -> u32 {
        FrameBuffer::WIDTH
    }

    /// Frame buffer height in pixels.
    #[must_use]
    pub fn framebuffer_height(&self) -> u32 {
        FrameBuffer::HEIGHT
    }

    /// Reference to the CPU.
    #[must_use]
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    /// Mutable reference to the CPU.
    pub fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }

    /// Reference to the bus.
    #[must_use]
    pub fn bus(&self) -> &Vic20Bus {
        &self.bus
    }

    /// Mutable reference to the bus.
    pub fn bus_mut(&mut self) -> &mut Vic20Bus {
        &mut self.bus
    }

    /// Master clock tick count (CPU cycles).
    #[must_use]
    pub fn master_clock(&self) -> u64 {
        self.master_clock
    }

    /// Completed frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Cycles already run towards the next frame.
    #[must_use]
    pub fn frame_carry(&self) -> u32 {
        self.frame_cycles
    }

    /// Real time one frame represents, for host pacing.
    #[must_use]
    pub fn frame_duration(&self) -> Duration {
        self.clock.duration_of(Ticks::from(CYCLES_PER_FRAME))
    }

    /// Real time represented by every cycle run so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.clock.duration_of(Ticks::new(self.master_clock))
    }
}

impl<C: Cpu<Vic20Bus>> Observable for Vic20<C> {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("via1.") {
            self.bus.via1.query(rest)
        } else if let Some(rest) = path.strip_prefix("via2.") {
            self.bus.via2.query(rest)
        } else if let Some(rest) = path.strip_prefix("vic.") {
            self.bus.vic.query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            parse_address(rest).map(|a| Value::U8(self.bus.peek(a)))
        } else {
            match path {
                "pc" => Some(self.cpu.pc().into()),
                "master_clock" => Some(self.master_clock.into()),
                "frame_count" => Some(self.frame_count.into()),
                "frame_carry" => Some(self.frame_cycles.into()),
                "ram_blocks" => Some(Value::Array(
                    (0..RAM_BLOCKS)
                        .map(|b| Value::Bool(self.bus.memory.ram_block_present(b)))
                        .collect(),
                )),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc",
            "master_clock",
            "frame_count",
            "frame_carry",
            "ram_blocks",
            "via1.<via_paths>",
            "via2.<via_paths>",
            "vic.<vic_paths>",
            "memory.<address>",
        ]
    }
}
