//! Cycle-accurate Commodore VIC-20 emulator.
//!
//! The master clock ticks at CPU cycle rate (1,108,405 Hz PAL). Both
//! VIAs and the VIC tick once per cycle, in that order. One frame is
//! 284 × 312 pixels at 4 pixels per cycle = 22,152 CPU cycles (~50 Hz).
//!
//! The CPU core is supplied by the caller through `emu_core::Cpu`.

mod bus;
#[cfg(feature = "capture")]
pub mod capture;
pub mod cartridge;
pub mod config;
mod error;
pub mod input;
mod keyboard;
pub mod memory;
pub mod palette;
pub mod ports;
pub mod prg;
pub mod vic;
mod vic20;
pub mod video;

pub use bus::Vic20Bus;
pub use cartridge::{Cartridge, CartridgeSlot};
pub use config::{RamExpansion, Vic20Config};
pub use error::{LoadError, Vic20Error};
pub use input::{Joystick, JoystickButton, Vic20Key};
pub use keyboard::KeyboardMatrix;
pub use memory::Vic20Memory;
pub use prg::LoadedProgram;
pub use vic::Vic;
pub use vic20::{CPU_CLOCK_HZ, Vic20};
pub use video::{FrameBuffer, PixelSink};
