//! Core traits and types for cycle-accurate emulation.
//!
//! One tick is one CPU clock cycle. The machine asks its CPU to execute
//! an instruction, then advances every other component once per cycle
//! the instruction consumed.

mod bus;
mod clock;
mod cpu;
mod observable;
mod ticks;

pub use bus::Bus;
pub use clock::MasterClock;
pub use cpu::Cpu;
pub use observable::{Observable, Value, parse_address};
pub use ticks::Ticks;
