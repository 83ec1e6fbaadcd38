//! CPU core trait.

use crate::Bus;

/// An instruction-stepped CPU core.
///
/// The machine drives the CPU one instruction at a time and uses the
/// returned cycle count to advance every peripheral in lock-step. The
/// bus is passed in, not owned, so the machine can tick the chips that
/// live on it between instructions.
///
/// The type parameter `B` is the bus type this CPU operates on.
pub trait Cpu<B: Bus> {
    /// Execute one instruction. Returns cycles consumed.
    fn step(&mut self, bus: &mut B) -> u32;

    /// Reset the CPU: reload the program counter from the reset vector.
    /// Returns cycles consumed by the reset sequence.
    fn reset(&mut self, bus: &mut B) -> u32;

    /// Take a maskable interrupt. Returns cycles consumed by the entry
    /// sequence. Callers check [`Cpu::irq_enabled`] first.
    fn irq(&mut self, bus: &mut B) -> u32;

    /// Take a non-maskable interrupt. Returns cycles consumed.
    fn nmi(&mut self, bus: &mut B) -> u32;

    /// True when maskable interrupts are accepted (interrupt-disable clear).
    fn irq_enabled(&self) -> bool;

    /// Current program counter.
    fn pc(&self) -> u16;

    /// Jump: replace the program counter without touching anything else.
    fn set_pc(&mut self, pc: u16);
}
