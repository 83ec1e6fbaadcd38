//! External wiring of the VIA's ports and control lines.
//!
//! A machine connects each VIA to the outside world by implementing
//! [`PortWiring`]. The VIA calls `port_in` just before a port data read
//! so the wiring can drive live input bits, and `port_out` after a port
//! data write or a manual CA2/CB2 level change.

/// The external connection a wiring callback concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    /// Port A data lines PA0-PA7.
    A,
    /// Port B data lines PB0-PB7.
    B,
    /// CA2 control line (manual output mode only).
    Ca2,
    /// CB2 control line (manual output mode only).
    Cb2,
}

/// Pin-side state of both ports as seen by the wiring.
///
/// `a` and `b` are the port registers: output bits hold what the CPU
/// wrote, input bits hold whatever the wiring last drove onto them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortPins {
    a: u8,
    b: u8,
    ddr_a: u8,
    ddr_b: u8,
    ca2: bool,
    cb2: bool,
}

impl PortPins {
    /// Pins with the given port values and data direction registers.
    #[must_use]
    pub const fn new(a: u8, b: u8, ddr_a: u8, ddr_b: u8) -> Self {
        Self {
            a,
            b,
            ddr_a,
            ddr_b,
            ca2: false,
            cb2: false,
        }
    }

    /// Port A register.
    #[must_use]
    pub const fn a(&self) -> u8 {
        self.a
    }

    /// Port B register.
    #[must_use]
    pub const fn b(&self) -> u8 {
        self.b
    }

    /// Port A data direction (1 = output).
    #[must_use]
    pub const fn ddr_a(&self) -> u8 {
        self.ddr_a
    }

    /// Port B data direction (1 = output).
    #[must_use]
    pub const fn ddr_b(&self) -> u8 {
        self.ddr_b
    }

    /// CA2 output level.
    #[must_use]
    pub const fn ca2(&self) -> bool {
        self.ca2
    }

    /// CB2 output level.
    #[must_use]
    pub const fn cb2(&self) -> bool {
        self.cb2
    }

    /// Drive the input bits of port A. Output bits keep their value.
    pub fn drive_a(&mut self, value: u8) {
        self.a = merge(self.a, value, self.ddr_a);
    }

    /// Drive the input bits of port B. Output bits keep their value.
    pub fn drive_b(&mut self, value: u8) {
        self.b = merge(self.b, value, self.ddr_b);
    }

    /// Drive a single port A bit, if that bit is an input.
    pub fn drive_a_bit(&mut self, bit: u8, high: bool) {
        self.a = merge_bit(self.a, bit, high, self.ddr_a);
    }

    /// Drive a single port B bit, if that bit is an input.
    pub fn drive_b_bit(&mut self, bit: u8, high: bool) {
        self.b = merge_bit(self.b, bit, high, self.ddr_b);
    }

    pub(crate) fn write_a(&mut self, value: u8) {
        self.a = merge(value, self.a, self.ddr_a);
    }

    pub(crate) fn write_b(&mut self, value: u8) {
        self.b = merge(value, self.b, self.ddr_b);
    }

    pub(crate) fn set_a(&mut self, value: u8) {
        self.a = value;
    }

    pub(crate) fn set_b(&mut self, value: u8) {
        self.b = value;
    }

    pub(crate) fn set_ddr_a(&mut self, value: u8) {
        self.ddr_a = value;
    }

    pub(crate) fn set_ddr_b(&mut self, value: u8) {
        self.ddr_b = value;
    }

    pub(crate) fn set_ca2(&mut self, level: bool) {
        self.ca2 = level;
    }

    pub(crate) fn set_cb2(&mut self, level: bool) {
        self.cb2 = level;
    }
}

/// Output bits (mask = 1) from `outputs`, input bits from `inputs`.
fn merge(outputs: u8, inputs: u8, mask: u8) -> u8 {
    (outputs & mask) | (inputs & !mask)
}

fn merge_bit(current: u8, bit: u8, high: bool, ddr: u8) -> u8 {
    let mask = 1u8 << (bit & 7);
    if ddr & mask != 0 {
        current
    } else if high {
        current | mask
    } else {
        current & !mask
    }
}

/// How a VIA is connected to the rest of the machine.
///
/// Both hooks default to doing nothing, so wiring only implements the
/// directions it cares about.
pub trait PortWiring {
    /// Called before a port data register read returns. Drive the live
    /// input bits with [`PortPins::drive_a`] / [`PortPins::drive_b`].
    fn port_in(&mut self, port: Port, pins: &mut PortPins) {
        let _ = (port, pins);
    }

    /// Called after the CPU changed an output: a port data register
    /// write, or a manual CA2/CB2 level set through the PCR.
    fn port_out(&mut self, port: Port, pins: &PortPins) {
        let _ = (port, pins);
    }
}

/// A VIA with nothing attached. Inputs read back whatever is latched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unwired;

impl PortWiring for Unwired {}
