//! MOS 6522 Versatile Interface Adapter (VIA).
//!
//! The 6522 provides two 8-bit I/O ports, two 16-bit timers, a serial
//! shift register, and an interrupt controller. The VIC-20 uses two
//! VIAs: VIA1 carries the joystick switches and the RESTORE key (its
//! interrupt line drives NMI), VIA2 scans the keyboard matrix and
//! generates the 60 Hz jiffy IRQ from Timer 1.
//!
//! # Registers ($0-$F)
//!
//! | Reg | Name | Description                         |
//! |-----|------|-------------------------------------|
//! | $0  | ORB  | Port B data (handshake)             |
//! | $1  | ORA  | Port A data (handshake)             |
//! | $2  | DDRB | Port B data direction (1 = output)  |
//! | $3  | DDRA | Port A data direction (1 = output)  |
//! | $4  | T1CL | Timer 1 counter low (read clears T1 IRQ) |
//! | $5  | T1CH | Timer 1 counter high (write starts T1) |
//! | $6  | T1LL | Timer 1 latch low                   |
//! | $7  | T1LH | Timer 1 latch high                  |
//! | $8  | T2CL | Timer 2 counter low (read clears T2 IRQ) |
//! | $9  | T2CH | Timer 2 counter high (write starts T2) |
//! | $A  | SR   | Shift register                      |
//! | $B  | ACR  | Auxiliary control register           |
//! | $C  | PCR  | Peripheral control register          |
//! | $D  | IFR  | Interrupt flag register              |
//! | $E  | IER  | Interrupt enable register            |
//! | $F  | ORA  | Port A data (no handshake)           |
//!
//! # Timer 1 latency
//!
//! Writing T1C-H arms a one-cycle start delay, so a count of N raises
//! the T1 flag on the (N+1)th tick. In free-run mode the reload from
//! the latch is followed by a two-cycle delay before counting resumes,
//! giving a period of N+2 ticks.

#![allow(clippy::cast_possible_truncation)]

mod ports;

pub use ports::{Port, PortPins, PortWiring, Unwired};

use emu_core::{Observable, Value};
use tracing::trace;

/// MOS 6522 Versatile Interface Adapter.
///
/// `P` is the machine-side wiring of the ports. It is consulted on
/// every port data read and notified on every port data write.
pub struct Via6522<P: PortWiring = Unwired> {
    /// Port registers and control-line outputs.
    pins: PortPins,
    /// External wiring.
    wiring: P,

    /// Timer 1 counter (16-bit, counts down).
    timer1_counter: u16,
    /// Timer 1 latch (16-bit, reloaded into counter in free-run mode).
    timer1_latch: u16,
    /// Cycles to wait before the counter decrements again.
    timer1_precount: u8,
    /// One-shot underflow already flagged; cleared by a T1C-H write.
    timer1_triggered: bool,

    /// Timer 2 counter (16-bit, counts down).
    timer2_counter: u16,
    /// Timer 2 latch low byte (only low byte is latched).
    timer2_latch_lo: u8,
    /// Timer 2 underflow already flagged; cleared by a T2C-H write.
    timer2_triggered: bool,

    /// Shift register.
    shift_register: u8,

    /// Auxiliary control register (ACR).
    /// Bits 7-6: T1 control (bit 6 set = free-run)
    /// Bit 5: T2 control (0 = timed, 1 = count PB6 pulses)
    /// Bits 4-2: Shift register control
    /// Bit 1: PB latching enable
    /// Bit 0: PA latching enable
    acr: u8,

    /// Peripheral control register (PCR).
    /// Bits 7-5: CB2 control
    /// Bit 4: CB1 edge (0 = negative, 1 = positive)
    /// Bits 3-1: CA2 control
    /// Bit 0: CA1 edge (0 = negative, 1 = positive)
    pcr: u8,

    /// Interrupt flag register (IFR), bits 0-6.
    /// Bit 6: Timer 1
    /// Bit 5: Timer 2
    /// Bit 4: CB1
    /// Bit 3: CB2
    /// Bit 2: Shift register
    /// Bit 1: CA1
    /// Bit 0: CA2
    ifr: u8,

    /// Interrupt enable register (IER), same layout as IFR.
    ier: u8,

    /// CA1 input level.
    ca1: bool,
    /// CA1 level sampled on the previous tick.
    ca1_prev: bool,
}

impl<P: PortWiring> Via6522<P> {
    /// Create a VIA attached to `wiring`, in its reset state.
    #[must_use]
    pub fn new(wiring: P) -> Self {
        Self {
            pins: PortPins::default(),
            wiring,
            timer1_counter: 0,
            timer1_latch: 0,
            timer1_precount: 0,
            timer1_triggered: false,
            timer2_counter: 0,
            timer2_latch_lo: 0,
            timer2_triggered: false,
            shift_register: 0,
            acr: 0,
            pcr: 0,
            ifr: 0,
            ier: 0,
            ca1: false,
            ca1_prev: false,
        }
    }

    /// Return every register, timer and control line to power-on state.
    ///
    /// The wiring is kept; it is the machine's job to re-prime any
    /// input levels it wants the chip to see.
    pub fn reset(&mut self) {
        self.pins = PortPins::default();
        self.timer1_counter = 0;
        self.timer1_latch = 0;
        self.timer1_precount = 0;
        self.timer1_triggered = false;
        self.timer2_counter = 0;
        self.timer2_latch_lo = 0;
        self.timer2_triggered = false;
        self.shift_register = 0;
        self.acr = 0;
        self.pcr = 0;
        self.ifr = 0;
        self.ier = 0;
        self.ca1 = false;
        self.ca1_prev = false;
    }

    /// Tick the VIA for one clock cycle.
    ///
    /// Counts down both timers and samples CA1 for its active edge.
    pub fn tick(&mut self) {
        self.tick_timer1();
        self.tick_timer2();
        self.tick_ca1();
    }

    /// Check if the VIA has an active (and enabled) interrupt.
    #[must_use]
    pub fn irq_active(&self) -> bool {
        (self.ifr & self.ier & 0x7F) != 0
    }

    /// Read a VIA register.
    pub fn read(&mut self, reg: u8) -> u8 {
        match reg & 0x0F {
            0x00 => {
                // ORB: handshake read clears CB1/CB2, then sample inputs
                self.ifr &= !(IFR_CB1 | IFR_CB2);
                self.wiring.port_in(Port::B, &mut self.pins);
                self.pins.b()
            }
            0x01 => {
                // ORA: handshake read clears CA1/CA2, then sample inputs
                self.ifr &= !(IFR_CA1 | IFR_CA2);
                self.wiring.port_in(Port::A, &mut self.pins);
                self.pins.a()
            }
            0x04 => {
                // T1C-L: read low byte AND clear T1 interrupt flag
                self.ifr &= !IFR_T1;
                self.timer1_counter as u8
            }
            0x08 => {
                // T2C-L: read low byte AND clear T2 interrupt flag
                self.ifr &= !IFR_T2;
                self.timer2_counter as u8
            }
            0x0F => {
                // ORA no-handshake: sample inputs, flags untouched
                self.wiring.port_in(Port::A, &mut self.pins);
                self.pins.a()
            }
            reg => self.peek(reg),
        }
    }

    /// Read a register without side effects.
    ///
    /// Port registers return the last latched pin state without asking
    /// the wiring for fresh input.
    #[must_use]
    pub fn peek(&self, reg: u8) -> u8 {
        match reg & 0x0F {
            0x00 => self.pins.b(),
            0x01 | 0x0F => self.pins.a(),
            0x02 => self.pins.ddr_b(),
            0x03 => self.pins.ddr_a(),
            0x04 => self.timer1_counter as u8,
            0x05 => (self.timer1_counter >> 8) as u8,
            0x06 => self.timer1_latch as u8,
            0x07 => (self.timer1_latch >> 8) as u8,
            0x08 => self.timer2_counter as u8,
            0x09 => (self.timer2_counter >> 8) as u8,
            0x0A => self.shift_register,
            0x0B => self.acr,
            0x0C => self.pcr,
            0x0D => {
                // IFR: bit 7 reflects whether any enabled interrupt is active
                let irq_any = if self.irq_active() { 0x80 } else { 0 };
                (self.ifr & 0x7F) | irq_any
            }
            // IER: bit 7 always reads as 1
            _ => self.ier | 0x80,
        }
    }

    /// Write a VIA register.
    pub fn write(&mut self, reg: u8, value: u8) {
        let reg = reg & 0x0F;
        trace!(reg, value, "via write");
        match reg {
            0x00 => {
                // ORB: only output bits change, then notify the wiring
                self.pins.write_b(value);
                self.wiring.port_out(Port::B, &self.pins);
                self.ifr &= !(IFR_CB1 | IFR_CB2);
            }
            0x01 => {
                self.pins.write_a(value);
                self.wiring.port_out(Port::A, &self.pins);
                self.ifr &= !(IFR_CA1 | IFR_CA2);
            }
            0x02 => self.pins.set_ddr_b(value),
            0x03 => self.pins.set_ddr_a(value),
            0x04 | 0x06 => {
                // T1C-L / T1L-L: both only load the low latch byte
                self.timer1_latch = (self.timer1_latch & 0xFF00) | u16::from(value);
            }
            0x05 => {
                // T1C-H: load latch high, transfer latch into counter,
                // clear T1 flag and re-arm one-shot mode.
                self.timer1_latch = (self.timer1_latch & 0x00FF) | (u16::from(value) << 8);
                self.timer1_counter = self.timer1_latch;
                self.timer1_precount = T1_START_DELAY;
                self.timer1_triggered = false;
                self.ifr &= !IFR_T1;
            }
            0x07 => {
                // T1L-H: latch high only, clears T1 flag
                self.timer1_latch = (self.timer1_latch & 0x00FF) | (u16::from(value) << 8);
                self.ifr &= !IFR_T1;
            }
            0x08 => self.timer2_latch_lo = value,
            0x09 => {
                // T2C-H: counter = value:latch_lo, clear T2 flag
                self.timer2_counter = u16::from(self.timer2_latch_lo) | (u16::from(value) << 8);
                self.timer2_triggered = false;
                self.ifr &= !IFR_T2;
            }
            0x0A => {
                self.shift_register = value;
                self.ifr &= !IFR_SR;
            }
            0x0B => self.acr = value,
            0x0C => self.write_pcr(value),
            0x0D => {
                // IFR: writing 1s clears the corresponding flags
                self.ifr &= !value;
            }
            0x0E => {
                // IER: bit 7 selects set (1) or clear (0) mode
                if value & 0x80 != 0 {
                    self.ier |= value & 0x7F;
                } else {
                    self.ier &= !(value & 0x7F);
                }
            }
            _ => {
                // ORA no-handshake: CA1/CA2 flags are left alone
                self.pins.write_a(value);
                self.wiring.port_out(Port::A, &self.pins);
            }
        }
    }

    /// Set the CA1 input line level.
    ///
    /// The edge is evaluated on the next tick against the level seen on
    /// the previous tick; PCR bit 0 selects the active direction.
    pub fn set_ca1(&mut self, level: bool) {
        self.ca1 = level;
    }

    /// Force the whole port A register, as at power-on wiring.
    pub fn set_port_a(&mut self, value: u8) {
        self.pins.set_a(value);
    }

    /// Force the whole port B register, as at power-on wiring.
    pub fn set_port_b(&mut self, value: u8) {
        self.pins.set_b(value);
    }

    /// Current port pin state.
    #[must_use]
    pub fn pins(&self) -> &PortPins {
        &self.pins
    }

    /// The attached wiring.
    #[must_use]
    pub fn wiring(&self) -> &P {
        &self.wiring
    }

    /// Mutable access to the attached wiring (host input lands here).
    pub fn wiring_mut(&mut self) -> &mut P {
        &mut self.wiring
    }

    /// Get the current IFR value (bits 0-6).
    #[must_use]
    pub fn ifr(&self) -> u8 {
        self.ifr
    }

    /// Get the current IER value (bits 0-6).
    #[must_use]
    pub fn ier(&self) -> u8 {
        self.ier
    }

    /// Get the ACR value.
    #[must_use]
    pub fn acr(&self) -> u8 {
        self.acr
    }

    /// Get the PCR value.
    #[must_use]
    pub fn pcr(&self) -> u8 {
        self.pcr
    }

    /// Get Timer 1 counter value.
    #[must_use]
    pub fn timer1_counter(&self) -> u16 {
        self.timer1_counter
    }

    /// Get Timer 1 latch value.
    #[must_use]
    pub fn timer1_latch(&self) -> u16 {
        self.timer1_latch
    }

    /// Get Timer 2 counter value.
    #[must_use]
    pub fn timer2_counter(&self) -> u16 {
        self.timer2_counter
    }

    // --- Internal helpers ---

    fn write_pcr(&mut self, value: u8) {
        self.pcr = value;
        match (value >> 1) & 0x07 {
            PCR_MANUAL_LOW => {
                self.pins.set_ca2(false);
                self.wiring.port_out(Port::Ca2, &self.pins);
            }
            PCR_MANUAL_HIGH => {
                self.pins.set_ca2(true);
                self.wiring.port_out(Port::Ca2, &self.pins);
            }
            _ => {}
        }
        match (value >> 5) & 0x07 {
            PCR_MANUAL_LOW => {
                self.pins.set_cb2(false);
                self.wiring.port_out(Port::Cb2, &self.pins);
            }
            PCR_MANUAL_HIGH => {
                self.pins.set_cb2(true);
                self.wiring.port_out(Port::Cb2, &self.pins);
            }
            _ => {}
        }
    }

    fn tick_timer1(&mut self) {
        if self.timer1_precount > 0 {
            self.timer1_precount -= 1;
            return;
        }

        self.timer1_counter = self.timer1_counter.wrapping_sub(1);
        if self.timer1_counter == 0 && !self.timer1_triggered {
            if self.acr & ACR_T1_FREE_RUN != 0 {
                self.timer1_counter = self.timer1_latch;
                self.timer1_precount = T1_RELOAD_DELAY;
            } else {
                self.timer1_triggered = true;
            }
            self.ifr |= IFR_T1;
        }
    }

    fn tick_timer2(&mut self) {
        // ACR bit 5: 1 = count PB6 pulses, not driven by tick()
        if self.acr & ACR_T2_PULSE_COUNT != 0 {
            return;
        }

        self.timer2_counter = self.timer2_counter.wrapping_sub(1);
        if self.timer2_counter == 0 && !self.timer2_triggered {
            self.timer2_triggered = true;
            self.ifr |= IFR_T2;
        }
    }

    fn tick_ca1(&mut self) {
        if self.ca1 != self.ca1_prev {
            let positive_edge = self.pcr & PCR_CA1_POSITIVE != 0;
            if self.ca1 == positive_edge {
                self.ifr |= IFR_CA1;
            }
        }
        self.ca1_prev = self.ca1;
    }
}

impl Default for Via6522<Unwired> {
    fn default() -> Self {
        Self::new(Unwired)
    }
}

impl<P: PortWiring> Observable for Via6522<P> {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "ifr" => Some(self.peek(0x0D).into()),
            "ier" => Some(self.ier.into()),
            "acr" => Some(self.acr.into()),
            "pcr" => Some(self.pcr.into()),
            "t1" => Some(self.timer1_counter.into()),
            "t1_latch" => Some(self.timer1_latch.into()),
            "t2" => Some(self.timer2_counter.into()),
            "port_a" => Some(self.pins.a().into()),
            "port_b" => Some(self.pins.b().into()),
            "ddr_a" => Some(self.pins.ddr_a().into()),
            "ddr_b" => Some(self.pins.ddr_b().into()),
            "ca1" => Some(self.ca1.into()),
            "irq" => Some(self.irq_active().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "ifr", "ier", "acr", "pcr", "t1", "t1_latch", "t2", "port_a", "port_b", "ddr_a",
            "ddr_b", "ca1", "irq",
        ]
    }
}

// IFR/IER bit masks
const IFR_CA2: u8 = 0x01;
const IFR_CA1: u8 = 0x02;
const IFR_SR: u8 = 0x04;
const IFR_CB2: u8 = 0x08;
const IFR_CB1: u8 = 0x10;
const IFR_T2: u8 = 0x20;
const IFR_T1: u8 = 0x40;

const ACR_T1_FREE_RUN: u8 = 0x40;
const ACR_T2_PULSE_COUNT: u8 = 0x20;

const PCR_CA1_POSITIVE: u8 = 0x01;
const PCR_MANUAL_LOW: u8 = 0b110;
const PCR_MANUAL_HIGH: u8 = 0b111;

const T1_START_DELAY: u8 = 1;
const T1_RELOAD_DELAY: u8 = 2;
