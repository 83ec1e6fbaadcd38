//! How the two VIAs are wired to the keyboard, joystick and RESTORE key.
//!
//! | Line     | Wiring                                   |
//! |----------|------------------------------------------|
//! | VIA1 PA2 | Joystick up (active low)                 |
//! | VIA1 PA3 | Joystick down (active low)               |
//! | VIA1 PA4 | Joystick left (active low)               |
//! | VIA1 PA5 | Joystick fire (active low)               |
//! | VIA1 CA1 | RESTORE key (low while held)             |
//! | VIA2 PA  | Keyboard rows (active low)               |
//! | VIA2 PB  | Keyboard columns; PB7 also joystick right |
//!
//! VIA1's interrupt output is the CPU's NMI line; VIA2's is IRQ.

use mos_via_6522::{Port, PortPins, PortWiring};

use crate::input::Joystick;
use crate::keyboard::KeyboardMatrix;

/// VIA1 wiring: the joystick switches except RIGHT.
#[derive(Debug, Clone, Default)]
pub struct Via1Wiring {
    pub joystick: Joystick,
}

impl PortWiring for Via1Wiring {
    fn port_in(&mut self, port: Port, pins: &mut PortPins) {
        if port == Port::A {
            pins.drive_a_bit(2, !self.joystick.up);
            pins.drive_a_bit(3, !self.joystick.down);
            pins.drive_a_bit(4, !self.joystick.left);
            pins.drive_a_bit(5, !self.joystick.fire);
        }
    }
}

/// VIA2 wiring: the keyboard matrix and the joystick RIGHT switch.
#[derive(Debug, Clone, Default)]
pub struct Via2Wiring {
    pub keyboard: KeyboardMatrix,
    pub joystick_right: bool,
}

impl PortWiring for Via2Wiring {
    fn port_in(&mut self, port: Port, pins: &mut PortPins) {
        match port {
            Port::A => {
                // Columns selected by driving PB outputs low
                let cols = !pins.b() & pins.ddr_b();
                let rows = self.keyboard.rows_for_columns(cols);
                pins.drive_a(!rows);
            }
            Port::B => {
                // Reverse scan: rows driven low on PA, columns read on PB
                let rows = !pins.a() & pins.ddr_a();
                if rows != 0 {
                    pins.drive_b(!self.keyboard.columns_for_rows(rows));
                }
                // Only lands when PB7 is an input
                pins.drive_b_bit(7, !self.joystick_right);
            }
            Port::Ca2 | Port::Cb2 => {}
        }
    }
}
