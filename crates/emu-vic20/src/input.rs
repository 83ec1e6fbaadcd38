//! Input handling for the VIC-20.
//!
//! `Vic20Key` names every key wired into the 8x8 matrix. RESTORE is not
//! part of the matrix: it pulls VIA1's CA1 line low and is handled by
//! `Vic20::set_restore`. The joystick switches are split across both
//! VIAs (see `ports`).

/// Logical key on the VIC-20 keyboard.
///
/// Each key maps to a (row, col) pair in the 8x8 keyboard matrix.
///
/// Matrix layout (row = VIA2 PA, col = VIA2 PB):
///
/// | Row | Col0 | Col1 | Col2 | Col3 | Col4  | Col5 | Col6 | Col7 |
/// |-----|------|------|------|------|-------|------|------|------|
/// | 0   | 1    | ←    | CTRL | STOP | SPC   | C=   | Q    | 2    |
/// | 1   | 3    | W    | A    | LSHFT| Z     | S    | E    | 4    |
/// | 2   | 5    | R    | D    | X    | C     | F    | T    | 6    |
/// | 3   | 7    | Y    | G    | V    | B     | H    | U    | 8    |
/// | 4   | 9    | I    | J    | N    | M     | K    | O    | 0    |
/// | 5   | +    | P    | L    | ,    | .     | :    | @    | -    |
/// | 6   | £    | *    | ;    | /    | RSHFT | =    | ↑    | HOME |
/// | 7   | DEL  | RET  | →    | ↓    | F1    | F3   | F5   | F7   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vic20Key {
    // Row 0
    N1,
    LeftArrow,
    Ctrl,
    RunStop,
    Space,
    Commodore,
    Q,
    N2,
    // Row 1
    N3,
    W,
    A,
    LShift,
    Z,
    S,
    E,
    N4,
    // Row 2
    N5,
    R,
    D,
    X,
    C,
    F,
    T,
    N6,
    // Row 3
    N7,
    Y,
    G,
    V,
    B,
    H,
    U,
    N8,
    // Row 4
    N9,
    I,
    J,
    N,
    M,
    K,
    O,
    N0,
    // Row 5
    Plus,
    P,
    L,
    Comma,
    Period,
    Colon,
    At,
    Minus,
    // Row 6
    Pound,
    Asterisk,
    Semicolon,
    Slash,
    RShift,
    Equals,
    UpArrow,
    Home,
    // Row 7
    Delete,
    Return,
    CursorRight,
    CursorDown,
    F1,
    F3,
    F5,
    F7,
}

impl Vic20Key {
    /// Return the (row, col) pair for this key in the keyboard matrix.
    #[must_use]
    pub const fn matrix(self) -> (u8, u8) {
        match self {
            // Row 0
            Self::N1 => (0, 0),
            Self::LeftArrow => (0, 1),
            Self::Ctrl => (0, 2),
            Self::RunStop => (0, 3),
            Self::Space => (0, 4),
            Self::Commodore => (0, 5),
            Self::Q => (0, 6),
            Self::N2 => (0, 7),
            // Row 1
            Self::N3 => (1, 0),
            Self::W => (1, 1),
            Self::A => (1, 2),
            Self::LShift => (1, 3),
            Self::Z => (1, 4),
            Self::S => (1, 5),
            Self::E => (1, 6),
            Self::N4 => (1, 7),
            // Row 2
            Self::N5 => (2, 0),
            Self::R => (2, 1),
            Self::D => (2, 2),
            Self::X => (2, 3),
            Self::C => (2, 4),
            Self::F => (2, 5),
            Self::T => (2, 6),
            Self::N6 => (2, 7),
            // Row 3
            Self::N7 => (3, 0),
            Self::Y => (3, 1),
            Self::G => (3, 2),
            Self::V => (3, 3),
            Self::B => (3, 4),
            Self::H => (3, 5),
            Self::U => (3, 6),
            Self::N8 => (3, 7),
            // Row 4
            Self::N9 => (4, 0),
            Self::I => (4, 1),
            Self::J => (4, 2),
            Self::N => (4, 3),
            Self::M => (4, 4),
            Self::K => (4, 5),
            Self::O => (4, 6),
            Self::N0 => (4, 7),
            // Row 5
            Self::Plus => (5, 0),
            Self::P => (5, 1),
            Self::L => (5, 2),
            Self::Comma => (5, 3),
            Self::Period => (5, 4),
            Self::Colon => (5, 5),
            Self::At => (5, 6),
            Self::Minus => (5, 7),
            // Row 6
            Self::Pound => (6, 0),
            Self::Asterisk => (6, 1),
            Self::Semicolon => (6, 2),
            Self::Slash => (6, 3),
            Self::RShift => (6, 4),
            Self::Equals => (6, 5),
            Self::UpArrow => (6, 6),
            Self::Home => (6, 7),
            // Row 7
            Self::Delete => (7, 0),
            Self::Return => (7, 1),
            Self::CursorRight => (7, 2),
            Self::CursorDown => (7, 3),
            Self::F1 => (7, 4),
            Self::F3 => (7, 5),
            Self::F5 => (7, 6),
            Self::F7 => (7, 7),
        }
    }
}

/// A joystick switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoystickButton {
    Up,
    Down,
    Left,
    Right,
    Fire,
}

/// The joystick switches read through VIA1, 1 = closed.
///
/// RIGHT is wired to VIA2 PB7 and lives in that port's wiring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Joystick {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub fire: bool,
}

impl Joystick {
    /// Open or close one switch. RIGHT is not held here and is ignored.
    pub fn set(&mut self, button: JoystickButton, pressed: bool) {
        match button {
            JoystickButton::Up => self.up = pressed,
            JoystickButton::Down => self.down = pressed,
            JoystickButton::Left => self.left = pressed,
            JoystickButton::Fire => self.fire = pressed,
            JoystickButton::Right => {}
        }
    }
}
