//! VIC-20 keyboard matrix.
//!
//! The VIC-20 has an 8x8 keyboard matrix scanned by VIA2. The KERNAL
//! normally drives the column select on port B ($9120) and reads the
//! rows back on port A ($9121), both active low. The matrix can also be
//! scanned the other way round, rows out on A and columns in on B.

/// 8x8 keyboard matrix for the VIC-20.
///
/// Internally stores 1 = pressed per bit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardMatrix {
    /// Row state. `rows[r]` has bit `c` set if key (row=r, col=c) is pressed.
    rows: [u8; 8],
}

impl KeyboardMatrix {
    #[must_use]
    pub fn new() -> Self {
        Self { rows: [0; 8] }
    }

    /// Set or clear a key at the given row and column position.
    pub fn set_key(&mut self, row: u8, col: u8, pressed: bool) {
        if row < 8 && col < 8 {
            if pressed {
                self.rows[row as usize] |= 1 << col;
            } else {
                self.rows[row as usize] &= !(1 << col);
            }
        }
    }

    /// Is the key at (row, col) held?
    #[must_use]
    pub fn is_pressed(&self, row: u8, col: u8) -> bool {
        row < 8 && col < 8 && self.rows[row as usize] & (1 << col) != 0
    }

    /// Rows holding a pressed key in any of the `cols` columns.
    ///
    /// `cols` has a 1 bit for every selected column; the result has a 1
    /// bit for every row with a hit. Both are active high.
    #[must_use]
    pub fn rows_for_columns(&self, cols: u8) -> u8 {
        let mut result = 0u8;
        for (row, &row_data) in self.rows.iter().enumerate() {
            if row_data & cols != 0 {
                result |= 1 << row;
            }
        }
        result
    }

    /// Columns holding a pressed key in any of the `rows` rows.
    #[must_use]
    pub fn columns_for_rows(&self, rows: u8) -> u8 {
        self.rows
            .iter()
            .enumerate()
            .filter(|(row, _)| rows & (1 << row) != 0)
            .fold(0, |acc, (_, &row_data)| acc | row_data)
    }

    /// Release all keys.
    pub fn release_all(&mut self) {
        self.rows = [0; 8];
    }
}
