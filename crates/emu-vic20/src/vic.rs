//! VIC 6561 (PAL) video chip.
//!
//! Implements the character display, border, hi-res and multicolour
//! cells, the fg/bg inversion flag and raster readback.
//!
//! # Timing (PAL)
//!
//! - 312 lines per frame, 284 pixels per line including blanking
//! - 4 pixels per CPU cycle, 71 cycles per line
//! - 22,152 CPU cycles per frame
//!
//! # Registers ($9000-$900F)
//!
//! | Reg | Bits                 | Meaning                                  |
//! |-----|----------------------|------------------------------------------|
//! | $0  | 6-0                  | Screen left edge (4-pixel units)         |
//! | $1  | 7-0                  | Screen top edge (2-line units)           |
//! | $2  | 7 / 6-0              | Video matrix A9 / column count           |
//! | $3  | 7 / 6-1 / 0          | Raster bit 0 / row count / 8x16 chars    |
//! | $4  | 7-0                  | Raster bits 8-1                          |
//! | $5  | 7-4 / 3-0            | Video matrix A13-A10 / char table        |
//! | $E  | 7-4                  | Auxiliary colour                         |
//! | $F  | 7-4 / 3 / 2-0        | Background / normal mode / border        |
//!
//! Every derived field is recomputed as soon as one of its registers is
//! written with a new value.

#![allow(clippy::cast_possible_truncation)]

use emu_core::{Observable, Value};

use crate::memory::Vic20Memory;
use crate::video::PixelSink;

/// Total pixels per line, including horizontal blanking.
pub const FRAME_WIDTH: u16 = 284;

/// Total lines per frame, including vertical blanking.
pub const FRAME_HEIGHT: u16 = 312;

/// Pixels of horizontal blanking at the start of each line.
pub const HORIZONTAL_BLANKING: u16 = 80;

/// Lines of vertical blanking at the start of each frame.
pub const VERTICAL_BLANKING: u16 = 28;

/// Visible screen width.
pub const SCREEN_WIDTH: u16 = FRAME_WIDTH - HORIZONTAL_BLANKING;

/// Visible screen height.
pub const SCREEN_HEIGHT: u16 = FRAME_HEIGHT - VERTICAL_BLANKING;

/// Character cell width.
pub const CHAR_WIDTH: u16 = 8;

/// Pixels emitted per CPU cycle.
pub const PIXELS_PER_TICK: u16 = 4;

/// CPU cycles per frame.
pub const CYCLES_PER_FRAME: u32 = FRAME_WIDTH as u32 * FRAME_HEIGHT as u32 / PIXELS_PER_TICK as u32;

/// VIC 6561 PAL chip.
pub struct Vic {
    /// Registers as last written (raster bits as last read).
    regs: [u8; 16],

    /// Horizontal beam position in pixels (0-283).
    scan_x: u16,
    /// Current line (0-311).
    scan_y: u16,

    /// Left edge of the character area, relative to the visible screen.
    left: i32,
    /// Top edge of the character area, relative to the visible screen.
    top: i32,
    /// Columns of characters.
    columns: u8,
    /// Rows of characters.
    rows: u8,
    /// Character height in lines (8 or 16).
    char_height: u8,
    /// Video matrix base (screen codes).
    video_matrix: u16,
    /// Colour matrix base ($9400 or $9600).
    colour_matrix: u16,
    /// Character table offset, before VIC-to-CPU address mapping.
    char_table: u16,
    /// Border colour index (0-7).
    border: u8,
    /// Background colour index (0-15).
    background: u8,
    /// Hi-res cells swap foreground and background.
    invert: bool,
}

impl Vic {
    /// Create a VIC in its reset state.
    #[must_use]
    pub fn new() -> Self {
        let mut vic = Self {
            regs: [0; 16],
            scan_x: 0,
            scan_y: 0,
            left: 0,
            top: 0,
            columns: 0,
            rows: 0,
            char_height: 8,
            video_matrix: 0,
            colour_matrix: 0,
            char_table: 0,
            border: 0,
            background: 0,
            invert: false,
        };
        vic.reset();
        vic
    }

    /// Clear all registers and return the beam to the top left.
    ///
    /// Geometry is derived from the cleared registers, so an unprogrammed
    /// chip shows nothing but border.
    pub fn reset(&mut self) {
        self.regs = [0; 16];
        self.scan_x = 0;
        self.scan_y = 0;
        self.update_left();
        self.update_top();
        self.update_matrix();
        self.update_rows();
        self.update_char_table();
        self.update_colours();
    }

    /// Tick the VIC for one CPU cycle.
    ///
    /// Advances the beam by four pixels and draws them if the beam is in
    /// the visible area.
    pub fn tick<S: PixelSink + ?Sized>(&mut self, memory: &Vic20Memory, sink: &mut S) {
        self.advance_beam();
        if self.scan_y >= VERTICAL_BLANKING && self.scan_x >= HORIZONTAL_BLANKING {
            self.draw_pixels(memory, sink);
        }
    }

    /// Read a VIC register.
    ///
    /// Registers $3 and $4 latch the current raster line first.
    pub fn read(&mut self, reg: u8) -> u8 {
        let reg = reg & 0x0F;
        if matches!(reg, 0x3 | 0x4) {
            self.regs[usize::from(reg)] = self.peek(reg);
        }
        self.regs[usize::from(reg)]
    }

    /// Read a register without side effects.
    #[must_use]
    pub fn peek(&self, reg: u8) -> u8 {
        match reg & 0x0F {
            0x3 => (self.regs[3] & 0x7F) | (((self.scan_y & 1) as u8) << 7),
            0x4 => (self.scan_y >> 1) as u8,
            reg => self.regs[usize::from(reg)],
        }
    }

    /// Write a VIC register.
    pub fn write(&mut self, reg: u8, value: u8) {
        let reg = usize::from(reg & 0x0F);
        if self.regs[reg] == value {
            return;
        }
        self.regs[reg] = value;
        match reg {
            0x0 => self.update_left(),
            0x1 => self.update_top(),
            0x2 => self.update_matrix(),
            0x3 => self.update_rows(),
            0x5 => {
                self.update_char_table();
                self.update_matrix();
            }
            0xF => self.update_colours(),
            _ => {}
        }
    }

    /// Horizontal beam position.
    #[must_use]
    pub fn scan_x(&self) -> u16 {
        self.scan_x
    }

    /// Current line.
    #[must_use]
    pub fn scan_y(&self) -> u16 {
        self.scan_y
    }

    /// Left edge of the character area.
    #[must_use]
    pub fn left(&self) -> i32 {
        self.left
    }

    /// Top edge of the character area.
    #[must_use]
    pub fn top(&self) -> i32 {
        self.top
    }

    /// Columns of characters.
    #[must_use]
    pub fn columns(&self) -> u8 {
        self.columns
    }

    /// Rows of characters.
    #[must_use]
    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Character height in lines.
    #[must_use]
    pub fn char_height(&self) -> u8 {
        self.char_height
    }

    /// Video matrix base address.
    #[must_use]
    pub fn video_matrix(&self) -> u16 {
        self.video_matrix
    }

    /// Colour matrix base address.
    #[must_use]
    pub fn colour_matrix(&self) -> u16 {
        self.colour_matrix
    }

    /// Border colour index.
    #[must_use]
    pub fn border_colour(&self) -> u8 {
        self.border
    }

    /// Background colour index.
    #[must_use]
    pub fn background_colour(&self) -> u8 {
        self.background
    }

    /// Auxiliary colour index (multicolour cells).
    #[must_use]
    pub fn auxiliary_colour(&self) -> u8 {
        self.regs[0xE] >> 4
    }

    /// Are hi-res cells drawn inverted?
    #[must_use]
    pub fn inverted(&self) -> bool {
        self.invert
    }

    /// CPU address the VIC fetches for character table offset `offset`.
    ///
    /// The VIC's 16K space is the CPU's $8000-$9FFF followed by
    /// $0000-$1FFF, so offsets wrap at $9C00+$400 into low RAM and at
    /// $1C00+$400 back into the character ROM.
    #[must_use]
    pub fn char_table_address(&self, offset: u16) -> u16 {
        let vaddr = offset.wrapping_add(self.char_table);
        let high = if vaddr & 0x2000 == 0 { 0x8000 } else { 0x0000 };
        (vaddr & 0x1FFF) | high
    }

    // --- Internal helpers ---

    fn advance_beam(&mut self) {
        self.scan_x += PIXELS_PER_TICK;
        if self.scan_x >= FRAME_WIDTH {
            self.scan_x = 0;
            self.scan_y += 1;
            if self.scan_y >= FRAME_HEIGHT {
                self.scan_y = 0;
            }
        }
    }

    fn update_left(&mut self) {
        self.left = (i32::from(self.regs[0] & 0x7F) - 5) * 4;
    }

    fn update_top(&mut self) {
        self.top = (i32::from(self.regs[1]) - 14) * 2;
    }

    fn update_matrix(&mut self) {
        let r2 = u16::from(self.regs[2]);
        let r5 = u16::from(self.regs[5]);
        self.video_matrix = ((r2 & 0x80) << 2) | ((r5 & 0x70) << 6) | ((!r5 & 0x80) << 8);
        self.colour_matrix = if r2 & 0x80 != 0 { 0x9600 } else { 0x9400 };
        self.columns = self.regs[2] & 0x7F;
    }

    fn update_rows(&mut self) {
        self.char_height = if self.regs[3] & 0x01 != 0 { 16 } else { 8 };
        self.rows = (self.regs[3] >> 1) & 0x3F;
    }

    fn update_char_table(&mut self) {
        self.char_table = u16::from(self.regs[5] & 0x0F) << 10;
    }

    fn update_colours(&mut self) {
        let r15 = self.regs[0xF];
        self.background = r15 >> 4;
        self.invert = r15 & 0x08 == 0;
        self.border = r15 & 0x07;
    }

    /// Draw the four pixels under the beam.
    fn draw_pixels<S: PixelSink + ?Sized>(&self, memory: &Vic20Memory, sink: &mut S) {
        let sx = self.scan_x - HORIZONTAL_BLANKING;
        let sy = self.scan_y - VERTICAL_BLANKING;
        let x = i32::from(sx);
        let y = i32::from(sy);

        let char_height = i32::from(self.char_height);
        let area_width = i32::from(self.columns) * i32::from(CHAR_WIDTH);
        let area_height = i32::from(self.rows) * char_height;

        if y < self.top
            || y >= self.top + area_height
            || x < self.left
            || x >= self.left + area_width
        {
            for px in 0..PIXELS_PER_TICK {
                sink.set_pixel(sx + px, sy, self.border);
            }
            return;
        }

        let char_row = (y - self.top) / char_height;
        let char_col = (x - self.left) / i32::from(CHAR_WIDTH);
        let cell = (char_row * i32::from(self.columns) + char_col) as u16;

        let code = memory.video_read(self.video_matrix.wrapping_add(cell));
        let colour = memory.video_read(self.colour_matrix.wrapping_add(cell));
        let foreground = colour & 0x07;

        let line = ((y - self.top) % char_height) as u16;
        let glyph_offset = u16::from(code) * u16::from(self.char_height) + line;
        let glyph = memory.video_read(self.char_table_address(glyph_offset));

        // First or second half of the 8-pixel cell
        let start_bit: u16 = if (x - self.left) & 4 != 0 { 3 } else { 7 };

        if colour & 0x08 != 0 {
            // Multicolour: 2 bits per double-width pixel
            let colours = [
                self.background,
                self.border,
                foreground,
                self.auxiliary_colour(),
            ];
            for i in [0u16, 2] {
                let pair = (glyph >> (start_bit - 1 - i)) & 0x03;
                let c = colours[usize::from(pair)];
                sink.set_pixel(sx + i, sy, c);
                sink.set_pixel(sx + i + 1, sy, c);
            }
        } else {
            let (fg, bg) = if self.invert {
                (self.background, foreground)
            } else {
                (foreground, self.background)
            };
            for i in 0..PIXELS_PER_TICK {
                let lit = glyph & (1 << (start_bit - i)) != 0;
                sink.set_pixel(sx + i, sy, if lit { fg } else { bg });
            }
        }
    }
}

impl Default for Vic {
    fn default() -> Self {
        Self::new()
    }
}

impl Observable for Vic {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "scan_x" => Some(self.scan_x.into()),
            "scan_y" => Some(self.scan_y.into()),
            "left" => Some(self.left.into()),
            "top" => Some(self.top.into()),
            "columns" => Some(self.columns.into()),
            "rows" => Some(self.rows.into()),
            "char_height" => Some(self.char_height.into()),
            "video_matrix" => Some(self.video_matrix.into()),
            "colour_matrix" => Some(self.colour_matrix.into()),
            "char_table" => Some(self.char_table_address(0).into()),
            "border" => Some(self.border.into()),
            "background" => Some(self.background.into()),
            "auxiliary" => Some(self.auxiliary_colour().into()),
            "invert" => Some(self.invert.into()),
            "regs" => Some(Value::Array(
                (0..16u8).map(|r| Value::U8(self.peek(r))).collect(),
            )),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "scan_x",
            "scan_y",
            "left",
            "top",
            "columns",
            "rows",
            "char_height",
            "video_matrix",
            "colour_matrix",
            "char_table",
            "border",
            "background",
            "auxiliary",
            "invert",
            "regs",
        ]
    }
}
