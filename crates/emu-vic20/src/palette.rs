//! VIC-20 colour palette.
//!
//! 16 colours as ARGB32. Entries 0-7 are the character colours usable
//! in colour RAM and for the border; 8-15 are the extra colours only
//! the background and auxiliary registers can select.

/// VIC-20 palette: 16 colours indexed 0-15 in ARGB32 format.
pub const PALETTE: [u32; 16] = [
    0xFF00_0000, // 0: Black
    0xFFFF_FFFF, // 1: White
    0xFFF0_0000, // 2: Red
    0xFF00_F0F0, // 3: Cyan
    0xFF60_0060, // 4: Purple
    0xFF00_A000, // 5: Green
    0xFF00_00F0, // 6: Blue
    0xFFD0_D000, // 7: Yellow
    0xFFC0_A000, // 8: Orange
    0xFFFF_A000, // 9: Light Orange
    0xFFF0_8080, // 10: Pink
    0xFF00_FFFF, // 11: Light Cyan
    0xFFFF_00FF, // 12: Light Purple
    0xFF00_FF00, // 13: Light Green
    0xFF00_A0FF, // 14: Light Blue
    0xFFFF_FF00, // 15: Light Yellow
];
