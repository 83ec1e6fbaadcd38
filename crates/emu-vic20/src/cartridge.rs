//! Cartridge images and the expansion ROM slots they occupy.
//!
//! VIC-20 cartridges are raw 4K or 8K ROM dumps, optionally preceded by
//! a 2-byte little-endian load address. The load address picks one of
//! four 8K windows:
//!
//! | Slot | Window        |
//! |------|---------------|
//! | BLK1 | $2000-$3FFF   |
//! | BLK2 | $4000-$5FFF   |
//! | BLK3 | $6000-$7FFF   |
//! | BLK5 | $A000-$BFFF   |
//!
//! A 4K image is mirrored across its 8K window.

use tracing::{debug, warn};

use crate::error::LoadError;

/// Image with a 2-byte header followed by 4K of ROM.
const HEADERED_4K: usize = 4096 + 2;
/// Image with a 2-byte header followed by 8K of ROM.
const HEADERED_8K: usize = 8192 + 2;

/// An expansion ROM window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartridgeSlot {
    /// $2000-$3FFF.
    Blk1,
    /// $4000-$5FFF.
    Blk2,
    /// $6000-$7FFF.
    Blk3,
    /// $A000-$BFFF, where autostart cartridges live.
    Blk5,
}

impl CartridgeSlot {
    /// All slots in slot-index order.
    pub const ALL: [Self; 4] = [Self::Blk1, Self::Blk2, Self::Blk3, Self::Blk5];

    /// The slot whose window starts at `address`.
    #[must_use]
    pub const fn from_address(address: u16) -> Option<Self> {
        match address {
            0x2000 => Some(Self::Blk1),
            0x4000 => Some(Self::Blk2),
            0x6000 => Some(Self::Blk3),
            0xA000 => Some(Self::Blk5),
            _ => None,
        }
    }

    /// First address of the window.
    #[must_use]
    pub const fn address(self) -> u16 {
        match self {
            Self::Blk1 => 0x2000,
            Self::Blk2 => 0x4000,
            Self::Blk3 => 0x6000,
            Self::Blk5 => 0xA000,
        }
    }

    /// Slot index 0-3.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Blk1 => 0,
            Self::Blk2 => 1,
            Self::Blk3 => 2,
            Self::Blk5 => 3,
        }
    }
}

/// A ROM image installed in one expansion slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cartridge {
    slot: CartridgeSlot,
    rom: Vec<u8>,
}

impl Cartridge {
    /// Build a cartridge from a raw image.
    ///
    /// Without an explicit `slot`, the image must be 4098 or 8194 bytes
    /// long and its first two bytes name the window. The ROM is then cut
    /// to 8192 or 4096 bytes by dropping leading bytes; shorter images
    /// are dropped entirely and leave an empty cartridge that still
    /// claims its window.
    pub fn from_image(data: &[u8], slot: Option<CartridgeSlot>) -> Result<Self, LoadError> {
        let (slot, payload) = match slot {
            Some(slot) => (slot, data),
            None if matches!(data.len(), HEADERED_4K | HEADERED_8K) => {
                let address = u16::from_le_bytes([data[0], data[1]]);
                let slot = CartridgeSlot::from_address(address)
                    .ok_or(LoadError::UnsupportedCartridgeAddress(address))?;
                (slot, &data[2..])
            }
            None => return Err(LoadError::MissingCartridgeAddress { len: data.len() }),
        };

        let rom = trim_leading(payload);
        let discarded = payload.len() - rom.len();
        if discarded > 0 {
            warn!(
                discarded,
                kept = rom.len(),
                "cartridge image not 4K or 8K, leading bytes dropped"
            );
        }
        debug!(?slot, len = rom.len(), "cartridge image prepared");

        Ok(Self {
            slot,
            rom: rom.to_vec(),
        })
    }

    /// The window this cartridge occupies.
    #[must_use]
    pub fn slot(&self) -> CartridgeSlot {
        self.slot
    }

    /// The ROM contents after trimming.
    #[must_use]
    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    /// Read at `offset` within the 8K window, or `None` if the image is
    /// empty. Images shorter than the window repeat.
    #[must_use]
    pub fn read(&self, offset: u16) -> Option<u8> {
        if self.rom.is_empty() {
            None
        } else {
            Some(self.rom[usize::from(offset) % self.rom.len()])
        }
    }
}

/// Drop leading bytes until the length is 8192 or 4096, or nothing is left.
fn trim_leading(data: &[u8]) -> &[u8] {
    let keep = match data.len() {
        len if len >= 8192 => 8192,
        len if len >= 4096 => 4096,
        _ => 0,
    };
    &data[data.len() - keep..]
}
