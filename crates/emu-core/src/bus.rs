//! Memory and I/O bus interface.

/// Memory and I/O bus interface.
///
/// The CPU reaches memory and peripheral registers only through this
/// trait. Implementations decode the address and route it to the right
/// backing store or chip. Every access is total: an address nobody
/// answers still returns a defined byte.
pub trait Bus {
    /// Read a byte from the given address.
    ///
    /// Takes `&mut self` because register reads can have side effects
    /// (flag clearing, port input sampling).
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address. Writes nobody claims are dropped.
    fn write(&mut self, address: u16, value: u8);

    /// Read a little-endian 16-bit word from `address` and `address + 1`.
    fn read_word(&mut self, address: u16) -> u16 {
        let lo = self.read(address);
        let hi = self.read(address.wrapping_add(1));
        u16::from(lo) | (u16::from(hi) << 8)
    }

    /// Write a little-endian 16-bit word to `address` and `address + 1`.
    fn write_word(&mut self, address: u16, value: u16) {
        self.write(address, value as u8);
        self.write(address.wrapping_add(1), (value >> 8) as u8);
    }
}
