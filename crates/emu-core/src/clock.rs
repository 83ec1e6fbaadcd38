//! Master clock configuration.

use std::time::Duration;

use crate::Ticks;

/// Master clock configuration for a system.
///
/// Hosts use this to pace emulation against wall-clock time: the number
/// of cycles a frame consumed converts to the real time it represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Clock frequency in Hz (e.g., `1_108_405` for a PAL VIC-20).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Wall-clock time represented by `ticks` cycles.
    #[must_use]
    pub fn duration_of(&self, ticks: Ticks) -> Duration {
        if self.frequency_hz == 0 {
            return Duration::ZERO;
        }
        let nanos = u128::from(ticks.get()) * 1_000_000_000 / u128::from(self.frequency_hz);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}
