//! Interrupt-safe keyer outputs

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// Atomic view of the keyer's tick counter and output levels
///
/// Written only by the keyer that borrows it; safe to read from any
/// interrupt or task. Lives in a `static` on the target.
pub struct KeyerSignals {
    tick: AtomicU32,
    transmit: AtomicBool,
    key_line: AtomicBool,
    indicator: AtomicBool,
    busy: AtomicBool,
    characters_sent: AtomicU32,
}

/// Levels published once per tick
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputLevels {
    /// An element is being keyed
    pub transmit: bool,
    /// Level of the primary output line
    pub key_line: bool,
    /// Level of the indicator line
    pub indicator: bool,
}

/// Point-in-time copy of every signal
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalSnapshot {
    pub tick: u32,
    pub levels: OutputLevels,
    pub busy: bool,
    pub characters_sent: u32,
}

impl KeyerSignals {
    /// Create a cleared signal block
    pub const fn new() -> Self {
        Self {
            tick: AtomicU32::new(0),
            transmit: AtomicBool::new(false),
            key_line: AtomicBool::new(false),
            indicator: AtomicBool::new(false),
            busy: AtomicBool::new(false),
            characters_sent: AtomicU32::new(0),
        }
    }

    /// Ticks counted so far (wraps)
    pub fn tick(&self) -> u32 {
        self.tick.load(Ordering::Relaxed)
    }

    /// True exactly while a dit or dah is keyed
    pub fn transmit(&self) -> bool {
        self.transmit.load(Ordering::Relaxed)
    }

    /// Level for the primary output line
    pub fn key_line(&self) -> bool {
        self.key_line.load(Ordering::Relaxed)
    }

    /// Level for the indicator line
    pub fn indicator(&self) -> bool {
        self.indicator.load(Ordering::Relaxed)
    }

    /// A message is queued or being sent
    pub fn busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn characters_sent(&self) -> u32 {
        self.characters_sent.load(Ordering::Relaxed)
    }

    /// Current output levels
    pub fn levels(&self) -> OutputLevels {
        OutputLevels {
            transmit: self.transmit(),
            key_line: self.key_line(),
            indicator: self.indicator(),
        }
    }

    pub fn snapshot(&self) -> SignalSnapshot {
        SignalSnapshot {
            tick: self.tick(),
            levels: self.levels(),
            busy: self.busy(),
            characters_sent: self.characters_sent(),
        }
    }

    /// Advance the tick counter and return the new value.
    ///
    /// Load and store rather than a read-modify-write: there is one writer,
    /// and cores without atomic RMW instructions can still run this.
    pub(crate) fn advance_tick(&self) -> u32 {
        let next = self.tick.load(Ordering::Relaxed).wrapping_add(1);
        self.tick.store(next, Ordering::Relaxed);
        next
    }

    pub(crate) fn publish(&self, levels: OutputLevels, busy: bool, characters_sent: u32) {
        self.transmit.store(levels.transmit, Ordering::Relaxed);
        self.key_line.store(levels.key_line, Ordering::Relaxed);
        self.indicator.store(levels.indicator, Ordering::Relaxed);
        self.characters_sent.store(characters_sent, Ordering::Relaxed);
        self.busy.store(busy, Ordering::Release);
    }

    #[cfg(test)]
    pub(crate) fn set_tick(&self, tick: u32) {
        self.tick.store(tick, Ordering::Relaxed);
    }
}

impl Default for KeyerSignals {
    fn default() -> Self {
        Self::new()
    }
}
