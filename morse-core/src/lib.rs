#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! # Morse Core
//!
//! Tick-driven Morse code beacon keyer for embedded systems.
//! Sends ASCII text as timed on/off keying with optional preamble,
//! dual-frequency carrier and a repeat delay between messages.

pub mod types;
pub mod table;
pub mod signals;
pub mod fsm;
pub mod hal;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use types::*;
pub use table::{lookup, lookup_char, ElementStream, Symbol};
pub use signals::{KeyerSignals, OutputLevels, SignalSnapshot};
pub use fsm::*;
pub use hal::{EmbeddedHalOutput, HalError, KeyerOutputs, NoIndicator, OutputLine};

/// Keyer library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration for a beacon: 25 WPM, standard spacing, no repeat
pub fn default_config() -> KeyerConfig {
    KeyerConfig::default()
}
