//! Test utilities for keyer core functionality

use std::string::String;
use std::vec::Vec;

use crate::fsm::MorseKeyer;
use crate::signals::KeyerSignals;

/// Consecutive ticks with the same transmit level
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub keyed: bool,
    pub ticks: u32,
}

/// Per-tick capture of the transmit line, stored as mark/space runs
#[derive(Debug, Default)]
pub struct KeyTrace {
    runs: Vec<Run>,
}

impl KeyTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample the signals after one tick
    pub fn record(&mut self, signals: &KeyerSignals) {
        let keyed = signals.transmit();
        match self.runs.last_mut() {
            Some(run) if run.keyed == keyed => run.ticks += 1,
            _ => self.runs.push(Run { keyed, ticks: 1 }),
        }
    }

    /// Tick the keyer until it is no longer busy, recording every busy tick.
    /// Returns the number of ticks advanced.
    pub fn run_until_idle<const N: usize>(
        &mut self,
        keyer: &mut MorseKeyer<'_, N>,
        max_ticks: u32,
    ) -> u32 {
        for tick in 1..=max_ticks {
            keyer.advance_one_tick();
            if !keyer.busy() {
                return tick;
            }
            self.record(keyer.signals());
        }
        max_ticks
    }

    /// Get all captured runs
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Durations of the keyed runs
    pub fn marks(&self) -> Vec<u32> {
        self.runs.iter().filter(|run| run.keyed).map(|run| run.ticks).collect()
    }

    /// Durations of the unkeyed runs, leading and trailing ones included
    pub fn spaces(&self) -> Vec<u32> {
        self.runs.iter().filter(|run| !run.keyed).map(|run| run.ticks).collect()
    }

    pub fn total_space(&self) -> u32 {
        self.spaces().iter().sum()
    }

    /// Convert to dots and dashes; a character gap becomes `' '` and a word
    /// gap `" / "`. Gaps before the first and after the last mark are ignored.
    pub fn to_morse_string(&self, unit: u32) -> String {
        let mut result = String::new();
        let mut seen_mark = false;
        let mut pending_space = 0;

        for run in &self.runs {
            if !run.keyed {
                pending_space = run.ticks;
                continue;
            }

            if seen_mark {
                if pending_space >= 5 * unit {
                    result.push_str(" / ");
                } else if pending_space >= 2 * unit {
                    result.push(' ');
                }
            }
            result.push(if run.ticks >= 2 * unit { '-' } else { '.' });
            seen_mark = true;
            pending_space = 0;
        }

        result
    }

    /// Clear capture buffer
    pub fn clear(&mut self) {
        self.runs.clear();
    }
}
