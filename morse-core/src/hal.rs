//! Hardware Abstraction Layer for the keyer's output lines

use embedded_hal::digital::OutputPin;

use crate::signals::KeyerSignals;

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
    /// Hardware not initialized
    NotInitialized,
    /// Invalid configuration
    InvalidConfig,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::NotInitialized => write!(f, "Hardware not initialized"),
            HalError::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// A digital output driven by the keyer
pub trait OutputLine {
    type Error: From<HalError>;

    /// Set line level (true = high)
    fn set_level(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Get current line level
    fn level(&self) -> Result<bool, Self::Error>;

    /// Toggle line level
    fn toggle(&mut self) -> Result<(), Self::Error> {
        let current = self.level()?;
        self.set_level(!current)
    }
}

/// Generic implementation for embedded-hal compatible output pins
pub struct EmbeddedHalOutput<P> {
    pin: P,
    inverted: bool,
    level: bool,
}

impl<P> EmbeddedHalOutput<P>
where
    P: OutputPin,
{
    /// Wrap a pin; `inverted` drives it low for a high level
    /// (open-collector keying transistors, active-low LEDs)
    pub fn new(pin: P, inverted: bool) -> Self {
        Self {
            pin,
            inverted,
            level: false,
        }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> OutputLine for EmbeddedHalOutput<P>
where
    P: OutputPin,
{
    type Error = HalError;

    fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
        let pin_high = high != self.inverted;
        let result = if pin_high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| HalError::GpioError)?;
        self.level = high;
        Ok(())
    }

    fn level(&self) -> Result<bool, Self::Error> {
        Ok(self.level)
    }
}

/// Stand-in for boards without an indicator line
#[derive(Copy, Clone, Debug, Default)]
pub struct NoIndicator;

impl OutputLine for NoIndicator {
    type Error = HalError;

    fn set_level(&mut self, _high: bool) -> Result<(), Self::Error> {
        Ok(())
    }

    fn level(&self) -> Result<bool, Self::Error> {
        Ok(false)
    }
}

/// Primary key line plus optional indicator, driven from `KeyerSignals`
pub struct KeyerOutputs<K, L = NoIndicator> {
    key: K,
    indicator: L,
    written: Option<(bool, bool)>,
}

impl<K> KeyerOutputs<K, NoIndicator>
where
    K: OutputLine<Error = HalError>,
{
    /// Key line only
    pub fn key_only(key: K) -> Self {
        Self::new(key, NoIndicator)
    }
}

impl<K, L> KeyerOutputs<K, L>
where
    K: OutputLine,
    L: OutputLine<Error = K::Error>,
{
    pub fn new(key: K, indicator: L) -> Self {
        Self {
            key,
            indicator,
            written: None,
        }
    }

    /// Copy the published levels to the lines, writing only on change
    pub fn drive(&mut self, signals: &KeyerSignals) -> Result<(), K::Error> {
        self.write(signals.key_line(), signals.indicator())
    }

    /// Force both lines low
    pub fn release(&mut self) -> Result<(), K::Error> {
        self.write(false, false)
    }

    pub fn into_parts(self) -> (K, L) {
        (self.key, self.indicator)
    }

    fn write(&mut self, key: bool, indicator: bool) -> Result<(), K::Error> {
        let (last_key, last_indicator) = match self.written {
            Some((k, i)) => (Some(k), Some(i)),
            None => (None, None),
        };

        if last_key != Some(key) {
            self.key.set_level(key)?;
        }
        if last_indicator != Some(indicator) {
            self.indicator.set_level(indicator)?;
        }

        self.written = Some((key, indicator));
        Ok(())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use core::cell::Cell;

    /// Output line that remembers its level and counts writes
    #[derive(Default)]
    pub struct MockLine {
        level: Cell<bool>,
        writes: Cell<u32>,
        fail: Cell<bool>,
    }

    impl MockLine {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_high(&self) -> bool {
            self.level.get()
        }

        /// Number of `set_level` calls so far
        pub fn writes(&self) -> u32 {
            self.writes.get()
        }

        /// Make subsequent writes fail with `GpioError`
        pub fn set_failing(&self, fail: bool) {
            self.fail.set(fail);
        }
    }

    impl OutputLine for MockLine {
        type Error = HalError;

        fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
            if self.fail.get() {
                return Err(HalError::GpioError);
            }
            self.level.set(high);
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }

        fn level(&self) -> Result<bool, Self::Error> {
            Ok(self.level.get())
        }
    }
}
