//! Core data types for the Morse keyer

use heapless::String;

/// Capacity of the pending-message buffer in bytes
pub const TX_BUFFER_SIZE: usize = 100;
/// Speed used by `KeyerConfig::default()`
pub const DEFAULT_WPM: f32 = 25.0;
/// A dah is 3 dits long
pub const MULT_DAH: u32 = 3;
/// Space between characters is 3 dits
pub const MULT_CHAR_SPACE: u32 = 3;
/// Space between words is 7 dits
pub const MULT_WORD_SPACE: u32 = 7;
/// Longest message repeat delay in minutes
pub const MAX_MSG_DELAY_MINUTES: u8 = 30;
/// Ticks in one minute at the nominal tick rate
pub const TICKS_PER_MINUTE: u32 = 60_000;
/// Nominal period between two `advance_one_tick` calls
pub const TICK_PERIOD_MS: u64 = 1;

/// Dit length in ticks for a speed in words per minute.
///
/// `floor(1_200_000 / (wpm * 1000))`, so fractional speeds (QRSS beacons
/// run well below 1 WPM) keep their precision.
pub fn unit_ticks(wpm: f32) -> Result<u32, KeyerError> {
    if !wpm.is_finite() || wpm <= 0.0 {
        return Err(KeyerError::InvalidSpeed);
    }

    let milli_wpm = wpm * 1000.0;
    if milli_wpm < 1.0 {
        return Err(KeyerError::InvalidSpeed);
    }

    // At most 1_200_000 here, well inside u32
    match (1_200_000.0 / milli_wpm) as u32 {
        0 => Err(KeyerError::InvalidSpeed),
        ticks => Ok(ticks),
    }
}

/// Convert a repeat delay in minutes to ticks, clamped to `MAX_MSG_DELAY_MINUTES`
pub fn message_delay_ticks(minutes: u8) -> u32 {
    minutes.min(MAX_MSG_DELAY_MINUTES) as u32 * TICKS_PER_MINUTE
}

/// Morse code elements
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "std", derive(Hash))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Element {
    /// Dit (short element)
    Dit,
    /// Dah (long element)
    Dah,
}

impl Element {
    /// Returns the duration of this element in units
    pub const fn duration_units(&self) -> u32 {
        match self {
            Element::Dit => 1,
            Element::Dah => MULT_DAH,
        }
    }

    /// Keyer state that sends this element
    pub const fn state(&self) -> KeyerState {
        match self {
            Element::Dit => KeyerState::Dit,
            Element::Dah => KeyerState::Dah,
        }
    }
}

/// FSM states for the keyer
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyerState {
    /// At rest, or parked at a decode point while the transmitter is disabled
    Idle,
    /// Synchronisation period before the first element
    Preamble,
    /// Sending a dit
    Dit,
    /// Sending a dah
    Dah,
    /// Gap between two elements of one character
    ElementSpace,
    /// Gap between two characters
    CharSpace,
    /// Gap between two words
    WordSpace,
    /// Beacon pause after the last character
    MessageDelay,
    /// Trailing word gap of a one-shot message
    EndOfMessage,
}

impl KeyerState {
    /// Returns true if this state produces key output
    pub const fn is_keyed(&self) -> bool {
        matches!(self, KeyerState::Dit | KeyerState::Dah)
    }
}

/// Gap policy between elements, characters and words
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Spacing {
    /// 1 unit between elements, 3 between characters, 7 between words
    #[default]
    Standard,
    /// Every element is followed by 1 unit, a finished character adds 3 more
    /// and a space adds 7 more (4 units between characters, 11 around a space)
    Legacy,
}

/// Errors reported by the keyer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyerError {
    /// Message does not fit the transmit buffer
    MessageTooLong,
    /// Speed is not positive, not finite, or too fast for a one-tick dit
    InvalidSpeed,
    /// Character has no Morse encoding
    NotEncodable,
}

#[cfg(feature = "std")]
impl core::fmt::Display for KeyerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            KeyerError::MessageTooLong => write!(f, "Message exceeds transmit buffer"),
            KeyerError::InvalidSpeed => write!(f, "Speed must be between 0.001 and 1200 WPM"),
            KeyerError::NotEncodable => write!(f, "Character has no Morse encoding"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for KeyerError {}

/// Keyer configuration parameters
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KeyerConfig {
    /// Sending speed in words per minute
    pub wpm: f32,
    /// Dit length in ticks, derived from `wpm`
    pub unit_ticks: u32,
    /// Gap policy
    pub spacing: Spacing,
    /// Send a preamble before the next message (cleared once sent)
    pub preamble: bool,
    /// Carrier-always-on keying for an external frequency shifter
    pub dual_frequency: bool,
    /// Soft mute; when false nothing is keyed
    pub transmitter_enabled: bool,
    /// Pause after the message in minutes, 0 = single word gap
    pub repeat_delay_minutes: u8,
}

impl Default for KeyerConfig {
    fn default() -> Self {
        Self {
            wpm: DEFAULT_WPM,
            unit_ticks: 48, // 25 WPM
            spacing: Spacing::Standard,
            preamble: false,
            dual_frequency: false,
            transmitter_enabled: true,
            repeat_delay_minutes: 0,
        }
    }
}

impl KeyerConfig {
    /// Create a new configuration with validation
    pub fn new(wpm: f32, spacing: Spacing) -> Result<Self, KeyerError> {
        Ok(Self {
            wpm,
            unit_ticks: unit_ticks(wpm)?,
            spacing,
            ..Self::default()
        })
    }

    pub fn with_preamble(mut self, enabled: bool) -> Self {
        self.preamble = enabled;
        self
    }

    pub fn with_dual_frequency(mut self, enabled: bool) -> Self {
        self.dual_frequency = enabled;
        self
    }

    pub fn with_repeat_delay(mut self, minutes: u8) -> Self {
        self.repeat_delay_minutes = minutes.min(MAX_MSG_DELAY_MINUTES);
        self
    }

    /// Dit length in ticks, never zero
    pub fn unit(&self) -> u32 {
        self.unit_ticks.max(1)
    }

    /// Gap between words in ticks
    pub fn word_space_ticks(&self) -> u32 {
        self.unit() * MULT_WORD_SPACE
    }

    /// Gap between characters in ticks
    pub fn char_space_ticks(&self) -> u32 {
        self.unit() * MULT_CHAR_SPACE
    }
}

/// Requests handed to the context that owns the keyer
#[derive(Clone, Debug, PartialEq)]
pub enum Command<const N: usize = TX_BUFFER_SIZE> {
    Send(String<N>),
    Reset,
    SetSpeed(f32),
    SetRepeatDelay(u8),
    SetPreamble(bool),
    SetDualFrequency(bool),
    SetTransmitterEnabled(bool),
    SetSpacing(Spacing),
}
