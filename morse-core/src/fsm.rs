//! Tick-driven Morse keyer state machine

use heapless::Vec;

use crate::signals::{KeyerSignals, OutputLevels};
use crate::table::{lookup, ElementStream, Symbol};
use crate::types::{
    message_delay_ticks, unit_ticks, Command, KeyerConfig, KeyerError, KeyerState, Spacing,
    MAX_MSG_DELAY_MINUTES, TX_BUFFER_SIZE,
};

/// Morse sender advanced by one tick per `advance_one_tick` call
///
/// `send`, `reset`, `configure` and the setters must be called from the same
/// context as `advance_one_tick` (or with that context held off). Other
/// contexts observe the keyer through its `KeyerSignals` only; use
/// `Command` and `apply` to hand requests over.
pub struct MorseKeyer<'a, const N: usize = TX_BUFFER_SIZE> {
    signals: &'a KeyerSignals,
    config: KeyerConfig,
    state: KeyerState,
    state_end: u32,
    message: Vec<u8, N>,
    cursor: usize,
    current: Option<ElementStream>,
    started: bool,
    busy: bool,
    characters_sent: u32,
}

impl<'a, const N: usize> MorseKeyer<'a, N> {
    /// Create an idle keyer publishing to `signals`
    pub fn new(signals: &'a KeyerSignals, config: KeyerConfig) -> Self {
        let keyer = Self {
            signals,
            config,
            state: KeyerState::Idle,
            state_end: 0,
            message: Vec::new(),
            cursor: 0,
            current: None,
            started: false,
            busy: false,
            characters_sent: 0,
        };
        keyer.publish();
        keyer
    }

    /// Set the sending speed; takes effect at the next state change
    pub fn configure(&mut self, wpm: f32) -> Result<(), KeyerError> {
        let unit = unit_ticks(wpm)?;
        self.config.wpm = wpm;
        self.config.unit_ticks = unit;

        #[cfg(feature = "defmt")]
        defmt::debug!("Speed {} WPM, unit {} ticks", wpm, unit);

        Ok(())
    }

    /// Queue `text` for sending, replacing any message in flight
    pub fn send(&mut self, text: &str) -> Result<(), KeyerError> {
        self.send_bytes(text.as_bytes())
    }

    /// Queue raw ASCII bytes for sending
    ///
    /// Fails with `MessageTooLong` and leaves the keyer untouched if the
    /// bytes do not fit the buffer.
    pub fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), KeyerError> {
        let message = Vec::from_slice(bytes).map_err(|_| KeyerError::MessageTooLong)?;

        self.message = message;
        self.rewind();
        self.busy = true;

        #[cfg(feature = "defmt")]
        defmt::debug!("Message queued: {} bytes", self.message.len());

        self.publish();
        Ok(())
    }

    /// Abort any transmission and drop the message
    pub fn reset(&mut self) {
        self.message.clear();
        self.rewind();
        self.busy = false;
        self.publish();
    }

    /// Advance the keyer by one tick and publish the new output levels
    pub fn advance_one_tick(&mut self) {
        let now = self.signals.advance_tick();

        match self.state {
            KeyerState::Idle => self.handle_idle_state(now),
            KeyerState::Preamble => self.handle_preamble_state(now),
            KeyerState::Dit | KeyerState::Dah => self.handle_element_state(now),
            KeyerState::ElementSpace | KeyerState::CharSpace | KeyerState::WordSpace => {
                self.handle_space_state(now)
            }
            KeyerState::MessageDelay | KeyerState::EndOfMessage => {
                self.handle_message_end_state(now)
            }
        }

        self.publish();
    }

    /// Execute a command handed over from another context
    pub fn apply(&mut self, command: Command<N>) -> Result<(), KeyerError> {
        match command {
            Command::Send(text) => self.send(&text),
            Command::Reset => {
                self.reset();
                Ok(())
            }
            Command::SetSpeed(wpm) => self.configure(wpm),
            Command::SetRepeatDelay(minutes) => {
                self.set_repeat_delay_minutes(minutes);
                Ok(())
            }
            Command::SetPreamble(enabled) => {
                self.set_preamble_enabled(enabled);
                Ok(())
            }
            Command::SetDualFrequency(enabled) => {
                self.set_dual_frequency_mode(enabled);
                Ok(())
            }
            Command::SetTransmitterEnabled(enabled) => {
                self.set_transmitter_enabled(enabled);
                Ok(())
            }
            Command::SetSpacing(spacing) => {
                self.set_spacing(spacing);
                Ok(())
            }
        }
    }

    /// Idle: start the message once there is one and the transmitter is on
    fn handle_idle_state(&mut self, now: u32) {
        if !self.busy || !self.config.transmitter_enabled {
            return;
        }

        if !self.started {
            self.started = true;
            if self.config.preamble {
                self.enter(KeyerState::Preamble, self.config.word_space_ticks(), now);
                return;
            }
        }

        self.advance_symbol(now);
    }

    /// Preamble: steady key-down for one word gap, then start the message
    fn handle_preamble_state(&mut self, now: u32) {
        if !self.expired(now) {
            return;
        }
        self.config.preamble = false;
        self.advance_symbol(now);
    }

    /// Dit/Dah: pick the gap that follows the element
    fn handle_element_state(&mut self, now: u32) {
        if !self.expired(now) {
            return;
        }

        let unit = self.config.unit();
        let more_elements = self.current.is_some_and(|stream| !stream.is_empty());
        if more_elements || self.config.spacing == Spacing::Legacy {
            self.enter(KeyerState::ElementSpace, unit, now);
            return;
        }

        // Last element of the character
        self.finish_character();
        match self.peek_symbol() {
            Some(Symbol::WordSpace) => {
                self.cursor += 1;
                self.enter(KeyerState::WordSpace, self.config.word_space_ticks(), now);
            }
            Some(Symbol::Code(_)) => {
                self.enter(KeyerState::CharSpace, self.config.char_space_ticks(), now);
            }
            None => self.end_of_message(now),
        }
    }

    /// Gaps: continue with the next element or character
    fn handle_space_state(&mut self, now: u32) {
        if self.expired(now) {
            self.advance_symbol(now);
        }
    }

    /// End delays: the message is complete
    fn handle_message_end_state(&mut self, now: u32) {
        if !self.expired(now) {
            return;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("Message complete");

        self.message.clear();
        self.rewind();
        self.busy = false;
    }

    /// Decode point: enter the state for the next element, gap or end delay
    fn advance_symbol(&mut self, now: u32) {
        if !self.config.transmitter_enabled {
            self.state = KeyerState::Idle;
            return;
        }

        if let Some(stream) = self.current.as_mut() {
            if let Some(element) = stream.next() {
                let ticks = element.duration_units() * self.config.unit();
                self.enter(element.state(), ticks, now);
                return;
            }

            self.finish_character();
            if self.config.spacing == Spacing::Legacy {
                // Character gap on top of the element gap already sent
                self.enter(KeyerState::CharSpace, self.config.char_space_ticks(), now);
                return;
            }
        }

        match self.next_symbol() {
            Some(Symbol::WordSpace) => {
                self.enter(KeyerState::WordSpace, self.config.word_space_ticks(), now);
            }
            Some(Symbol::Code(mut stream)) => {
                // Table codes always hold at least one element
                if let Some(element) = stream.next() {
                    self.current = Some(stream);
                    let ticks = element.duration_units() * self.config.unit();
                    self.enter(element.state(), ticks, now);
                }
            }
            None => self.end_of_message(now),
        }
    }

    fn end_of_message(&mut self, now: u32) {
        self.current = None;
        let word_space = self.config.word_space_ticks();

        match self.config.repeat_delay_minutes {
            0 => self.enter(KeyerState::EndOfMessage, word_space, now),
            minutes => {
                let delay = message_delay_ticks(minutes).max(word_space);
                self.enter(KeyerState::MessageDelay, delay, now);
            }
        }
    }

    fn finish_character(&mut self) {
        self.current = None;
        self.characters_sent = self.characters_sent.wrapping_add(1);
    }

    /// Skip bytes without an encoding and look at the next symbol
    fn peek_symbol(&mut self) -> Option<Symbol> {
        while let Some(&byte) = self.message.get(self.cursor) {
            match lookup(byte) {
                Ok(symbol) => return Some(symbol),
                Err(_) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Skipping unencodable byte {=u8:#x}", byte);
                    self.cursor += 1;
                }
            }
        }
        None
    }

    fn next_symbol(&mut self) -> Option<Symbol> {
        let symbol = self.peek_symbol()?;
        self.cursor += 1;
        Some(symbol)
    }

    fn enter(&mut self, state: KeyerState, ticks: u32, now: u32) {
        #[cfg(feature = "defmt")]
        defmt::trace!("{} -> {} for {} ticks", self.state, state, ticks);

        self.state = state;
        self.state_end = now.wrapping_add(ticks.max(1) - 1);
    }

    /// True once `now` is past the stored end tick
    fn expired(&self, now: u32) -> bool {
        (now.wrapping_sub(self.state_end) as i32) > 0
    }

    fn rewind(&mut self) {
        self.cursor = 0;
        self.current = None;
        self.started = false;
        self.characters_sent = 0;
        self.state = KeyerState::Idle;
    }

    fn levels(&self) -> OutputLevels {
        if !self.config.transmitter_enabled {
            return OutputLevels::default();
        }

        let transmit = self.state.is_keyed();
        let line = if self.config.dual_frequency {
            self.busy && self.state != KeyerState::Idle
        } else {
            transmit || self.state == KeyerState::Preamble
        };

        OutputLevels { transmit, key_line: line, indicator: line }
    }

    fn publish(&self) {
        self.signals.publish(self.levels(), self.busy, self.characters_sent);
    }

    /// Send a preamble before the next message
    pub fn set_preamble_enabled(&mut self, enabled: bool) {
        self.config.preamble = enabled;
    }

    pub fn set_dual_frequency_mode(&mut self, enabled: bool) {
        self.config.dual_frequency = enabled;
        self.publish();
    }

    /// Soft mute; outputs drop immediately, sending pauses at the next gap
    pub fn set_transmitter_enabled(&mut self, enabled: bool) {
        self.config.transmitter_enabled = enabled;
        self.publish();
    }

    /// Pause after the message in minutes, clamped to `MAX_MSG_DELAY_MINUTES`
    pub fn set_repeat_delay_minutes(&mut self, minutes: u8) {
        self.config.repeat_delay_minutes = minutes.min(MAX_MSG_DELAY_MINUTES);
    }

    pub fn set_spacing(&mut self, spacing: Spacing) {
        self.config.spacing = spacing;
    }

    /// A message is queued or being sent
    pub fn busy(&self) -> bool {
        self.busy
    }

    /// True exactly while a dit or dah is keyed
    pub fn transmit(&self) -> bool {
        self.levels().transmit
    }

    pub fn key_line(&self) -> bool {
        self.levels().key_line
    }

    pub fn indicator(&self) -> bool {
        self.levels().indicator
    }

    /// Characters completed in the current message
    pub fn characters_sent(&self) -> u32 {
        self.characters_sent
    }

    pub fn preamble_enabled(&self) -> bool {
        self.config.preamble
    }

    pub fn dual_frequency_mode(&self) -> bool {
        self.config.dual_frequency
    }

    pub fn transmitter_enabled(&self) -> bool {
        self.config.transmitter_enabled
    }

    pub fn repeat_delay_minutes(&self) -> u8 {
        self.config.repeat_delay_minutes
    }

    pub fn spacing(&self) -> Spacing {
        self.config.spacing
    }

    /// Get current FSM state
    pub fn state(&self) -> KeyerState {
        self.state
    }

    pub fn wpm(&self) -> f32 {
        self.config.wpm
    }

    /// Dit length in ticks
    pub fn unit_ticks(&self) -> u32 {
        self.config.unit()
    }

    /// Get current configuration
    pub fn config(&self) -> &KeyerConfig {
        &self.config
    }

    /// Bytes of the message not yet decoded
    pub fn pending(&self) -> &[u8] {
        self.message.get(self.cursor..).unwrap_or(&[])
    }

    pub fn signals(&self) -> &'a KeyerSignals {
        self.signals
    }
}

/// Async host loop: one tick per `TICK_PERIOD_MS`
///
/// Commands queued by other tasks are applied between ticks, so this task
/// stays the only writer of the keyer.
#[cfg(feature = "embassy-time")]
pub async fn keyer_task<K, L, const N: usize, const Q: usize>(
    mut keyer: MorseKeyer<'_, N>,
    mut commands: heapless::spsc::Consumer<'_, Command<N>, Q>,
    mut outputs: crate::hal::KeyerOutputs<K, L>,
) where
    K: crate::hal::OutputLine,
    L: crate::hal::OutputLine<Error = K::Error>,
{
    use embassy_time::{Duration, Ticker};

    let mut ticker = Ticker::every(Duration::from_millis(crate::types::TICK_PERIOD_MS));

    loop {
        while let Some(command) = commands.dequeue() {
            if let Err(_error) = keyer.apply(command) {
                #[cfg(feature = "defmt")]
                defmt::warn!("Command rejected: {}", _error);
            }
        }

        keyer.advance_one_tick();

        if outputs.drive(keyer.signals()).is_err() {
            #[cfg(feature = "defmt")]
            defmt::error!("Output line write failed");
        }

        ticker.next().await;
    }
}
