//! Physical pin writes through `KeyerOutputs`, checked with embedded-hal-mock

use embedded_hal_mock::eh1::pin::{Mock as PinMock, State as PinState, Transaction as PinTransaction};
use morse_core::*;

fn keyer(signals: &KeyerSignals, config: KeyerConfig) -> MorseKeyer<'_> {
    MorseKeyer::new(signals, config)
}

/// Tick until the message completes, driving the outputs after every tick
fn drive_message<K, L>(keyer: &mut MorseKeyer<'_>, outputs: &mut KeyerOutputs<K, L>)
where
    K: OutputLine,
    L: OutputLine<Error = K::Error>,
    K::Error: core::fmt::Debug,
{
    while {
        keyer.advance_one_tick();
        outputs.drive(keyer.signals()).unwrap();
        keyer.busy()
    } {}
}

#[test]
fn test_single_dit_pin_edges() {
    let signals = KeyerSignals::new();
    let mut keyer = keyer(&signals, KeyerConfig::new(20.0, Spacing::Standard).unwrap());
    let pin = PinMock::new(&[
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
    ]);
    let mut outputs = KeyerOutputs::key_only(EmbeddedHalOutput::new(pin, false));

    keyer.send("E").unwrap();
    drive_message(&mut keyer, &mut outputs);

    let (key, _) = outputs.into_parts();
    key.into_inner().done();
}

#[test]
fn test_inverted_key_line() {
    let signals = KeyerSignals::new();
    let mut keyer = keyer(&signals, KeyerConfig::new(20.0, Spacing::Standard).unwrap());
    // Open-collector keying: key down pulls the pin low
    let pin = PinMock::new(&[
        PinTransaction::set(PinState::Low),
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
        PinTransaction::set(PinState::High),
    ]);
    let mut outputs = KeyerOutputs::key_only(EmbeddedHalOutput::new(pin, true));

    keyer.send("A").unwrap();
    drive_message(&mut keyer, &mut outputs);

    let (key, _) = outputs.into_parts();
    key.into_inner().done();
}

#[test]
fn test_dual_frequency_holds_both_lines() {
    let signals = KeyerSignals::new();
    let config = KeyerConfig::new(20.0, Spacing::Standard)
        .unwrap()
        .with_dual_frequency(true);
    let mut keyer = keyer(&signals, config);

    // One rise when sending starts, one fall when the message completes
    let edges = [
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
    ];
    let key = EmbeddedHalOutput::new(PinMock::new(&edges), false);
    let led = EmbeddedHalOutput::new(PinMock::new(&edges), false);
    let mut outputs = KeyerOutputs::new(key, led);

    keyer.send("SOS").unwrap();
    drive_message(&mut keyer, &mut outputs);

    let (key, led) = outputs.into_parts();
    key.into_inner().done();
    led.into_inner().done();
}

#[test]
fn test_mute_releases_pin_immediately() {
    let signals = KeyerSignals::new();
    let mut keyer = keyer(&signals, KeyerConfig::new(20.0, Spacing::Standard).unwrap());
    let pin = PinMock::new(&[
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
    ]);
    let mut outputs = KeyerOutputs::key_only(EmbeddedHalOutput::new(pin, false));

    keyer.send("TT").unwrap();
    keyer.advance_one_tick();
    outputs.drive(&signals).unwrap();

    keyer.set_transmitter_enabled(false);
    outputs.drive(&signals).unwrap();
    for _ in 0..1000 {
        keyer.advance_one_tick();
        outputs.drive(&signals).unwrap();
    }
    assert!(keyer.busy());

    let (key, _) = outputs.into_parts();
    key.into_inner().done();
}
