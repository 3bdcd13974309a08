//! Host-side harness for the Morse keyer: a tokio tick loop standing in
//! for the firmware task, plus the integration test modules.

use std::time::Duration;

use morse_core::{Command, MorseKeyer, TICK_PERIOD_MS};
use tokio::sync::mpsc::{error::TryRecvError, Receiver};

#[cfg(test)]
mod pin_tests;
#[cfg(test)]
mod timing_tests;

/// Drive `keyer` from a 1 ms tokio interval, applying queued commands
/// between ticks.
///
/// Returns the keyer once the sender side is dropped and the last message
/// has completed.
pub async fn run_keyer(mut keyer: MorseKeyer<'static>, mut commands: Receiver<Command>) -> MorseKeyer<'static> {
    let mut interval = tokio::time::interval(Duration::from_millis(TICK_PERIOD_MS));
    let mut open = true;

    loop {
        interval.tick().await;

        while open {
            match commands.try_recv() {
                Ok(command) => {
                    if let Err(error) = keyer.apply(command) {
                        eprintln!("Command rejected: {error}");
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => open = false,
            }
        }

        if !open && !keyer.busy() {
            return keyer;
        }

        keyer.advance_one_tick();
    }
}

/// Text as a `Send` command; panics if it exceeds the transmit buffer
pub fn send_command(text: &str) -> Command {
    match heapless::String::try_from(text) {
        Ok(text) => Command::Send(text),
        Err(_) => panic!("{text:?} does not fit the transmit buffer"),
    }
}
