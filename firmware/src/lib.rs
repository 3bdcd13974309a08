#![no_std]

//! Firmware library: CH32V203 outputs and the embassy tasks of the beacon

pub use embassy_executor::Spawner;
pub use embassy_time::Duration;
pub use heapless::spsc::Queue;
pub use static_cell::StaticCell;

pub use morse_core::*;

pub use crate::ch32v203_hardware::*;
pub use crate::tasks::*;

// Embassy tasks module
pub mod tasks {
    use super::*;
    use crate::ch32v203_hardware::memory::COMMAND_QUEUE_SIZE;
    use heapless::spsc::{Consumer, Producer};

    /// Queue between the beacon task and the keyer task
    pub type CommandQueue = Queue<Command, COMMAND_QUEUE_SIZE>;

    /// Keyer task wrapper
    #[embassy_executor::task]
    pub async fn keyer_task_wrapper(
        keyer: MorseKeyer<'static>,
        commands: Consumer<'static, Command, COMMAND_QUEUE_SIZE>,
        outputs: KeyerOutputs<KeyOutputPin, LedPin>,
    ) {
        #[cfg(feature = "defmt")]
        defmt::info!("Keyer task started");
        morse_core::fsm::keyer_task(keyer, commands, outputs).await;
    }

    /// Resend `text` every time the keyer goes idle
    ///
    /// The keyer holds `busy` through its repeat delay, so the pause between
    /// messages comes from `KeyerConfig::repeat_delay_minutes`.
    #[embassy_executor::task]
    pub async fn beacon_task(
        mut commands: Producer<'static, Command, COMMAND_QUEUE_SIZE>,
        signals: &'static KeyerSignals,
        text: &'static str,
    ) {
        #[cfg(feature = "defmt")]
        defmt::info!("Beacon task started");

        let message = match heapless::String::try_from(text) {
            Ok(message) => message,
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::error!("Beacon text exceeds {} bytes", TX_BUFFER_SIZE);
                return;
            }
        };

        loop {
            if !signals.busy() {
                #[cfg(feature = "defmt")]
                defmt::debug!("Queueing beacon message");
                if commands.enqueue(Command::Send(message.clone())).is_err() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Command queue full");
                }
            }
            // Give the keyer time to pick the message up before checking again
            embassy_time::Timer::after(Duration::from_millis(100)).await;
        }
    }
}

// CH32V203 hardware module
pub mod ch32v203_hardware;

// Time driver for embassy
pub mod time_driver;
