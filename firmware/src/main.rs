#![no_std]
#![no_main]

#[cfg(feature = "defmt")]
use defmt_rtt as _;

// RISC-V runtime
use riscv_rt as _;

// Panic handler
use panic_halt as _;

use embassy_executor::Spawner;
use embassy_time::Duration;
use static_cell::StaticCell;

use rustymorse_firmware::*;

/// Text sent by the beacon
const BEACON_TEXT: &str = "VVV DE N0CALL BEACON";

// Static resources
static SIGNALS: KeyerSignals = KeyerSignals::new();
static COMMANDS: StaticCell<CommandQueue> = StaticCell::new();

/// Main firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    #[cfg(feature = "defmt")]
    defmt::info!("Rusty Morse beacon starting...");

    let (key, led) = match init_hardware() {
        Ok(pins) => pins,
        Err(_error) => {
            #[cfg(feature = "defmt")]
            defmt::error!("Hardware init failed: {}", _error);
            return;
        }
    };

    let config = default_config().with_repeat_delay(1);
    #[cfg(feature = "defmt")]
    defmt::info!("Keyer config: {} WPM, repeat every {} min",
                 config.wpm, config.repeat_delay_minutes);

    let keyer = MorseKeyer::new(&SIGNALS, config);
    let (producer, consumer) = COMMANDS.init(Queue::new()).split();

    spawner.must_spawn(keyer_task_wrapper(keyer, consumer, KeyerOutputs::new(key, led)));
    spawner.must_spawn(beacon_task(producer, &SIGNALS, BEACON_TEXT));

    #[cfg(feature = "defmt")]
    defmt::info!("Beacon ready");

    // Main supervision loop
    loop {
        embassy_time::Timer::after(Duration::from_secs(10)).await;
        #[cfg(feature = "defmt")]
        defmt::trace!("Heartbeat: {}", SIGNALS.snapshot());
    }
}

#[no_mangle]
extern "C" fn SysTick() {
    handle_systick_interrupt();
}
