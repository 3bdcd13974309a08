//! CH32V203 Hardware Implementation
//!
//! 64KB Flash / 20KB RAM. Key line on PA2, transmit LED on PA3,
//! 1 ms SysTick driving the embassy time base.

use morse_core::{HalError, OutputLine};

/// RCC and GPIO register addresses
const RCC_APB2PCENR: usize = 0x4002_1018;
const GPIOA_BASE: usize = 0x4001_0800;
const GPIO_CFGLR: usize = 0x00;
const GPIO_OUTDR: usize = 0x0C;
const GPIO_BSHR: usize = 0x10;

/// SysTick register addresses
const STK_CTLR: usize = 0xE000_F000;
const STK_SR: usize = 0xE000_F004;
const STK_CNTL: usize = 0xE000_F008;
const STK_CMPLR: usize = 0xE000_F010;

/// HCLK after reset (HSI)
pub const HCLK_HZ: u32 = 8_000_000;

/// Push-pull output, 2 MHz
const CFG_OUTPUT_PP_2MHZ: u32 = 0b0010;

/// Push-pull output on a GPIOA pin
struct GpioOutput {
    pin: u8,
    initialized: bool,
}

impl GpioOutput {
    const fn new(pin: u8) -> Self {
        Self {
            pin,
            initialized: false,
        }
    }

    fn init(&mut self) -> Result<(), HalError> {
        if self.pin > 7 {
            return Err(HalError::InvalidConfig);
        }

        let shift = self.pin as usize * 4;
        // SAFETY: single-threaded init before the executor starts; addresses
        // are the CH32V203 RCC and GPIOA blocks
        unsafe {
            let rcc = RCC_APB2PCENR as *mut u32;
            let enabled = core::ptr::read_volatile(rcc);
            core::ptr::write_volatile(rcc, enabled | (1 << 2)); // IOPAEN

            let cfglr = (GPIOA_BASE + GPIO_CFGLR) as *mut u32;
            let mut cfg = core::ptr::read_volatile(cfglr);
            cfg &= !(0xF << shift);
            cfg |= CFG_OUTPUT_PP_2MHZ << shift;
            core::ptr::write_volatile(cfglr, cfg);
        }

        self.initialized = true;
        self.write(false)
    }

    fn write(&mut self, high: bool) -> Result<(), HalError> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }
        let bit = if high { 1 << self.pin } else { 1 << (self.pin + 16) };
        // SAFETY: BSHR writes are atomic set/reset of a single pin
        unsafe {
            core::ptr::write_volatile((GPIOA_BASE + GPIO_BSHR) as *mut u32, bit);
        }
        Ok(())
    }

    fn read(&self) -> Result<bool, HalError> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }
        // SAFETY: read-only access to the output data register
        let outdr = unsafe { core::ptr::read_volatile((GPIOA_BASE + GPIO_OUTDR) as *const u32) };
        Ok(outdr & (1 << self.pin) != 0)
    }
}

/// Key line to the transmitter (PA2)
pub struct KeyOutputPin(GpioOutput);

impl OutputLine for KeyOutputPin {
    type Error = HalError;

    fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("Key line: {}", high);
        self.0.write(high)
    }

    fn level(&self) -> Result<bool, Self::Error> {
        self.0.read()
    }
}

/// Transmit indicator LED (PA3)
pub struct LedPin(GpioOutput);

impl OutputLine for LedPin {
    type Error = HalError;

    fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
        self.0.write(high)
    }

    fn level(&self) -> Result<bool, Self::Error> {
        self.0.read()
    }
}

/// Configure the output pins and the 1 ms SysTick
pub fn init_hardware() -> Result<(KeyOutputPin, LedPin), HalError> {
    let mut key = GpioOutput::new(pins::KEY_PIN);
    let mut led = GpioOutput::new(pins::LED_PIN);
    key.init()?;
    led.init()?;
    configure_systick();

    #[cfg(feature = "defmt")]
    defmt::info!("CH32V203 outputs initialized");

    Ok((KeyOutputPin(key), LedPin(led)))
}

/// Configure SysTick for 1ms interrupts
fn configure_systick() {
    // SAFETY: SysTick is owned by the time driver; configured once at boot
    unsafe {
        core::ptr::write_volatile(STK_CMPLR as *mut u32, HCLK_HZ / 1000 - 1);
        core::ptr::write_volatile(STK_CNTL as *mut u32, 0);
        core::ptr::write_volatile(STK_SR as *mut u32, 0);
        // STE | STIE | STCLK (HCLK) | STRE (auto reload)
        core::ptr::write_volatile(STK_CTLR as *mut u32, 0xF);
    }
}

/// SysTick interrupt handler body
pub fn handle_systick_interrupt() {
    // SAFETY: clearing CNTIF is the only write to SR outside init
    unsafe {
        core::ptr::write_volatile(STK_SR as *mut u32, 0);
    }
    crate::time_driver::on_systick();
}

/// CH32V203 pin configuration constants
pub mod pins {
    /// Key output pin
    pub const KEY_PIN: u8 = 2; // PA2

    /// Transmit indicator LED
    pub const LED_PIN: u8 = 3; // PA3
}

/// CH32V203 memory layout information
pub mod memory {
    /// Available RAM
    pub const RAM_SIZE: u32 = 20 * 1024;

    /// Commands waiting for the keyer task
    pub const COMMAND_QUEUE_SIZE: usize = 4;
}
