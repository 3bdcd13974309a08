//! 1 kHz embassy time driver for CH32V203, clocked by SysTick

use core::cell::Cell;

use critical_section::Mutex;
use embassy_time_driver::{AlarmHandle, Driver};
use portable_atomic::{AtomicBool, Ordering};

struct Alarm {
    timestamp: u64,
    callback: Option<fn(*mut ())>,
    ctx: usize,
}

/// Millisecond counter with a single alarm, enough for the generic timer queue
pub struct SysTickDriver {
    now: Mutex<Cell<u64>>,
    alarm: Mutex<Cell<Alarm>>,
    allocated: AtomicBool,
}

impl SysTickDriver {
    const fn new() -> Self {
        Self {
            now: Mutex::new(Cell::new(0)),
            alarm: Mutex::new(Cell::new(Alarm {
                timestamp: u64::MAX,
                callback: None,
                ctx: 0,
            })),
            allocated: AtomicBool::new(false),
        }
    }

    /// Advance time by one tick and fire the alarm if it is due
    fn on_tick(&self) {
        let due = critical_section::with(|cs| {
            let now = self.now.borrow(cs).get() + 1;
            self.now.borrow(cs).set(now);

            let alarm = self.alarm.borrow(cs);
            let current = alarm.replace(Alarm {
                timestamp: u64::MAX,
                callback: None,
                ctx: 0,
            });
            if current.timestamp <= now {
                current.callback.map(|callback| (callback, current.ctx))
            } else {
                alarm.set(current);
                None
            }
        });

        if let Some((callback, ctx)) = due {
            callback(ctx as *mut ());
        }
    }
}

impl Driver for SysTickDriver {
    fn now(&self) -> u64 {
        critical_section::with(|cs| self.now.borrow(cs).get())
    }

    unsafe fn allocate_alarm(&self) -> Option<AlarmHandle> {
        if self.allocated.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(AlarmHandle::new(0))
        }
    }

    fn set_alarm_callback(&self, _alarm: AlarmHandle, callback: fn(*mut ()), ctx: *mut ()) {
        critical_section::with(|cs| {
            let alarm = self.alarm.borrow(cs);
            let mut current = alarm.replace(Alarm {
                timestamp: u64::MAX,
                callback: None,
                ctx: 0,
            });
            current.callback = Some(callback);
            current.ctx = ctx as usize;
            alarm.set(current);
        });
    }

    fn set_alarm(&self, _alarm: AlarmHandle, timestamp: u64) -> bool {
        critical_section::with(|cs| {
            let now = self.now.borrow(cs).get();
            let alarm = self.alarm.borrow(cs);
            let mut current = alarm.replace(Alarm {
                timestamp: u64::MAX,
                callback: None,
                ctx: 0,
            });

            // Already due: the caller polls instead of waiting
            let armed = timestamp > now;
            current.timestamp = if armed { timestamp } else { u64::MAX };
            alarm.set(current);
            armed
        })
    }
}

embassy_time_driver::time_driver_impl!(static DRIVER: SysTickDriver = SysTickDriver::new());

/// Called from the SysTick interrupt handler
pub fn on_systick() {
    DRIVER.on_tick();
}

// Critical section implementation for single-core RISC-V
#[cfg(target_arch = "riscv32")]
critical_section::set_impl!(RiscvCriticalSection);

#[cfg(target_arch = "riscv32")]
struct RiscvCriticalSection;

#[cfg(target_arch = "riscv32")]
unsafe impl critical_section::Impl for RiscvCriticalSection {
    unsafe fn acquire() -> u8 {
        let mut mstatus: usize;
        core::arch::asm!("csrrci {}, mstatus, 8", out(reg) mstatus);
        (mstatus & 8) as u8
    }

    unsafe fn release(was_active: u8) {
        if was_active != 0 {
            core::arch::asm!("csrsi mstatus, 8");
        }
    }
}
