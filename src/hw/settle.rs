//! Short bounded waits for the hardware to settle
//!
//! Some hardware sequences need a few microseconds before their effect can be observed, for
//! example an event propagating through the signal routing fabric. The driver never blocks
//! longer than the timeout given to [`wait_for`].

use core::cell::Cell;

/// Busy-wait primitive of a platform
pub trait Settle {
    /// Wait for `us` microseconds
    fn delay_us(&mut self, us: u32);
}

/// Wait until `condition` is met or `timeout_us` passes
///
/// The condition is checked before each microsecond of waiting and once more after the timeout.
/// Returns `true` if the condition was met.
///
/// # Examples
///
/// ```
/// use nrf_radio_802154::hw::settle::{wait_for, VirtualClock};
///
/// let mut clock = VirtualClock::new();
/// assert!(wait_for(&mut clock, 10, |clock| clock.now_us() >= 3));
/// assert_eq!(clock.now_us(), 3);
/// ```
pub fn wait_for<H, F>(hw: &mut H, timeout_us: u32, mut condition: F) -> bool
where
    H: Settle + ?Sized,
    F: FnMut(&mut H) -> bool,
{
    let mut waited = 0;

    loop {
        if condition(hw) {
            return true;
        }
        if waited >= timeout_us {
            return false;
        }
        hw.delay_us(1);
        waited += 1;
    }
}

/// Clock advanced by [`Settle::delay_us`] instead of passing real time
#[derive(Debug, Default)]
pub struct VirtualClock {
    now_us: Cell<u64>,
}

impl VirtualClock {
    /// Create a clock starting at zero
    pub const fn new() -> Self {
        Self {
            now_us: Cell::new(0),
        }
    }

    /// Microseconds waited so far
    pub fn now_us(&self) -> u64 {
        self.now_us.get()
    }

    /// Move the clock forward without waiting
    pub fn advance(&self, us: u32) {
        self.now_us.set(self.now_us.get() + u64::from(us));
    }
}

impl Settle for VirtualClock {
    fn delay_us(&mut self, us: u32) {
        self.advance(us);
    }
}
