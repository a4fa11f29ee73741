//! Portable timer abstraction
//!
//! The driver uses a microsecond timer for the time critical sequences of the ACK handling:
//!
//! * starting the ACK transmission a fixed time after a received frame,
//! * bounding the ACK reception window after a transmitted frame.

pub mod traits;

#[cfg(feature = "nrf52840")]
pub mod timer_using_timer;

/// Compare channel starting the ACK transmission
pub const CC_ACK_TX: u8 = 1;
/// Compare channel closing the ACK reception window
pub const CC_ACK_TIMEOUT: u8 = 2;
/// Channel used to capture the current time
pub const CC_CAPTURE: u8 = 3;

/// Shortcuts between timer events and tasks
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerShorts(u32);

impl TimerShorts {
    /// No shortcut
    pub const NONE: TimerShorts = TimerShorts(0);

    /// Compare event of `channel` stops the timer
    pub const fn compare_stop(channel: u8) -> Self {
        Self(1 << (8 + channel))
    }

    /// Raw bits, in the layout of the nRF52 `TIMER` `SHORTS` register
    pub const fn bits(self) -> u32 {
        self.0
    }
}
