//! Traits required from a portable timer

use super::TimerShorts;

/// Microsecond timer driving the time critical sequences
pub trait RadioTimer {
    /// Configure the timer to count microseconds
    fn timer_init(&mut self);

    /// Start counting from the current value
    fn timer_start(&mut self);

    /// Stop the timer and clear its value
    fn timer_shutdown(&mut self);

    /// Replace the timer's shortcuts
    fn timer_shorts_set(&mut self, shorts: TimerShorts);

    /// Set compare value of `channel` in microseconds
    fn timer_compare_set(&mut self, channel: u8, value_us: u32);

    /// Capture the current timer value using `channel`
    fn timer_capture(&mut self, channel: u8) -> u32;
}
