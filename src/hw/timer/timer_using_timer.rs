//! Timer implementation based on the TIMER peripheral available in nRF MCUs
//!
//! This is the simplest timer with microsecond precision available in nRF52. It runs only during
//! the ACK sequences, so its power consumption is acceptable.

use super::traits::RadioTimer;
use super::TimerShorts;
use crate::hw::nrf52840::Nrf52840Hardware;
use nrf52840_hal::pac::timer0;

/// Prescaler dividing the 16 MHz clock to 1 MHz
const PRESCALER_1MHZ: u8 = 4;

impl RadioTimer for Nrf52840Hardware {
    fn timer_init(&mut self) {
        self.timer_shutdown();
        self.timer
            .mode
            .write(|w| w.mode().variant(timer0::mode::MODE_A::TIMER));
        self.timer
            .bitmode
            .write(|w| w.bitmode().variant(timer0::bitmode::BITMODE_A::_32BIT));
        self.timer
            .prescaler
            .write(|w| w.prescaler().variant(PRESCALER_1MHZ));
    }

    fn timer_start(&mut self) {
        self.timer.tasks_start.write(|w| unsafe { w.bits(1) });
    }

    fn timer_shutdown(&mut self) {
        self.timer.tasks_stop.write(|w| unsafe { w.bits(1) });
        self.timer.tasks_clear.write(|w| unsafe { w.bits(1) });
    }

    fn timer_shorts_set(&mut self, shorts: TimerShorts) {
        self.timer.shorts.write(|w| unsafe { w.bits(shorts.bits()) });
    }

    fn timer_compare_set(&mut self, channel: u8, value_us: u32) {
        self.timer.events_compare[channel as usize].write(|w| unsafe { w.bits(0) });
        self.timer.cc[channel as usize].write(|w| w.cc().variant(value_us));
    }

    fn timer_capture(&mut self, channel: u8) -> u32 {
        self.timer.tasks_capture[channel as usize].write(|w| unsafe { w.bits(1) });
        self.timer.cc[channel as usize].read().bits()
    }
}
