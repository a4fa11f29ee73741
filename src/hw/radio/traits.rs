//! Traits used for radio peripheral portability

use super::{CcaMode, HardwareEvent, Interrupts, RadioState, RadioTask, Shorts};

/// Named operations on the radio peripheral registers
///
/// Methods taking `&mut self` modify the hardware, methods taking `&self` only read it.
pub trait RadioPeripheral {
    /// Power cycle the peripheral restoring the reset value of all its registers
    fn reset(&mut self);

    /// Configure mode, packet format and CRC for IEEE 802.15.4
    fn configure_802154(&mut self);

    /// Configure and enable the peripheral's interrupt line
    fn irq_init(&mut self);

    /// Disable the peripheral's interrupt line and drop any pending request
    fn irq_deinit(&mut self);

    /// Set the radio frequency as an offset from 2400 MHz
    fn frequency_set(&mut self, offset_mhz: u8);

    /// Set the transmit power in dBm
    fn tx_power_set(&mut self, dbm: i8);

    /// Configure clear channel assessment
    fn cca_configure(&mut self, mode: CcaMode, ed_threshold: u8, corr_threshold: u8, corr_limit: u8);

    /// Set the memory address used by the next transfer
    ///
    /// The memory must stay valid until the transfer is finished or the radio disabled.
    fn packet_ptr_set(&mut self, ptr: *const u8);

    /// Replace the shortcuts between radio events and tasks
    fn shorts_set(&mut self, shorts: Shorts);

    /// Get the current shortcuts
    fn shorts_get(&self) -> Shorts;

    /// Trigger a task
    fn task_trigger(&mut self, task: RadioTask);

    /// Check if `event` was generated
    fn event_check(&self, event: HardwareEvent) -> bool;

    /// Clear `event`
    fn event_clear(&mut self, event: HardwareEvent);

    /// Enable interrupts of the given sources
    fn interrupts_enable(&mut self, interrupts: Interrupts);

    /// Disable interrupts of the given sources
    fn interrupts_disable(&mut self, interrupts: Interrupts);

    /// Get the set of enabled interrupt sources
    fn interrupts_enabled(&self) -> Interrupts;

    /// Get the current state of the peripheral
    fn state_get(&self) -> RadioState;

    /// Check if the last received frame has a correct CRC
    fn crc_ok(&self) -> bool;

    /// Last RSSI sample, as a positive number of dBm below zero
    fn rssi_sample(&self) -> u8;

    /// Result of the last energy detection
    fn ed_sample(&self) -> u8;

    /// Set the number of additional energy detection windows, the maximum of which is reported
    fn ed_loop_count_set(&mut self, count: u32);

    /// Set the number of received bits generating the `Bcmatch` event
    fn bcc_set(&mut self, bits: u32);

    /// Get the bit counter compare value
    fn bcc_get(&self) -> u32;

    /// Set the pattern searched by the header-match unit
    fn mhmu_pattern_set(&mut self, pattern: u32);

    /// Set the mask of bits compared by the header-match unit
    fn mhmu_mask_set(&mut self, mask: u32);
}
