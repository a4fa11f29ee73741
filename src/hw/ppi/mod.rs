//! Portable signal routing abstraction
//!
//! Signal routing (PPI in nRF52 series) allows hardware events of one peripheral to trigger tasks
//! in other peripherals. Such task triggering has minimal latency with controllable jitter,
//! because it does not require CPU processing. The driver uses it for the sequences which must
//! happen within microseconds, like starting the ACK transmission after a received frame.
//!
//! An event generator unit (EGU) is part of the fabric: the driver triggers it to start a sequence
//! and checks its event to find out if the sequence was started by the hardware.

pub mod traits;

#[cfg(feature = "nrf52840")]
pub mod legacy_ppi;

/// Routes used by the driver
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PpiChannel {
    /// Radio DISABLED event triggers the EGU
    DisabledEgu,
    /// EGU event ramps up the radio, optionally disabling itself
    EguRampUp,
    /// EGU event starts the timer
    EguTimerStart,
    /// Timer compare starts the ACK transmission
    TimerTxAck,
}

/// Events which can be routed
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RoutedEvent {
    /// Radio DISABLED event
    RadioDisabled,
    /// EGU event
    EguTriggered,
    /// Timer compare event of the given channel
    TimerCompare(u8),
}

/// Tasks which can be triggered by routed events
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RoutedTask {
    /// Ramp up the receiver
    RadioRxEn,
    /// Ramp up the transmitter
    RadioTxEn,
    /// Trigger the EGU
    EguTrigger,
    /// Start the timer
    TimerStart,
    /// Disable all the routes in the self-disabling group
    GroupDisable,
}
