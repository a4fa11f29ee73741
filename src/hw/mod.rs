//! Hardware abstraction used by the driver
//!
//! Each port of the driver to a platform implements the traits of the submodules:
//!
//! * [`RadioPeripheral`](radio::traits::RadioPeripheral) for the radio registers,
//! * [`SignalRouting`](ppi::traits::SignalRouting) for the hardware event to task routing,
//! * [`RadioTimer`](timer::traits::RadioTimer) for the timer used in time critical sequences,
//! * [`Settle`](settle::Settle) for short busy waits.
//!
//! A type implementing all of them is a [`Hardware`] usable by the
//! [`Driver`](crate::radio::Driver).

pub mod ppi;
pub mod radio;
pub mod settle;
pub mod timer;

#[cfg(all(test, feature = "mocked_platform"))]
pub mod mock;
#[cfg(feature = "nrf52840")]
pub mod nrf52840;

use ppi::traits::SignalRouting;
use radio::traits::RadioPeripheral;
use settle::Settle;
use timer::traits::RadioTimer;

#[cfg(test)]
use mockall::*;

/// All the hardware used by the driver
pub trait Hardware: RadioPeripheral + SignalRouting + RadioTimer + Settle {}

impl<T> Hardware for T where T: RadioPeripheral + SignalRouting + RadioTimer + Settle {}

/// Masks the radio interrupt while the driver's critical section is held
#[cfg_attr(test, automock)]
pub trait IrqGate {
    /// Prevent the radio interrupt handler from running
    fn mask(&self);

    /// Let the radio interrupt handler run again
    fn unmask(&self);
}

/// Gate which does not mask anything
///
/// Suitable when the radio interrupt handler cannot preempt the driver's callers, for example
/// when all of them run at the same interrupt priority.
pub struct NoIrqGate;

impl IrqGate for NoIrqGate {
    fn mask(&self) {}

    fn unmask(&self) {}
}
