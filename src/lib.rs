#![cfg_attr(not(any(test, doctest)), no_std)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

//! IEEE 802.15.4 radio driver core for Nordic nRF SoCs.
//!
//! The crate implements the operation state machine of the radio (sleep, receive, transmit with
//! optional CCA and ACK reception, energy detection, clear channel assessment and continuous
//! carrier), a reentrant critical section serializing callers, the radio interrupt and the radio
//! scheduler, and the arbitration protocol with that scheduler.
//!
//! The hardware is accessed through traits in the [`hw`] module. The nRF52840 port implements
//! them with register writes, while the mocked platform provides a RAM-backed fake used by unit
//! tests.

#[cfg(not(any(feature = "mocked_platform", feature = "nrf52840")))]
compile_error!("One platform must be enabled as a build feature");

#[cfg(all(feature = "mocked_platform", feature = "nrf52840"))]
compile_error!("Cannot enable multiple platforms simultaneously (mocked and nrf52840)");

#[cfg(all(test, not(feature = "mocked_platform")))]
compile_error!("For tests \"mocked_platform\" feature shall be selected");

mod log;

pub mod config;
pub mod crit_sect;
pub mod hw;
pub mod ieee802154;
pub mod mutex;
pub mod notification;
pub mod rx_buffer;
pub mod scheduler;

/// Defines errors reported by this crate
pub mod error;

/// Radio driver core: entry points, interrupt handling and scheduler arbitration.
///
/// To use this module create an instance of [`Driver`](radio::Driver) and call its methods from
/// the application, the radio interrupt handler and the radio scheduler.
pub mod radio;
