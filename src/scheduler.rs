//! Interface of the radio scheduler
//!
//! The radio scheduler multiplexes the physical radio among its users (this driver and, for
//! example, another radio protocol stack). The driver requests a [`PriorityLevel`] and the
//! scheduler asynchronously reports the approved level through
//! [`Driver::priority_changed`](crate::radio::Driver::priority_changed). Any approved level above
//! [`PriorityLevel::Idle`] grants the driver a timeslot; [`PriorityLevel::Idle`] revokes it.

#[cfg(test)]
use mockall::*;

/// Priority of radio access requested from the radio scheduler
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PriorityLevel {
    /// No access to the radio is needed
    Idle,
    /// Listening for incoming frames
    IdleListening,
    /// A frame is being received
    Receive,
    /// Energy detection or clear channel assessment
    Detect,
    /// Transmission of a frame or an ACK
    Transmit,
}

/// Services of the radio scheduler used by the driver
#[cfg_attr(test, automock)]
pub trait Scheduler {
    /// Request radio access with the given priority
    ///
    /// The scheduler reports the approved level later through
    /// [`Driver::priority_changed`](crate::radio::Driver::priority_changed). It may do it from
    /// within this call.
    fn request_priority(&self, level: PriorityLevel);

    /// Request that the current timeslot lasts at least `length_us` more microseconds
    ///
    /// Returns `true` if the timeslot is long enough or was extended.
    fn timeslot_request(&self, length_us: u32) -> bool;

    /// Microseconds left in the currently granted timeslot
    fn timeslot_us_left(&self) -> u32;

    /// Informs the scheduler that the driver processed the loss of its timeslot
    fn continuous_ended(&self);
}
