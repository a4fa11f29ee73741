//! Types describing the operation state machine

use crate::scheduler::PriorityLevel;

/// Operation performed by the driver
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperationState {
    /// Radio powered down
    Sleep,
    /// Radio is being disabled before entering [`Sleep`](OperationState::Sleep)
    FallingAsleep,
    /// Listening for frames or receiving one
    Receive,
    /// Transmitting an ACK to the received frame
    TransmitAck,
    /// Transmitting a frame
    Transmit,
    /// Transmitting a frame preceded by clear channel assessment
    ClearChannelTransmit,
    /// Waiting for the ACK to the transmitted frame
    ReceiveAck,
    /// Measuring the energy level in the channel
    EnergyDetect,
    /// Standalone clear channel assessment
    ClearChannelAssess,
    /// Transmitting an unmodulated carrier
    ContinuousCarrier,
}

impl OperationState {
    /// Priority of radio access requested from the radio scheduler in this state
    pub(crate) fn priority(self) -> PriorityLevel {
        match self {
            OperationState::Sleep | OperationState::FallingAsleep => PriorityLevel::Idle,
            OperationState::Receive => PriorityLevel::IdleListening,
            OperationState::EnergyDetect | OperationState::ClearChannelAssess => {
                PriorityLevel::Detect
            }
            OperationState::TransmitAck
            | OperationState::Transmit
            | OperationState::ClearChannelTransmit
            | OperationState::ReceiveAck
            | OperationState::ContinuousCarrier => PriorityLevel::Transmit,
        }
    }

    /// Check if the frame to transmit is part of this state
    pub(crate) fn transmits_frame(self) -> bool {
        matches!(
            self,
            OperationState::Transmit
                | OperationState::ClearChannelTransmit
                | OperationState::ReceiveAck
        )
    }
}

/// Severity of termination of the ongoing operation requested by a new one
///
/// Each operation can be interrupted only by a request with high enough severity. A receiver in
/// the middle of a frame yields only to [`Forced`](Termination::Forced), transmissions and
/// detections to [`Protocol`](Termination::Protocol), idle states to anything.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Termination {
    /// Terminate only operations which lose nothing when interrupted
    None,
    /// Terminate ongoing protocol procedures
    Protocol,
    /// Terminate any operation, including frames being received
    Forced,
}

/// Parity bits flipped after each successful transfer in the given direction
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SequenceToggles {
    /// Flipped on every transmitted frame
    pub tx: bool,
    /// Flipped on every received frame
    pub rx: bool,
}

/// Function informing the caller of [`receive`](crate::radio::Driver::receive) or
/// [`transmit`](crate::radio::Driver::transmit) if the request was accepted
///
/// It is called inside the driver's critical section, before the request returns.
pub type AcceptedCallback = fn(bool);

/// Context of the ongoing operation, reset on every state change
#[derive(Debug, Default)]
pub(crate) struct Transfer<'a> {
    pub(crate) tx_frame: Option<&'a [u8]>,
    pub(crate) ed_result: u8,
    pub(crate) ed_time_left_us: u32,
    pub(crate) tx_started: bool,
    pub(crate) transaction_errors: u8,
}

/// Progress of the frame reception
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct RxFlags {
    pub(crate) frame_filtered: bool,
    pub(crate) psdu_being_received: bool,
    pub(crate) timeslot_requested: bool,
}
