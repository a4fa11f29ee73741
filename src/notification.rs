//! Notifications delivered by the driver to the application
//!
//! The driver never calls the application while the driver state is borrowed. Outcomes of the
//! operations are queued as [`Notification`]s and dispatched when the state is released, with the
//! critical section's nesting window open. This allows the application to request the next
//! operation from within a notification.

use crate::error::{CcaError, EdError, RxError, TxError};
use crate::rx_buffer::RxFrame;

/// Callbacks of the application, one call per outcome of an operation
pub trait Notifications<'a> {
    /// A frame was received
    ///
    /// `frame` must be returned with [`Driver::buffer_free`](crate::radio::Driver::buffer_free).
    fn received(&self, frame: RxFrame<'a>, rssi: i8, lqi: u8);

    /// Reception of a frame failed
    fn receive_failed(&self, error: RxError);

    /// A frame was transmitted
    ///
    /// `ack` holds the received ACK if the frame requested one. It must be returned with
    /// [`Driver::buffer_free`](crate::radio::Driver::buffer_free). `rssi` and `lqi` describe the
    /// ACK and are zero without it.
    fn transmitted(&self, frame: &'a [u8], ack: Option<RxFrame<'a>>, rssi: i8, lqi: u8);

    /// Transmission of a frame failed
    fn transmit_failed(&self, frame: &'a [u8], error: TxError);

    /// Energy detection finished with the given result
    fn energy_detected(&self, result: u8);

    /// Energy detection failed
    fn energy_detection_failed(&self, error: EdError);

    /// Clear channel assessment finished
    fn cca_done(&self, channel_free: bool);

    /// Clear channel assessment failed
    fn cca_failed(&self, error: CcaError);
}

/// Queued outcome of an operation
#[derive(Debug)]
pub(crate) enum Notification<'a> {
    Received {
        frame: RxFrame<'a>,
        rssi: i8,
        lqi: u8,
    },
    ReceiveFailed(RxError),
    Transmitted {
        frame: &'a [u8],
        ack: Option<RxFrame<'a>>,
        rssi: i8,
        lqi: u8,
    },
    TransmitFailed {
        frame: &'a [u8],
        error: TxError,
    },
    EnergyDetected(u8),
    EnergyDetectionFailed(EdError),
    CcaDone(bool),
    CcaFailed(CcaError),
}

impl<'a> Notification<'a> {
    /// Deliver this notification to the application
    pub(crate) fn deliver<N: Notifications<'a>>(self, notifier: &N) {
        match self {
            Notification::Received { frame, rssi, lqi } => notifier.received(frame, rssi, lqi),
            Notification::ReceiveFailed(error) => notifier.receive_failed(error),
            Notification::Transmitted {
                frame,
                ack,
                rssi,
                lqi,
            } => notifier.transmitted(frame, ack, rssi, lqi),
            Notification::TransmitFailed { frame, error } => notifier.transmit_failed(frame, error),
            Notification::EnergyDetected(result) => notifier.energy_detected(result),
            Notification::EnergyDetectionFailed(error) => notifier.energy_detection_failed(error),
            Notification::CcaDone(channel_free) => notifier.cca_done(channel_free),
            Notification::CcaFailed(error) => notifier.cca_failed(error),
        }
    }
}
