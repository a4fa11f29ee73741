/// Errors reported synchronously by the driver API
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The driver is busy with an ongoing critical section
    WouldBlock,
    /// The channel number is out of range for IEEE 802.15.4
    InvalidChannel,
}

/// Reasons of a failed frame reception
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxError {
    /// The received frame has an unsupported type or version, or malformed addressing fields
    InvalidFrame,
    /// The CRC value in the received frame is invalid
    InvalidFcs,
    /// The destination PAN ID or address does not match this device
    InvalidDestAddr,
    /// The length in the PHR is out of range
    InvalidLength,
    /// Interrupts arrived in an order inconsistent with the reception in progress
    Runtime,
    /// The radio scheduler revoked access to the radio during reception
    TimeslotEnded,
    /// Reception was terminated by another request
    Aborted,
    /// The hardware reported transaction errors exceeding the retry limit
    HardwareError,
}

/// Reasons of a failed transmission
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxError {
    /// CCA detected a busy channel
    BusyChannel,
    /// The frame received in the ACK window does not match the transmitted frame or is corrupted
    InvalidAck,
    /// No ACK was received before the ACK timeout expired
    NoAck,
    /// The radio scheduler revoked access to the radio during transmission
    TimeslotEnded,
    /// Transmission was terminated by another request
    Aborted,
    /// The hardware reported transaction errors exceeding the retry limit
    HardwareError,
}

/// Reasons of a failed energy detection
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdError {
    /// Energy detection was terminated by another request
    Aborted,
    /// The hardware reported transaction errors exceeding the retry limit
    HardwareError,
}

/// Reasons of a failed clear channel assessment
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CcaError {
    /// CCA was terminated by another request
    Aborted,
    /// The hardware reported transaction errors exceeding the retry limit
    HardwareError,
}
