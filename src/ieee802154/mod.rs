//! Features specific to IEEE 802.15.4 MAC
//!
//! Frames handled by the driver are stored as the PHR followed by the PSDU, so the offsets below
//! count the PHR as byte 0.

pub mod ack;
pub mod correction;
pub mod duration;
pub mod filter;
pub mod pib;

/// Maximal length of a PSDU
pub const MAX_PACKET_SIZE: usize = 127;
/// Length of the PHR
pub const PHR_SIZE: usize = 1;
/// Length of the frame control field
pub const FCF_SIZE: usize = 2;
/// Length of the frame check sequence
pub const FCS_SIZE: usize = 2;
/// Length of the PSDU of an immediate acknowledgement
pub const IMM_ACK_LENGTH: u8 = 5;

pub(crate) const FRAME_TYPE_OFFSET: usize = 1;
pub(crate) const FRAME_TYPE_MASK: u8 = 0x07;
pub(crate) const FRAME_TYPE_BEACON: u8 = 0x00;
pub(crate) const FRAME_TYPE_DATA: u8 = 0x01;
pub(crate) const FRAME_TYPE_ACK: u8 = 0x02;
pub(crate) const FRAME_TYPE_COMMAND: u8 = 0x03;

pub(crate) const FRAME_PENDING_BIT: u8 = 0x10;
pub(crate) const ACK_REQUEST_OFFSET: usize = 1;
pub(crate) const ACK_REQUEST_BIT: u8 = 0x20;

pub(crate) const DSN_SUPPRESS_OFFSET: usize = 2;
pub(crate) const DSN_SUPPRESS_BIT: u8 = 0x01;
pub(crate) const DST_ADDR_TYPE_OFFSET: usize = 2;
pub(crate) const DST_ADDR_TYPE_MASK: u8 = 0x0c;
pub(crate) const DST_ADDR_TYPE_NONE: u8 = 0x00;
pub(crate) const DST_ADDR_TYPE_SHORT: u8 = 0x08;
pub(crate) const DST_ADDR_TYPE_EXTENDED: u8 = 0x0c;
pub(crate) const FRAME_VERSION_OFFSET: usize = 2;
pub(crate) const FRAME_VERSION_MASK: u8 = 0x30;
pub(crate) const FRAME_VERSION_2015: u8 = 0x20;

/// Offset of the sequence number
pub const DSN_OFFSET: usize = 3;

pub(crate) const PAN_ID_SIZE: usize = 2;
pub(crate) const SHORT_ADDR_SIZE: usize = 2;
pub(crate) const EXT_ADDR_SIZE: usize = 8;

/// Frame type bits of `frame`
pub fn frame_type(frame: &[u8]) -> u8 {
    frame[FRAME_TYPE_OFFSET] & FRAME_TYPE_MASK
}

/// Check if `frame` is an acknowledgement
pub fn is_ack(frame: &[u8]) -> bool {
    frame_type(frame) == FRAME_TYPE_ACK
}

/// Check if `frame` has the AR bit set
pub fn ack_requested(frame: &[u8]) -> bool {
    frame[ACK_REQUEST_OFFSET] & ACK_REQUEST_BIT != 0
}

/// Check if `frame` holds its PHR and the whole PSDU except the FCS
///
/// The radio reads the number of bytes given by the PHR, so a shorter slice cannot be
/// transmitted.
pub fn is_transmittable(frame: &[u8]) -> bool {
    let Some(&phr) = frame.first() else {
        return false;
    };
    let psdu_length = usize::from(phr);

    frame.len() > DSN_OFFSET
        && (FCS_SIZE..=MAX_PACKET_SIZE).contains(&psdu_length)
        && PHR_SIZE + psdu_length - FCS_SIZE <= frame.len()
}

/// LQI stored by the radio in place of the first byte of the received frame's FCS
pub(crate) fn lqi_byte(frame: &[u8]) -> u8 {
    frame[frame[0] as usize - 1]
}
