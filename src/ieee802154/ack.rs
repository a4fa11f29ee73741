//! Generator of acknowledgements
//!
//! Immediate acknowledgements are sent automatically as responses to the received frames with the
//! AR field set. The ACK frame is prepared in a static template while the radio ramps up its
//! transmitter, so only the sequence number and the frame pending bit are written per frame.

use super::{DSN_OFFSET, FRAME_PENDING_BIT, FRAME_TYPE_ACK, FRAME_TYPE_OFFSET, IMM_ACK_LENGTH};

/// Size of the ACK frame: PHR and PSDU
pub const ACK_FRAME_SIZE: usize = IMM_ACK_LENGTH as usize + 1;

/// Imm-Ack frame buffer transmitted by the radio
pub(crate) struct AckFrame {
    data: [u8; ACK_FRAME_SIZE],
}

impl AckFrame {
    pub(crate) const fn new() -> Self {
        Self {
            data: [
                IMM_ACK_LENGTH, // PHR
                FRAME_TYPE_ACK | FRAME_PENDING_BIT,
                0x00,           // MHR
                0x00,           // Sequence Number
                0x00, 0x00,     // MFR
            ],
        }
    }

    /// Fill the template to acknowledge `received_frame`
    pub(crate) fn prepare_for(&mut self, received_frame: &[u8]) {
        self.data[DSN_OFFSET] = received_frame[DSN_OFFSET];
    }

    /// Set the frame pending bit
    pub(crate) fn set_pending(&mut self, pending: bool) {
        self.data[FRAME_TYPE_OFFSET] = if pending {
            FRAME_TYPE_ACK | FRAME_PENDING_BIT
        } else {
            FRAME_TYPE_ACK
        };
    }

    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    #[cfg(test)]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
