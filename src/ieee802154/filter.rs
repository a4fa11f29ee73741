//! Filtering received frames
//!
//! The filter runs while a frame is still being received. The radio interrupts the CPU each time
//! the bit counter reaches the number of bytes the filter asked for: first the PHR and the frame
//! control field, then the end of the destination address. Frames addressed to other devices are
//! dropped before their reception ends.

use super::pib::Pib;
use super::{
    frame_type, DSN_SUPPRESS_BIT, DSN_SUPPRESS_OFFSET, DST_ADDR_TYPE_EXTENDED, DST_ADDR_TYPE_MASK,
    DST_ADDR_TYPE_NONE, DST_ADDR_TYPE_OFFSET, DST_ADDR_TYPE_SHORT, EXT_ADDR_SIZE, FCF_SIZE,
    FRAME_TYPE_ACK, FRAME_TYPE_BEACON, FRAME_TYPE_COMMAND, FRAME_TYPE_DATA, FRAME_VERSION_2015,
    FRAME_VERSION_MASK, FRAME_VERSION_OFFSET, IMM_ACK_LENGTH, MAX_PACKET_SIZE, PAN_ID_SIZE,
    PHR_SIZE, SHORT_ADDR_SIZE,
};
use crate::error::RxError;

const BROADCAST_PAN_ID: [u8; 2] = [0xff, 0xff];
const BROADCAST_SHORT_ADDR: [u8; 2] = [0xff, 0xff];

/// Number of bytes needed by the first filtering step
pub const FILTER_INITIAL_BYTES: usize = PHR_SIZE + FCF_SIZE;

/// Location of the destination address fields in a frame
struct DstFields {
    pan_id_offset: usize,
    addr_offset: usize,
    addr_size: usize,
}

impl DstFields {
    fn end(&self) -> usize {
        self.addr_offset + self.addr_size
    }
}

/// Basic IEEE 802.15.4 frames filter
pub struct Filter<'f> {
    pib: &'f Pib,
}

impl<'f> Filter<'f> {
    /// Create a new filter
    ///
    /// A filter requires a reference to [`Pib`](super::pib::Pib) to get properties of this network
    /// node.
    pub fn new(pib: &'f Pib) -> Self {
        Self { pib }
    }

    /// Filter the first `num_bytes` bytes of `frame`
    ///
    /// `frame` starts with the PHR. Filtering starts with `num_bytes` equal to
    /// [`FILTER_INITIAL_BYTES`].
    ///
    /// If the part passes the filter and more bytes are needed, `num_bytes` is increased to the
    /// required number of bytes and the method is expected to be called again when they are
    /// received. If the whole frame passed the filter, `num_bytes` is left unchanged.
    ///
    /// # Errors
    ///
    /// * [`RxError::InvalidLength`] if the PHR is not a valid frame length
    /// * [`RxError::InvalidFrame`] if the frame control field is malformed or not supported
    /// * [`RxError::InvalidDestAddr`] if the frame is addressed to another device
    ///
    /// # Examples
    ///
    /// ```
    /// use nrf_radio_802154::ieee802154::filter::{Filter, FILTER_INITIAL_BYTES};
    /// use nrf_radio_802154::ieee802154::pib::Pib;
    ///
    /// let mut pib = Pib::new();
    /// pib.set_pan_id(&[0x34, 0x12]);
    /// pib.set_short_addr(&[0xcd, 0xab]);
    ///
    /// let frame = [16u8, 0x61, 0x88, 0x01, 0x34, 0x12, 0xcd, 0xab];
    /// let filter = Filter::new(&pib);
    ///
    /// let mut num_bytes = FILTER_INITIAL_BYTES;
    /// assert_eq!(filter.filter_frame_part(&frame, &mut num_bytes), Ok(()));
    /// assert_eq!(num_bytes, 8);
    /// assert_eq!(filter.filter_frame_part(&frame, &mut num_bytes), Ok(()));
    /// assert_eq!(num_bytes, 8);
    /// ```
    pub fn filter_frame_part(&self, frame: &[u8], num_bytes: &mut usize) -> Result<(), RxError> {
        if *num_bytes == FILTER_INITIAL_BYTES {
            self.filter_fcf(frame, num_bytes)
        } else {
            let dst = dst_fields(frame)?.ok_or(RxError::InvalidFrame)?;
            self.filter_dst_pan_id(frame, &dst)?;
            self.filter_dst_addr(frame, &dst)
        }
    }

    fn filter_fcf(&self, frame: &[u8], num_bytes: &mut usize) -> Result<(), RxError> {
        let length = frame[0];
        if length < IMM_ACK_LENGTH || length as usize > MAX_PACKET_SIZE {
            return Err(RxError::InvalidLength);
        }

        match dst_fields(frame)? {
            Some(dst) => {
                if dst.end() > length as usize + PHR_SIZE {
                    return Err(RxError::InvalidLength);
                }
                *num_bytes = dst.end();
                Ok(())
            }
            None => match frame_type(frame) {
                FRAME_TYPE_ACK | FRAME_TYPE_BEACON => Ok(()),
                // Only a PAN coordinator accepts frames without destination
                _ => Err(RxError::InvalidDestAddr),
            },
        }
    }

    fn filter_dst_pan_id(&self, frame: &[u8], dst: &DstFields) -> Result<(), RxError> {
        let dst_pan_id = &frame[dst.pan_id_offset..dst.pan_id_offset + PAN_ID_SIZE];

        if dst_pan_id != self.pib.get_pan_id() && dst_pan_id != BROADCAST_PAN_ID {
            Err(RxError::InvalidDestAddr)
        } else {
            Ok(())
        }
    }

    fn filter_dst_addr(&self, frame: &[u8], dst: &DstFields) -> Result<(), RxError> {
        let dst_addr = &frame[dst.addr_offset..dst.end()];

        let matching = match dst.addr_size {
            SHORT_ADDR_SIZE => {
                dst_addr == self.pib.get_short_addr() || dst_addr == BROADCAST_SHORT_ADDR
            }
            _ => dst_addr == self.pib.get_ext_addr(),
        };

        if matching {
            Ok(())
        } else {
            Err(RxError::InvalidDestAddr)
        }
    }
}

fn dst_fields(frame: &[u8]) -> Result<Option<DstFields>, RxError> {
    let version = frame[FRAME_VERSION_OFFSET] & FRAME_VERSION_MASK;
    if version > FRAME_VERSION_2015 {
        return Err(RxError::InvalidFrame);
    }

    match frame_type(frame) {
        FRAME_TYPE_BEACON | FRAME_TYPE_DATA | FRAME_TYPE_ACK | FRAME_TYPE_COMMAND => {}
        _ => return Err(RxError::InvalidFrame),
    }

    let addr_size = match frame[DST_ADDR_TYPE_OFFSET] & DST_ADDR_TYPE_MASK {
        DST_ADDR_TYPE_NONE => return Ok(None),
        DST_ADDR_TYPE_SHORT => SHORT_ADDR_SIZE,
        DST_ADDR_TYPE_EXTENDED => EXT_ADDR_SIZE,
        _ => return Err(RxError::InvalidFrame),
    };

    let dsn_suppressed =
        version == FRAME_VERSION_2015 && frame[DSN_SUPPRESS_OFFSET] & DSN_SUPPRESS_BIT != 0;
    let pan_id_offset = PHR_SIZE + FCF_SIZE + if dsn_suppressed { 0 } else { 1 };

    Ok(Some(DstFields {
        pan_id_offset,
        addr_offset: pan_id_offset + PAN_ID_SIZE,
        addr_size,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCAL_PAN_ID: [u8; 2] = [0x23, 0x01];
    const LOCAL_SHORT_ADDR: [u8; 2] = [0xcd, 0xab];
    const LOCAL_EXT_ADDR: [u8; 8] = [0xef, 0xcd, 0xab, 0x89, 0x67, 0x45, 0x23, 0x01];

    fn local_pib() -> Pib {
        let mut pib = Pib::new();
        pib.set_pan_id(&LOCAL_PAN_ID);
        pib.set_short_addr(&LOCAL_SHORT_ADDR);
        pib.set_ext_addr(&LOCAL_EXT_ADDR);
        pib
    }

    fn filter_whole(pib: &Pib, frame: &[u8]) -> Result<(), RxError> {
        let filter = Filter::new(pib);
        let mut num_bytes = FILTER_INITIAL_BYTES;
        loop {
            let requested = num_bytes;
            filter.filter_frame_part(frame, &mut num_bytes)?;
            if num_bytes == requested {
                return Ok(());
            }
        }
    }

    #[test]
    fn test_filter_frame_with_matching_short_addr() {
        let pib = local_pib();
        let frame = [
            16u8, // PHR
            0x61, 0x88, // FCF
            0xfe, // SeqNum
            0x23, 0x01, // Dst Pan Id
            0xcd, 0xab, // Dst Addr
            0xef, 0xcd, // Src Addr
            0x01, 0x02, 0x03, 0x04, 0x05, // Payload
            0x00, 0x00, // MFR
        ];

        let filter = Filter::new(&pib);
        let mut num_bytes = FILTER_INITIAL_BYTES;
        assert_eq!(filter.filter_frame_part(&frame, &mut num_bytes), Ok(()));
        assert_eq!(num_bytes, 8);
        assert_eq!(filter.filter_frame_part(&frame, &mut num_bytes), Ok(()));
        assert_eq!(num_bytes, 8);
    }

    #[test]
    fn test_filter_frame_with_unmatching_pan_id() {
        let pib = local_pib();
        let frame = [16u8, 0x61, 0x88, 0xfe, 0x23, 0x00, 0xcd, 0xab];
        assert_eq!(filter_whole(&pib, &frame), Err(RxError::InvalidDestAddr));
    }

    #[test]
    fn test_filter_frame_with_broadcast_pan_id_and_short_addr() {
        let pib = local_pib();
        let frame = [16u8, 0x41, 0x88, 0xfe, 0xff, 0xff, 0xff, 0xff];
        assert_eq!(filter_whole(&pib, &frame), Ok(()));
    }

    #[test]
    fn test_filter_frame_with_unmatching_short_addr() {
        let pib = local_pib();
        let frame = [16u8, 0x61, 0x88, 0xfe, 0x23, 0x01, 0xcd, 0xac];
        assert_eq!(filter_whole(&pib, &frame), Err(RxError::InvalidDestAddr));
    }

    #[test]
    fn test_filter_frame_with_matching_ext_addr() {
        let pib = local_pib();
        let mut frame = [0u8; 14];
        frame[..6].copy_from_slice(&[30, 0x61, 0xcc, 0x10, 0x23, 0x01]);
        frame[6..].copy_from_slice(&LOCAL_EXT_ADDR);
        assert_eq!(filter_whole(&pib, &frame), Ok(()));
    }

    #[test]
    fn test_filter_frame_with_unmatching_ext_addr() {
        let pib = local_pib();
        let mut frame = [0u8; 14];
        frame[..6].copy_from_slice(&[30, 0x61, 0xcc, 0x10, 0x23, 0x01]);
        frame[6..].copy_from_slice(&[0xff; 8]);
        assert_eq!(filter_whole(&pib, &frame), Err(RxError::InvalidDestAddr));
    }

    #[test]
    fn test_filter_2015_frame_without_sequence_number() {
        let pib = local_pib();
        let frame = [16u8, 0x41, 0xa9, 0x23, 0x01, 0xcd, 0xab];

        let filter = Filter::new(&pib);
        let mut num_bytes = FILTER_INITIAL_BYTES;
        assert_eq!(filter.filter_frame_part(&frame, &mut num_bytes), Ok(()));
        assert_eq!(num_bytes, 7);
        assert_eq!(filter.filter_frame_part(&frame, &mut num_bytes), Ok(()));
    }

    #[test]
    fn test_ack_without_destination_passes() {
        let pib = local_pib();
        let frame = [5u8, 0x02, 0x00, 0x12, 0x00, 0x00];

        let filter = Filter::new(&pib);
        let mut num_bytes = FILTER_INITIAL_BYTES;
        assert_eq!(filter.filter_frame_part(&frame, &mut num_bytes), Ok(()));
        assert_eq!(num_bytes, FILTER_INITIAL_BYTES);
    }

    #[test]
    fn test_data_frame_without_destination_is_rejected() {
        let pib = local_pib();
        let frame = [10u8, 0x41, 0x80, 0x01];
        assert_eq!(filter_whole(&pib, &frame), Err(RxError::InvalidDestAddr));
    }

    #[test]
    fn test_too_short_frame_is_rejected() {
        let pib = local_pib();
        let frame = [4u8, 0x02, 0x00];
        assert_eq!(filter_whole(&pib, &frame), Err(RxError::InvalidLength));
    }

    #[test]
    fn test_too_long_frame_is_rejected() {
        let pib = local_pib();
        let frame = [128u8, 0x41, 0x88];
        assert_eq!(filter_whole(&pib, &frame), Err(RxError::InvalidLength));
    }

    #[test]
    fn test_frame_shorter_than_its_addressing_is_rejected() {
        let pib = local_pib();
        let frame = [6u8, 0x61, 0xcc, 0x10];
        assert_eq!(filter_whole(&pib, &frame), Err(RxError::InvalidLength));
    }

    #[test]
    fn test_reserved_frame_version_is_rejected() {
        let pib = local_pib();
        let frame = [16u8, 0x61, 0xb8];
        assert_eq!(filter_whole(&pib, &frame), Err(RxError::InvalidFrame));
    }

    #[test]
    fn test_reserved_dst_addressing_mode_is_rejected() {
        let pib = local_pib();
        let frame = [16u8, 0x61, 0x84];
        assert_eq!(filter_whole(&pib, &frame), Err(RxError::InvalidFrame));
    }

    #[test]
    fn test_reserved_frame_type_is_rejected() {
        let pib = local_pib();
        let frame = [16u8, 0x65, 0x88];
        assert_eq!(filter_whole(&pib, &frame), Err(RxError::InvalidFrame));
    }
}
