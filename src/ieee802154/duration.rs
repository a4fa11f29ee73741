//! Airtime of IEEE 802.15.4 transfers on the 2.4 GHz O-QPSK PHY
//!
//! Used to size the timeslots requested from the radio scheduler.

use super::IMM_ACK_LENGTH;

const US_PER_SYMBOL: u32 = 16;
const SYMBOLS_PER_OCTET: u32 = 2;
const SHR_SYMBOLS: u32 = 10;
const PHR_OCTETS: u32 = 1;

/// RX-to-TX or TX-to-RX turnaround time (aTurnaroundTime)
pub const TURNAROUND_TIME_US: u32 = 12 * US_PER_SYMBOL;
/// Duration of the clear channel assessment
pub const CCA_TIME_US: u32 = 8 * US_PER_SYMBOL;
/// Time needed by the radio to enable its receiver or transmitter
pub const RAMP_UP_TIME_US: u32 = 40;

/// Airtime of a frame with `psdu_length` bytes long PSDU, including the SHR and the PHR
///
/// # Examples
///
/// ```
/// use nrf_radio_802154::ieee802154::duration::frame_airtime_us;
///
/// assert_eq!(frame_airtime_us(5), 352);
/// assert_eq!(frame_airtime_us(127), 4256);
/// ```
pub const fn frame_airtime_us(psdu_length: u8) -> u32 {
    (SHR_SYMBOLS + (PHR_OCTETS + psdu_length as u32) * SYMBOLS_PER_OCTET) * US_PER_SYMBOL
}

/// Time the radio is busy transmitting a frame
///
/// Covers the optional CCA performed before the transmission and the optional wait for the ACK
/// frame for up to `ack_timeout_us` after the transmission ends.
pub fn tx_duration_us(psdu_length: u8, cca: bool, ack_timeout_us: Option<u32>) -> u32 {
    let mut duration = RAMP_UP_TIME_US + frame_airtime_us(psdu_length);

    if cca {
        duration += RAMP_UP_TIME_US + CCA_TIME_US;
    }
    if let Some(timeout) = ack_timeout_us {
        duration += timeout;
    }

    duration
}

/// Time the radio is busy with a standalone clear channel assessment
pub const fn cca_duration_us() -> u32 {
    RAMP_UP_TIME_US + CCA_TIME_US
}

/// Time the radio is busy receiving a frame, and acknowledging it if requested
pub fn rx_duration_us(psdu_length: u8, ack_requested: bool) -> u32 {
    let mut duration = frame_airtime_us(psdu_length);

    if ack_requested {
        duration += TURNAROUND_TIME_US + frame_airtime_us(IMM_ACK_LENGTH);
    }

    duration
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_duration_without_cca_and_ack() {
        assert_eq!(tx_duration_us(10, false, None), 40 + 512);
    }

    #[test]
    fn test_tx_duration_with_cca_and_ack() {
        assert_eq!(tx_duration_us(10, true, Some(864)), 40 + 512 + 40 + 128 + 864);
    }

    #[test]
    fn test_rx_duration_includes_ack() {
        assert_eq!(rx_duration_us(10, false), 512);
        assert_eq!(rx_duration_us(10, true), 512 + 192 + 352);
    }
}
