//! Hooks customizing the driver for a board and a MAC layer
//!
//! [`SignalCorrection`] compensates the front end of the board in the values reported by the
//! radio. [`PendingBitLookup`] decides if an ACK frame informs its receiver about pending data.

#[cfg(test)]
use mockall::*;

/// Scale applied to the LQI reported by the radio to cover the 0-255 range
pub const LQI_VALUE_FACTOR: u8 = 4;
/// Scale applied to the energy level reported by the radio to cover the 0-255 range
pub const ED_RESULT_FACTOR: u8 = 4;

/// Correction of the signal levels measured by the radio
///
/// The default implementation of every method returns its argument.
#[cfg_attr(test, automock)]
pub trait SignalCorrection {
    /// Corrected RSSI sample, in -dBm
    fn rssi(&self, sample: u8) -> u8 {
        sample
    }

    /// Corrected raw LQI value
    fn lqi(&self, lqi: u8) -> u8 {
        lqi
    }

    /// Corrected raw energy level
    fn ed(&self, level: u8) -> u8 {
        level
    }

    /// ED threshold written to the radio for the CCA
    fn cca_ed_threshold(&self, threshold: u8) -> u8 {
        threshold
    }
}

/// Board without any correction
pub struct NoCorrection;

impl SignalCorrection for NoCorrection {}

/// Lookup of the data pending for the sender of a frame
#[cfg_attr(test, automock)]
pub trait PendingBitLookup {
    /// Check if the ACK to `frame` should have the frame pending bit set
    ///
    /// `frame` starts with the PHR and contains at least its MHR.
    fn pending_bit_should_be_set(&self, frame: &[u8]) -> bool;
}

/// Lookup reporting pending data for all devices
pub struct AlwaysPending;

impl PendingBitLookup for AlwaysPending {
    fn pending_bit_should_be_set(&self, _frame: &[u8]) -> bool {
        true
    }
}

/// RSSI in dBm from a raw sample
pub(crate) fn rssi_dbm<C: SignalCorrection + ?Sized>(correction: &C, sample: u8) -> i8 {
    -(correction.rssi(sample) as i16) as i8
}

/// LQI in the 0-255 range from the raw value stored by the radio
pub(crate) fn lqi_scaled<C: SignalCorrection + ?Sized>(correction: &C, lqi: u8) -> u8 {
    correction.lqi(lqi).saturating_mul(LQI_VALUE_FACTOR)
}

/// Energy level in the 0-255 range from the raw value measured by the radio
pub(crate) fn ed_scaled<C: SignalCorrection + ?Sized>(correction: &C, level: u8) -> u8 {
    correction.ed(level).saturating_mul(ED_RESULT_FACTOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lqi_is_scaled_and_saturated() {
        assert_eq!(lqi_scaled(&NoCorrection, 0x20), 0x80);
        assert_eq!(lqi_scaled(&NoCorrection, 0x40), 0xff);
    }

    #[test]
    fn test_ed_uses_correction() {
        let mut correction = MockSignalCorrection::new();
        correction.expect_ed().returning(|level| level + 1);
        assert_eq!(ed_scaled(&correction, 9), 40);
    }

    #[test]
    fn test_rssi_is_negated_sample() {
        assert_eq!(rssi_dbm(&NoCorrection, 60), -60);
        assert_eq!(rssi_dbm(&NoCorrection, 128), -128);
    }

    #[test]
    fn test_always_pending() {
        assert!(AlwaysPending.pending_bit_should_be_set(&[5, 0x02, 0x00, 0x01]));
    }
}
