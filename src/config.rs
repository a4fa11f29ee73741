//! Timing and retry policy of the driver
//!
//! Protocol attributes of the device (addresses, channel, CCA) live in the
//! [`Pib`](crate::ieee802154::pib::Pib). This module holds the parameters of the driver itself.

/// Driver policy parameters
///
/// # Examples
///
/// ```
/// use nrf_radio_802154::config::Config;
///
/// let config = Config::new()
///     .with_max_transaction_errors(3)
///     .with_ack_timeout_us(1000);
/// assert_eq!(config.max_transaction_errors, 3);
/// assert_eq!(config.ack_timeout_us, 1000);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Number of hardware transaction errors within one attempt that fails the operation
    ///
    /// Errors below this number are recovered by re-arming the same hardware action.
    pub max_transaction_errors: u8,
    /// Time from the end of a transmitted frame to the end of the ACK reception window
    pub ack_timeout_us: u32,
    /// Minimal time left in the granted timeslot to start a critical section from the API
    pub min_crit_sect_time_us: u32,
    /// Duration of a single energy detection hardware window
    pub ed_iter_duration_us: u32,
    /// Number of ED windows reserved in the timeslot for the ramp up and the interrupt latency
    pub ed_iters_overhead: u32,
    /// Maximal time to wait for the signal routing fabric to propagate an event
    pub ppi_settle_timeout_us: u32,
    /// Report frames with incorrect CRC as [`RxError::InvalidFcs`](crate::error::RxError)
    pub notify_crc_error: bool,
}

impl Config {
    /// Create configuration with default values
    pub const fn new() -> Self {
        Self {
            max_transaction_errors: 2,
            // macAckWaitDuration for the 2.4 GHz O-QPSK PHY: 54 symbols
            ack_timeout_us: 864,
            min_crit_sect_time_us: 60,
            ed_iter_duration_us: 128,
            ed_iters_overhead: 2,
            ppi_settle_timeout_us: 1,
            notify_crc_error: false,
        }
    }

    /// Set [`max_transaction_errors`](Config::max_transaction_errors)
    ///
    /// # Panics
    ///
    /// Panics if `errors` is 0.
    pub const fn with_max_transaction_errors(mut self, errors: u8) -> Self {
        assert!(errors > 0);
        self.max_transaction_errors = errors;
        self
    }

    /// Set [`ack_timeout_us`](Config::ack_timeout_us)
    pub const fn with_ack_timeout_us(mut self, timeout_us: u32) -> Self {
        self.ack_timeout_us = timeout_us;
        self
    }

    /// Set [`min_crit_sect_time_us`](Config::min_crit_sect_time_us)
    pub const fn with_min_crit_sect_time_us(mut self, time_us: u32) -> Self {
        self.min_crit_sect_time_us = time_us;
        self
    }

    /// Set [`ed_iter_duration_us`](Config::ed_iter_duration_us)
    ///
    /// # Panics
    ///
    /// Panics if `duration_us` is 0.
    pub const fn with_ed_iter_duration_us(mut self, duration_us: u32) -> Self {
        assert!(duration_us > 0);
        self.ed_iter_duration_us = duration_us;
        self
    }

    /// Set [`notify_crc_error`](Config::notify_crc_error)
    pub const fn with_notify_crc_error(mut self, notify: bool) -> Self {
        self.notify_crc_error = notify;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_threshold() {
        assert_eq!(Config::default().max_transaction_errors, 2);
    }

    #[test]
    #[should_panic]
    fn test_zero_retry_threshold_is_rejected() {
        let _ = Config::new().with_max_transaction_errors(0);
    }

    #[test]
    #[should_panic]
    fn test_zero_ed_window_is_rejected() {
        let _ = Config::new().with_ed_iter_duration_us(0);
    }
}
