//! Protocol information base for IEEE 802.15.4
//!
//! Besides the addressing fields used by the frame filter, the PIB holds the radio parameters
//! applied by the driver: channel, transmit power, CCA configuration and the promiscuous and
//! auto-ACK switches.

use super::{EXT_ADDR_SIZE, PAN_ID_SIZE as PANID_SIZE, SHORT_ADDR_SIZE};
use crate::error::Error;
use crate::hw::radio::CcaMode;

/// Lowest channel of the 2.4 GHz O-QPSK PHY
pub const MIN_CHANNEL: u8 = 11;
/// Highest channel of the 2.4 GHz O-QPSK PHY
pub const MAX_CHANNEL: u8 = 26;

/// Calculate the frequency of given IEEE 802.15.4 channel
///
/// # Examples
///
/// ```
/// use nrf_radio_802154::ieee802154::pib::channel_frequency_mhz;
///
/// assert_eq!(channel_frequency_mhz(11), Ok(2405));
/// assert_eq!(channel_frequency_mhz(26), Ok(2480));
/// assert!(channel_frequency_mhz(10).is_err());
/// ```
pub fn channel_frequency_mhz(channel: u8) -> Result<u16, Error> {
    if !(MIN_CHANNEL..=MAX_CHANNEL).contains(&channel) {
        return Err(Error::InvalidChannel);
    }

    Ok(2405 + 5 * (channel - MIN_CHANNEL) as u16)
}

/// Configuration of the clear channel assessment
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CcaConfig {
    /// Condition reporting a busy channel
    pub mode: CcaMode,
    /// Energy level above which the channel is busy, in the radio's ED units
    pub ed_threshold: u8,
    /// Correlator threshold detecting a carrier
    pub corr_threshold: u8,
    /// Number of correlator peaks needed to detect a carrier
    pub corr_limit: u8,
}

impl CcaConfig {
    /// Default CCA configuration: energy above threshold
    pub const fn new() -> Self {
        Self {
            mode: CcaMode::Ed,
            ed_threshold: 0x2d,
            corr_threshold: 0x2d,
            corr_limit: 0x02,
        }
    }
}

impl Default for CcaConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Protocol Information Base storage for IEEE 802.15.4
pub struct Pib {
    panid: [u8; PANID_SIZE],
    short_addr: [u8; SHORT_ADDR_SIZE],
    ext_addr: [u8; EXT_ADDR_SIZE],
    channel: u8,
    tx_power: i8,
    promiscuous: bool,
    auto_ack: bool,
    cca: CcaConfig,
}

impl Pib {
    /// Create empty PIB instance
    ///
    /// Empty PIB instance has addressing fields set to invalid (broadcast) values. The extended
    /// address is set to zero. The radio operates on channel 11 with 0 dBm transmit power,
    /// filters received frames and acknowledges them automatically.
    ///
    /// # Examples
    ///
    /// ```
    /// use nrf_radio_802154::ieee802154::pib::Pib;
    ///
    /// let pib = Pib::new();
    /// ```
    pub const fn new() -> Self {
        Self {
            panid: [0xff, 0xff],
            short_addr: [0xff, 0xff],
            ext_addr: [0x0; EXT_ADDR_SIZE],
            channel: MIN_CHANNEL,
            tx_power: 0,
            promiscuous: false,
            auto_ack: true,
            cca: CcaConfig::new(),
        }
    }

    /// Get Pan ID of this device
    ///
    /// The Pan ID value is little-endian.
    /// If Pan ID is not set, it contains broadcast value `[0xff, 0xff]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use nrf_radio_802154::ieee802154::pib::Pib;
    ///
    /// let pib = Pib::new();
    /// let pan_id = pib.get_pan_id();
    /// assert_eq!(pan_id, &[0xff, 0xff]);
    /// ```
    pub fn get_pan_id(&self) -> &[u8; PANID_SIZE] {
        &self.panid
    }

    /// Set Pan ID of this device
    ///
    /// The Pan ID value is little-endian.
    ///
    /// # Examples
    ///
    /// ```
    /// use nrf_radio_802154::ieee802154::pib::Pib;
    ///
    /// let mut pib = Pib::new();
    ///
    /// pib.set_pan_id(&[0x34, 0x12]);
    /// let pan_id = pib.get_pan_id();
    /// assert_eq!(pan_id, &[0x34, 0x12]);
    /// ```
    pub fn set_pan_id(&mut self, pan_id: &[u8; PANID_SIZE]) {
        self.panid = *pan_id;
    }

    /// Get short address of this device
    ///
    /// The address value is little-endian.
    /// If short address is not set, it contains broadcast value `[0xff, 0xff]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use nrf_radio_802154::ieee802154::pib::Pib;
    ///
    /// let pib = Pib::new();
    /// let short_addr = pib.get_short_addr();
    /// assert_eq!(short_addr, &[0xff, 0xff]);
    /// ```
    pub fn get_short_addr(&self) -> &[u8; SHORT_ADDR_SIZE] {
        &self.short_addr
    }

    /// Set short address of this device
    ///
    /// The address value is little-endian.
    ///
    /// # Examples
    ///
    /// ```
    /// use nrf_radio_802154::ieee802154::pib::Pib;
    ///
    /// let mut pib = Pib::new();
    ///
    /// pib.set_short_addr(&[0xcd, 0xab]);
    /// let short_addr = pib.get_short_addr();
    /// assert_eq!(short_addr, &[0xcd, 0xab]);
    /// ```
    pub fn set_short_addr(&mut self, short_addr: &[u8; SHORT_ADDR_SIZE]) {
        self.short_addr = *short_addr;
    }

    /// Get extended address of this device
    ///
    /// The address value is little-endian.
    ///
    /// # Examples
    ///
    /// ```
    /// use nrf_radio_802154::ieee802154::pib::Pib;
    ///
    /// let pib = Pib::new();
    /// let ext_addr = pib.get_ext_addr();
    /// println!("Extended address: {:?}", ext_addr);
    /// ```
    pub fn get_ext_addr(&self) -> &[u8; EXT_ADDR_SIZE] {
        &self.ext_addr
    }

    /// Set extended address of this device
    ///
    /// The address value is little-endian.
    ///
    /// Extended address should be set to a correct value before the device starts operating. If
    /// user of this module fials to set the extended address value, it contains some default value
    /// which is most probably invalid for the device.
    ///
    /// # Examples
    ///
    /// ```
    /// use nrf_radio_802154::ieee802154::pib::Pib;
    ///
    /// let mut pib = Pib::new();
    ///
    /// pib.set_ext_addr(&[0xef, 0xcd, 0xab, 0x89, 0x67, 0x45, 0x23, 0x01]);
    /// let ext_addr = pib.get_ext_addr();
    /// assert_eq!(ext_addr, &[0xef, 0xcd, 0xab, 0x89, 0x67, 0x45, 0x23, 0x01]);
    /// ```
    pub fn set_ext_addr(&mut self, ext_addr: &[u8; EXT_ADDR_SIZE]) {
        self.ext_addr = *ext_addr;
    }

    /// Get the radio channel
    pub fn get_channel(&self) -> u8 {
        self.channel
    }

    /// Set the radio channel
    ///
    /// The new channel is used by the radio after
    /// [`Driver::channel_update`](crate::radio::Driver::channel_update) is called.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidChannel`] if `channel` is outside of the 11-26 range. The stored channel is
    /// not modified then.
    ///
    /// # Examples
    ///
    /// ```
    /// use nrf_radio_802154::error::Error;
    /// use nrf_radio_802154::ieee802154::pib::Pib;
    ///
    /// let mut pib = Pib::new();
    ///
    /// assert_eq!(pib.set_channel(20), Ok(()));
    /// assert_eq!(pib.set_channel(27), Err(Error::InvalidChannel));
    /// assert_eq!(pib.get_channel(), 20);
    /// ```
    pub fn set_channel(&mut self, channel: u8) -> Result<(), Error> {
        channel_frequency_mhz(channel)?;
        self.channel = channel;
        Ok(())
    }

    /// Frequency offset of the current channel from 2400 MHz
    pub(crate) fn frequency_offset(&self) -> u8 {
        5 + 5 * (self.channel - MIN_CHANNEL)
    }

    /// Get the transmit power in dBm
    pub fn get_tx_power(&self) -> i8 {
        self.tx_power
    }

    /// Set the transmit power in dBm
    ///
    /// The power is applied with the next transmission.
    pub fn set_tx_power(&mut self, dbm: i8) {
        self.tx_power = dbm;
    }

    /// Check if the frame filter is bypassed
    pub fn get_promiscuous(&self) -> bool {
        self.promiscuous
    }

    /// Bypass the destination address filter
    ///
    /// In the promiscuous mode all the frames with valid length are reported, including frames
    /// addressed to other devices. Such frames are never acknowledged.
    pub fn set_promiscuous(&mut self, promiscuous: bool) {
        self.promiscuous = promiscuous;
    }

    /// Check if received frames are acknowledged automatically
    pub fn get_auto_ack(&self) -> bool {
        self.auto_ack
    }

    /// Enable or disable automatic transmission of ACK frames
    pub fn set_auto_ack(&mut self, auto_ack: bool) {
        self.auto_ack = auto_ack;
    }

    /// Get the CCA configuration
    pub fn get_cca(&self) -> &CcaConfig {
        &self.cca
    }

    /// Set the CCA configuration
    ///
    /// The new configuration is used by the radio after
    /// [`Driver::cca_config_update`](crate::radio::Driver::cca_config_update) is called.
    ///
    /// # Examples
    ///
    /// ```
    /// use nrf_radio_802154::hw::radio::CcaMode;
    /// use nrf_radio_802154::ieee802154::pib::{CcaConfig, Pib};
    ///
    /// let mut pib = Pib::new();
    ///
    /// pib.set_cca(&CcaConfig { mode: CcaMode::Carrier, ..CcaConfig::new() });
    /// assert_eq!(pib.get_cca().mode, CcaMode::Carrier);
    /// ```
    pub fn set_cca(&mut self, cca: &CcaConfig) {
        self.cca = *cca;
    }
}

impl Default for Pib {
    fn default() -> Self {
        Self::new()
    }
}
