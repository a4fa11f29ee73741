//! Portable radio peripheral abstraction
//!
//! The types in this module name the registers' content used by the driver. The values of
//! [`Shorts`] and [`Interrupts`] follow the bit layout of the nRF52 `RADIO` peripheral, so the
//! nRF port writes them to the registers directly.

pub mod traits;

#[cfg(feature = "nrf52840")]
pub mod nrf52840;

use core::ops::BitOr;

/// Hardware events handled by the driver
///
/// Most of them are events of the radio peripheral. [`AckTimeout`](HardwareEvent::AckTimeout)
/// is a timer compare event and [`TransactionError`](HardwareEvent::TransactionError) is a
/// transfer fault reported by ports capable of detecting it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareEvent {
    /// Radio ramped up
    Ready,
    /// Synchronization header sent or received
    Address,
    /// Packet sent or received
    End,
    /// Radio disabled
    Disabled,
    /// Bit counter reached its compare value
    Bcmatch,
    /// Frame received with correct CRC
    CrcOk,
    /// Frame received with incorrect CRC
    CrcError,
    /// Energy detection finished
    EdEnd,
    /// CCA detected an idle channel
    CcaIdle,
    /// CCA detected a busy channel
    CcaBusy,
    /// Transmitter ramped up
    TxReady,
    /// Received header matched the header-match unit's pattern
    MhrMatch,
    /// Last bit sent on air
    PhyEnd,
    /// ACK reception window expired
    AckTimeout,
    /// Hardware transfer fault
    TransactionError,
}

impl HardwareEvent {
    /// Order in which the interrupt handler services pending events
    pub const IRQ_ORDER: [HardwareEvent; 12] = [
        HardwareEvent::Address,
        HardwareEvent::Bcmatch,
        HardwareEvent::CrcError,
        HardwareEvent::CrcOk,
        HardwareEvent::PhyEnd,
        HardwareEvent::End,
        HardwareEvent::Disabled,
        HardwareEvent::CcaIdle,
        HardwareEvent::CcaBusy,
        HardwareEvent::EdEnd,
        HardwareEvent::AckTimeout,
        HardwareEvent::TransactionError,
    ];

    const fn bit(self) -> u32 {
        match self {
            HardwareEvent::Ready => 0,
            HardwareEvent::Address => 1,
            HardwareEvent::End => 3,
            HardwareEvent::Disabled => 4,
            HardwareEvent::Bcmatch => 10,
            HardwareEvent::CrcOk => 12,
            HardwareEvent::CrcError => 13,
            HardwareEvent::EdEnd => 15,
            HardwareEvent::CcaIdle => 17,
            HardwareEvent::CcaBusy => 18,
            HardwareEvent::TxReady => 21,
            HardwareEvent::MhrMatch => 23,
            HardwareEvent::PhyEnd => 27,
            // Not radio interrupts, ports map them to their own sources
            HardwareEvent::AckTimeout => 30,
            HardwareEvent::TransactionError => 31,
        }
    }
}

/// Set of interrupt sources
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interrupts(u32);

impl Interrupts {
    /// No interrupt source
    pub const NONE: Interrupts = Interrupts(0);

    /// Sources belonging to the `RADIO` peripheral
    pub const RADIO_MASK: u32 = 0x3fff_ffff;

    /// Set containing only `event`
    pub const fn of(event: HardwareEvent) -> Self {
        Self(1 << event.bit())
    }

    /// Union of two sets
    pub const fn with(self, event: HardwareEvent) -> Self {
        Self(self.0 | Self::of(event).0)
    }

    /// Check if `event` belongs to this set
    pub const fn contains(self, event: HardwareEvent) -> bool {
        self.0 & Self::of(event).0 != 0
    }

    /// Remove sources of `other` from this set
    pub const fn without(self, other: Interrupts) -> Self {
        Self(self.0 & !other.0)
    }

    /// Raw bits, in the layout of the `INTENSET` register for radio sources
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl From<HardwareEvent> for Interrupts {
    fn from(event: HardwareEvent) -> Self {
        Self::of(event)
    }
}

impl BitOr for Interrupts {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<HardwareEvent> for Interrupts {
    type Output = Self;
    fn bitor(self, rhs: HardwareEvent) -> Self {
        self.with(rhs)
    }
}

impl BitOr for HardwareEvent {
    type Output = Interrupts;
    fn bitor(self, rhs: Self) -> Interrupts {
        Interrupts::of(self).with(rhs)
    }
}

/// Shortcuts between radio events and tasks
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Shorts(u32);

impl Shorts {
    /// No shortcut
    pub const NONE: Shorts = Shorts(0);
    /// END event triggers DISABLE task
    pub const END_DISABLE: Shorts = Shorts(1 << 1);
    /// ADDRESS event triggers RSSISTART task
    pub const ADDRESS_RSSISTART: Shorts = Shorts(1 << 4);
    /// ADDRESS event triggers BCSTART task
    pub const ADDRESS_BCSTART: Shorts = Shorts(1 << 6);
    /// RXREADY event triggers CCASTART task
    pub const RXREADY_CCASTART: Shorts = Shorts(1 << 11);
    /// CCAIDLE event triggers TXEN task
    pub const CCAIDLE_TXEN: Shorts = Shorts(1 << 12);
    /// CCABUSY event triggers DISABLE task
    pub const CCABUSY_DISABLE: Shorts = Shorts(1 << 13);
    /// READY event triggers EDSTART task
    pub const READY_EDSTART: Shorts = Shorts(1 << 15);
    /// TXREADY event triggers START task
    pub const TXREADY_START: Shorts = Shorts(1 << 18);
    /// RXREADY event triggers START task
    pub const RXREADY_START: Shorts = Shorts(1 << 19);
    /// PHYEND event triggers DISABLE task
    pub const PHYEND_DISABLE: Shorts = Shorts(1 << 20);

    /// Union of two sets of shortcuts
    pub const fn union(self, other: Shorts) -> Self {
        Self(self.0 | other.0)
    }

    /// Raw bits, in the layout of the `SHORTS` register
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Shortcuts from raw bits of the `SHORTS` register
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

impl BitOr for Shorts {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Radio tasks triggered by the driver
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioTask {
    /// Ramp up the transmitter
    TxEn,
    /// Ramp up the receiver
    RxEn,
    /// Start the transfer
    Start,
    /// Stop the transfer
    Stop,
    /// Disable the radio
    Disable,
    /// Start energy detection
    EdStart,
    /// Stop energy detection
    EdStop,
    /// Start clear channel assessment
    CcaStart,
    /// Stop clear channel assessment
    CcaStop,
}

/// State of the radio peripheral
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioState {
    /// Disabled, no ongoing activity
    Disabled,
    /// Receiver ramping up
    RxRu,
    /// Receiver ready, waiting for START
    RxIdle,
    /// Receiving
    Rx,
    /// Receiver being disabled
    RxDisable,
    /// Transmitter ramping up
    TxRu,
    /// Transmitter ready, waiting for START
    TxIdle,
    /// Transmitting
    Tx,
    /// Transmitter being disabled
    TxDisable,
}

/// Mode of the clear channel assessment
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CcaMode {
    /// Energy above threshold
    Ed,
    /// Carrier seen
    Carrier,
    /// Energy above threshold and carrier seen
    CarrierAndEd,
    /// Energy above threshold or carrier seen
    CarrierOrEd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupts_union_and_removal() {
        let ints = HardwareEvent::CrcOk | HardwareEvent::CrcError | HardwareEvent::Bcmatch;
        assert!(ints.contains(HardwareEvent::CrcOk));
        assert!(!ints.contains(HardwareEvent::PhyEnd));

        let ints = ints.without(Interrupts::of(HardwareEvent::CrcOk));
        assert!(!ints.contains(HardwareEvent::CrcOk));
        assert!(ints.contains(HardwareEvent::CrcError));
    }

    #[test]
    fn test_radio_interrupts_follow_register_layout() {
        assert_eq!(Interrupts::of(HardwareEvent::PhyEnd).bits(), 1 << 27);
        assert_eq!(
            Interrupts::of(HardwareEvent::AckTimeout).bits() & Interrupts::RADIO_MASK,
            0
        );
    }

    #[test]
    fn test_shorts_union() {
        let shorts = Shorts::TXREADY_START | Shorts::PHYEND_DISABLE;
        assert_eq!(shorts.bits(), (1 << 18) | (1 << 20));
    }
}
