//! Port of the driver to nRF52840
//!
//! [`Nrf52840Hardware`] drives the `RADIO`, `PPI`, one `TIMER` and one `EGU` peripheral. The
//! trait implementations live next to the traits: [`radio::nrf52840`](super::radio::nrf52840),
//! [`ppi::legacy_ppi`](super::ppi::legacy_ppi) and
//! [`timer::timer_using_timer`](super::timer::timer_using_timer).

use super::settle::Settle;
use super::IrqGate;
use core::ops::Deref;
use cortex_m::peripheral::NVIC;
use nrf52840_hal::pac::{egu0, ppi, radio, timer0, Interrupt};

/// CPU clock frequency
const CPU_FREQ_MHZ: u32 = 64;

/// Pointer to a peripheral's register block
///
/// It allows the register block to be any memory, like the real peripheral or an array.
pub(crate) struct Periph<T> {
    ptr: *const T,
}

impl<T> Periph<T> {
    pub(crate) fn new(regs: &T) -> Self {
        Periph { ptr: regs }
    }
}

impl<T> Deref for Periph<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        // Safety: created from a reference to the register block, which is never deallocated
        unsafe { &*self.ptr }
    }
}

/// Peripherals of nRF52840 used by the radio driver
///
/// The driver takes exclusive ownership of the peripherals, the PPI channels from 6 to 9 and the
/// PPI channel group 0. The radio and the timer interrupts must call
/// [`Driver::irq_handler`](crate::radio::Driver::irq_handler).
///
/// # Examples
///
/// ```ignore
/// use nrf52840_hal::pac::{Interrupt, Peripherals};
/// use nrf_radio_802154::hw::nrf52840::Nrf52840Hardware;
///
/// let peripherals = Peripherals::take().unwrap();
///
/// let hardware = Nrf52840Hardware::new(
///     &peripherals.RADIO,
///     &peripherals.PPI,
///     &peripherals.TIMER1,
///     Interrupt::TIMER1,
///     &peripherals.EGU0,
/// );
/// ```
pub struct Nrf52840Hardware {
    pub(crate) radio: Periph<radio::RegisterBlock>,
    pub(crate) ppi: Periph<ppi::RegisterBlock>,
    pub(crate) timer: Periph<timer0::RegisterBlock>,
    pub(crate) timer_irq: Interrupt,
    pub(crate) egu: Periph<egu0::RegisterBlock>,
}

impl Nrf52840Hardware {
    /// Create the hardware from the peripherals' register blocks
    ///
    /// `timer_irq` is the interrupt of the `timer` instance.
    pub fn new(
        radio: &radio::RegisterBlock,
        ppi: &ppi::RegisterBlock,
        timer: &timer0::RegisterBlock,
        timer_irq: Interrupt,
        egu: &egu0::RegisterBlock,
    ) -> Self {
        Self {
            radio: Periph::new(radio),
            ppi: Periph::new(ppi),
            timer: Periph::new(timer),
            timer_irq,
            egu: Periph::new(egu),
        }
    }
}

impl Settle for Nrf52840Hardware {
    fn delay_us(&mut self, us: u32) {
        cortex_m::asm::delay(us * CPU_FREQ_MHZ);
    }
}

/// Masks the radio and the timer interrupts in the NVIC
pub struct NvicGate {
    timer_irq: Interrupt,
}

impl NvicGate {
    /// Create a gate for the driver using the timer with `timer_irq` interrupt
    pub const fn new(timer_irq: Interrupt) -> Self {
        Self { timer_irq }
    }
}

impl IrqGate for NvicGate {
    fn mask(&self) {
        NVIC::mask(Interrupt::RADIO);
        NVIC::mask(self.timer_irq);
    }

    fn unmask(&self) {
        // Safety: the interrupt handlers enter the driver's critical section
        unsafe {
            NVIC::unmask(Interrupt::RADIO);
            NVIC::unmask(self.timer_irq);
        }
    }
}
