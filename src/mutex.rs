//! Mutex ensuring that access to the driver state is mutually exclusive.
//!
//! This mutex requires proof that the driver's [`CriticalSection`](crate::crit_sect::CriticalSection)
//! is held, provided by [`held`](crate::crit_sect::CriticalSection::held).

use crate::crit_sect::Held;
use core::cell::{Ref, RefCell, RefMut};

/// Wraps a variable accessible from the API, the radio IRQ and the radio scheduler
pub struct Mutex<T>(RefCell<T>);

impl<T> Mutex<T> {
    /// Creates new wrapper for a variable guarded by the driver's critical section
    ///
    /// # Example
    ///
    /// ```
    /// use nrf_radio_802154::mutex::Mutex;
    ///
    /// static COUNTER: Mutex<u32> = Mutex::new(0);
    /// ```
    pub const fn new(value: T) -> Mutex<T> {
        Self(RefCell::new(value))
    }

    /// Borrows Mutex's internal variable with mutually exclusive access
    ///
    /// # Example
    ///
    /// ```
    /// use nrf_radio_802154::crit_sect::CriticalSection;
    /// use nrf_radio_802154::hw::NoIrqGate;
    /// use nrf_radio_802154::mutex::Mutex;
    ///
    /// let section = CriticalSection::new(&NoIrqGate);
    /// let value = Mutex::new(15u32);
    ///
    /// assert!(section.enter(false));
    /// assert_eq!(*value.borrow(&section.held()), 15);
    /// section.exit();
    /// ```
    pub fn borrow<'cs>(&'cs self, _held: &'cs Held) -> Ref<'cs, T> {
        self.0.borrow()
    }

    /// Mutably borrows Mutex's internal variable with mutually exclusive access
    ///
    /// # Example
    ///
    /// ```
    /// use nrf_radio_802154::crit_sect::CriticalSection;
    /// use nrf_radio_802154::hw::NoIrqGate;
    /// use nrf_radio_802154::mutex::Mutex;
    ///
    /// let section = CriticalSection::new(&NoIrqGate);
    /// let called = Mutex::new(false);
    ///
    /// assert!(section.enter(false));
    /// *called.borrow_mut(&section.held()) = true;
    /// section.exit();
    /// ```
    pub fn borrow_mut<'cs>(&'cs self, _held: &'cs Held) -> RefMut<'cs, T> {
        self.0.borrow_mut()
    }

    /// Accesses the internal variable through an exclusive reference, without the critical section
    pub fn get_mut(&mut self) -> &mut T {
        self.0.get_mut()
    }
}

// Safety: Mutex is Sync assumming contained type is Send and the CriticalSection module prevents
// concurrent access to Mutex from multiple contexts. This assumption is verified run-time by
// RefCell used inside the mutex
unsafe impl<T> Sync for Mutex<T> where T: Send {}
