//! Reentrant critical section of the radio driver
//!
//! All the driver state is mutated only while this critical section is held. It is entered by
//! API calls, by the radio interrupt handler and by the radio scheduler notifications. Unlike a
//! global interrupt lock it is held for the whole duration of a driver procedure, and it is not
//! blocking: an ordinary caller which cannot enter gets `false` and is expected to retry later.
//!
//! Two escape hatches exist:
//!
//! * [`forceful_enter`](CriticalSection::forceful_enter) used by the radio interrupt handler,
//! * the nesting window ([`nesting_allow`](CriticalSection::nesting_allow) /
//!   [`nesting_deny`](CriticalSection::nesting_deny)) opened while notifications are dispatched,
//!   so that a notification callback can request the next operation.
//!
//! Scheduler notifications are never processed by the notifying context directly if another
//! context holds the section. They are posted to a single-slot queue with
//! [`post_priority`](CriticalSection::post_priority) and picked up by whoever exits the section
//! last (see [`Exit::Pending`]).

use crate::hw::IrqGate;
use crate::scheduler::PriorityLevel;
use core::cell::Cell;
use core::marker::PhantomData;

/// Runs `f` with all interrupts masked
///
/// Used for short atomic updates only. The closure must not call back into the driver.
pub fn locked<F, R>(f: F) -> R
where
    F: FnOnce(critical_section::CriticalSection) -> R,
{
    critical_section::with(f)
}

/// Result of [`CriticalSection::exit`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Exit {
    /// The critical section is not held anymore
    Released,
    /// The critical section is still held by an outer entry
    Nested,
    /// A scheduler notification arrived while the section was held
    ///
    /// The section is held again with depth 1. The caller must process the notification and call
    /// [`exit`](CriticalSection::exit) once more.
    Pending(PriorityLevel),
}

#[derive(Clone, Copy)]
struct Token {
    depth: u8,
    monitor: u32,
    nesting_allowed_at: Option<u8>,
    pending: Option<PriorityLevel>,
}

/// Proof that the critical section is held by the current context
///
/// Required to borrow the driver's [`Mutex`](crate::mutex::Mutex).
pub struct Held<'cs> {
    _section: PhantomData<&'cs ()>,
}

/// Reentrant critical section
pub struct CriticalSection<'a> {
    token: critical_section::Mutex<Cell<Token>>,
    gate: &'a dyn IrqGate,
}

impl<'a> CriticalSection<'a> {
    /// Create a released critical section masking the radio interrupt through `gate`
    pub const fn new(gate: &'a dyn IrqGate) -> Self {
        Self {
            token: critical_section::Mutex::new(Cell::new(Token {
                depth: 0,
                monitor: 0,
                nesting_allowed_at: None,
                pending: None,
            })),
            gate,
        }
    }

    fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Token) -> R,
    {
        locked(|cs| {
            let cell = self.token.borrow(cs);
            let mut token = cell.get();
            let result = f(&mut token);
            cell.set(token);
            result
        })
    }

    /// Try to enter the critical section
    ///
    /// Entering succeeds when the section is released, when `forced` is set, or when the holder
    /// opened the nesting window. Returns `false` if the section could not be entered; the caller
    /// must not touch the driver state in that case.
    pub fn enter(&self, forced: bool) -> bool {
        self.update(|t| {
            if t.depth == 0 || forced || t.nesting_allowed_at.is_some() {
                if t.depth == 0 {
                    self.gate.mask();
                }
                t.depth += 1;
                t.monitor = t.monitor.wrapping_add(1);
                true
            } else {
                false
            }
        })
    }

    /// Enter the critical section regardless of its current holder
    pub fn forceful_enter(&self) {
        let entered = self.enter(true);
        debug_assert!(entered);
    }

    /// Exit the critical section
    ///
    /// # Panics
    ///
    /// Panics if the critical section is not held.
    pub fn exit(&self) -> Exit {
        self.update(|t| {
            assert!(t.depth > 0, "Exiting critical section which is not held");

            if t.depth > 1 {
                t.depth -= 1;
                return Exit::Nested;
            }

            assert!(
                t.nesting_allowed_at.is_none(),
                "Releasing critical section with open nesting window"
            );

            match t.pending.take() {
                Some(level) => {
                    t.monitor = t.monitor.wrapping_add(1);
                    Exit::Pending(level)
                }
                None => {
                    t.depth = 0;
                    self.gate.unmask();
                    Exit::Released
                }
            }
        })
    }

    /// Post a scheduler notification to be processed by the holder of the section
    ///
    /// The queue has a single slot: a newer level overwrites an unprocessed older one.
    pub fn post_priority(&self, level: PriorityLevel) {
        self.update(|t| t.pending = Some(level));
    }

    /// Allow the holder's context to enter the critical section again
    ///
    /// # Panics
    ///
    /// Panics if the section is not held or nesting is already allowed.
    pub fn nesting_allow(&self) {
        self.update(|t| {
            assert!(t.depth > 0, "Nesting allowed outside of critical section");
            assert!(t.nesting_allowed_at.is_none(), "Nesting already allowed");
            t.nesting_allowed_at = Some(t.depth);
        });
    }

    /// Close the window opened by [`nesting_allow`](CriticalSection::nesting_allow)
    ///
    /// # Panics
    ///
    /// Panics if nesting is not allowed at the current depth.
    pub fn nesting_deny(&self) {
        self.update(|t| {
            assert_eq!(
                t.nesting_allowed_at,
                Some(t.depth),
                "Nesting denied by a context which did not allow it"
            );
            t.nesting_allowed_at = None;
        });
    }

    /// Check if the nesting window is open
    pub fn is_nesting_allowed(&self) -> bool {
        self.update(|t| t.nesting_allowed_at.is_some())
    }

    /// Current nesting depth, zero if the section is released
    pub fn depth(&self) -> u8 {
        self.update(|t| t.depth)
    }

    /// Epoch incremented on every successful entry
    pub fn monitor(&self) -> u32 {
        self.update(|t| t.monitor)
    }

    /// Get the proof that the critical section is held
    ///
    /// # Panics
    ///
    /// Panics if the critical section is not held.
    pub fn held(&self) -> Held<'_> {
        assert!(self.depth() > 0, "Critical section is not held");
        Held {
            _section: PhantomData,
        }
    }
}
