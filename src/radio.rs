use crate::config::Config;
use crate::crit_sect::{CriticalSection, Exit};
use crate::error::Error;
use crate::hw::{Hardware, IrqGate, NoIrqGate};
use crate::hw::radio::HardwareEvent;
use crate::ieee802154::correction::{PendingBitLookup, SignalCorrection};
use crate::ieee802154::pib::Pib;
use crate::ieee802154::is_transmittable;
use crate::log::warn;
use crate::mutex::Mutex;
use crate::notification::Notifications;
use crate::rx_buffer::{RxBufferPool, RxFrame};
use crate::scheduler::{PriorityLevel, Scheduler};

mod arbitration;
mod fsm;
mod irq;
mod state;


use fsm::Core;
pub use state::{AcceptedCallback, OperationState, SequenceToggles, Termination};

/// IEEE 802.15.4 radio driver
///
/// The driver is called from three contexts:
///
/// * the application, through the operation requests like [`receive`](Driver::receive) or
///   [`transmit`](Driver::transmit),
/// * the radio interrupt, through [`irq_handler`](Driver::irq_handler),
/// * the radio scheduler, through [`priority_changed`](Driver::priority_changed).
///
/// All of them are serialized by the driver's critical section. A request made while the section
/// is held by another context is declined, so the requests return `false` instead of blocking.
/// Outcomes of the accepted operations are reported through [`Notifications`].
///
/// The driver must not be moved while the radio operates, because the hardware holds pointers to
/// the frames owned by the driver. In practice the driver is created once and kept in a `static`
/// cell or on the stack of a function which never returns.
///
/// # Examples
///
/// ```ignore
/// use nrf_radio_802154::config::Config;
/// use nrf_radio_802154::radio::{Driver, Termination};
/// use nrf_radio_802154::rx_buffer::RxBufferPool;
///
/// static RX_BUFFERS: RxBufferPool = RxBufferPool::new();
///
/// let driver = Driver::new(hardware, scheduler, notifier, &RX_BUFFERS)
///     .with_config(Config::new().with_ack_timeout_us(1000));
///
/// driver.update_pib(|pib| pib.set_channel(15)).unwrap().unwrap();
/// assert!(driver.receive(Termination::None, false, None));
/// ```
pub struct Driver<'a, H, S, N>
where
    H: Hardware,
    S: Scheduler,
    N: Notifications<'a>,
{
    crit_sect: CriticalSection<'a>,
    core: Mutex<Core<'a, H>>,
    scheduler: S,
    notifier: N,
    rx_buffers: &'a RxBufferPool,
}

impl<'a, H, S, N> Driver<'a, H, S, N>
where
    H: Hardware,
    S: Scheduler,
    N: Notifications<'a>,
{
    /// Create a sleeping driver
    ///
    /// Frames are received to buffers taken from `rx_buffers`.
    pub fn new(hw: H, scheduler: S, notifier: N, rx_buffers: &'a RxBufferPool) -> Self {
        Self {
            crit_sect: CriticalSection::new(&NoIrqGate),
            core: Mutex::new(Core::new(hw, rx_buffers)),
            scheduler,
            notifier,
            rx_buffers,
        }
    }

    /// Use `config` as the driver's policy
    pub fn with_config(mut self, config: Config) -> Self {
        self.core.get_mut().set_config(config);
        self
    }

    /// Use `lookup` to decide the frame pending bit of the transmitted ACKs
    ///
    /// By default the bit is always set.
    pub fn with_pending_bit(mut self, lookup: &'a dyn PendingBitLookup) -> Self {
        self.core.get_mut().set_pending_bit(lookup);
        self
    }

    /// Use `correction` to compensate the measurements of the radio
    pub fn with_correction(mut self, correction: &'a dyn SignalCorrection) -> Self {
        self.core.get_mut().set_correction(correction);
        self
    }

    /// Mask the radio interrupt with `gate` while the critical section is held
    ///
    /// Required if [`irq_handler`](Driver::irq_handler) can preempt the other callers of the
    /// driver.
    pub fn with_irq_gate(mut self, gate: &'a dyn IrqGate) -> Self {
        self.crit_sect = CriticalSection::new(gate);
        self
    }

    /// Run `f` with the driver state, the critical section must be held
    fn with_core<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Core<'a, H>, &dyn Scheduler) -> R,
    {
        let held = self.crit_sect.held();
        let mut core = self.core.borrow_mut(&held);
        f(&mut core, &self.scheduler)
    }

    /// Enter the critical section if the granted timeslot leaves enough time for a request
    fn enter_and_verify_timeslot(&self) -> bool {
        if !self.crit_sect.enter(false) {
            return false;
        }

        if self.with_core(|core, sched| core.can_be_processed_now(sched)) {
            true
        } else {
            self.exit_critical_section();
            false
        }
    }

    /// Leave the critical section, processing the events which arrived while it was held
    fn exit_critical_section(&self) {
        loop {
            self.dispatch_notifications();

            match self.crit_sect.exit() {
                Exit::Pending(level) => {
                    self.with_core(|core, sched| core.priority_changed(sched, level));
                }
                Exit::Nested | Exit::Released => break,
            }
        }
    }

    /// Deliver the queued notifications with the nesting window open
    ///
    /// Notifications queued by a request made from a notification are delivered by the outermost
    /// dispatcher.
    fn dispatch_notifications(&self) {
        if self.crit_sect.is_nesting_allowed()
            || !self.with_core(|core, _| core.has_notifications())
        {
            return;
        }

        self.crit_sect.nesting_allow();
        while let Some(notification) = self.with_core(|core, _| core.next_notification()) {
            notification.deliver(&self.notifier);
        }
        self.crit_sect.nesting_deny();
    }

    /// Put the radio to sleep
    ///
    /// Returns `true` if the radio is asleep or falling asleep, including when it already was.
    /// Returns `false` if the ongoing operation cannot be terminated with `term` severity or the
    /// driver is busy.
    pub fn sleep(&self, term: Termination) -> bool {
        if !self.crit_sect.enter(false) {
            return false;
        }

        let result = self.with_core(|core, sched| core.sleep(sched, term));
        self.exit_critical_section();
        result
    }

    /// Start listening for frames
    ///
    /// With `notify_abort` set, the owner of the terminated operation is informed that it was
    /// aborted. `accepted` is called with the result if the request changed the operation.
    ///
    /// Returns `true` if the receiver runs, including when it already was running.
    pub fn receive(
        &self,
        term: Termination,
        notify_abort: bool,
        accepted: Option<AcceptedCallback>,
    ) -> bool {
        if !self.crit_sect.enter(false) {
            if let Some(callback) = accepted {
                callback(false);
            }
            return false;
        }

        let result = self.with_core(|core, sched| core.receive(sched, term, notify_abort));
        if let (Some(result), Some(callback)) = (result, accepted) {
            callback(result);
        }

        self.exit_critical_section();
        result.unwrap_or(true)
    }

    /// Transmit `frame`
    ///
    /// `frame` holds the PHR and the PSDU; the FCS is generated by the radio. With `cca` set the
    /// transmission is preceded by clear channel assessment. With `immediate` set the request
    /// fails if the frame cannot be transmitted in the current timeslot; otherwise it waits for
    /// the next one.
    ///
    /// The outcome is reported by [`Notifications::transmitted`] or
    /// [`Notifications::transmit_failed`].
    ///
    /// Returns `false` if the driver is busy or if `frame` is shorter than its PHR says.
    pub fn transmit(
        &self,
        term: Termination,
        frame: &'a [u8],
        cca: bool,
        immediate: bool,
        accepted: Option<AcceptedCallback>,
    ) -> bool {
        if !is_transmittable(frame) {
            warn!("Frame of {} bytes does not match its PHR", frame.len());
            if let Some(callback) = accepted {
                callback(false);
            }
            return false;
        }

        if !self.enter_and_verify_timeslot() {
            if let Some(callback) = accepted {
                callback(false);
            }
            return false;
        }

        let result =
            self.with_core(|core, sched| core.transmit(sched, term, frame, cca, immediate));
        if let Some(callback) = accepted {
            callback(result);
        }

        self.exit_critical_section();
        result
    }

    /// Measure the maximal energy level in the channel over `duration_us`
    ///
    /// The result is reported by [`Notifications::energy_detected`].
    pub fn energy_detection(&self, term: Termination, duration_us: u32) -> bool {
        if !self.enter_and_verify_timeslot() {
            return false;
        }

        let result = self.with_core(|core, sched| core.energy_detection(sched, term, duration_us));
        self.exit_critical_section();
        result
    }

    /// Assess if the channel is clear
    ///
    /// The result is reported by [`Notifications::cca_done`].
    pub fn cca(&self, term: Termination) -> bool {
        if !self.enter_and_verify_timeslot() {
            return false;
        }

        let result = self.with_core(|core, sched| core.cca(sched, term));
        self.exit_critical_section();
        result
    }

    /// Transmit an unmodulated carrier until another operation is requested
    pub fn continuous_carrier(&self, term: Termination) -> bool {
        if !self.enter_and_verify_timeslot() {
            return false;
        }

        let result = self.with_core(|core, sched| core.continuous_carrier(sched, term));
        self.exit_critical_section();
        result
    }

    /// Return the buffer of a received frame to the driver
    ///
    /// The buffer is returned even if the driver is busy. A receiver waiting for memory is
    /// restarted with it when possible. Always returns `true`.
    pub fn buffer_free(&self, frame: RxFrame<'a>) -> bool {
        let id = self.rx_buffers.release(frame);

        if self.enter_and_verify_timeslot() {
            self.with_core(|core, _| core.buffer_freed(id));
            self.exit_critical_section();
        }

        true
    }

    /// Tune the radio to the channel stored in the PIB
    ///
    /// Returns `false` if the driver is busy.
    pub fn channel_update(&self) -> bool {
        if !self.enter_and_verify_timeslot() {
            return false;
        }

        self.with_core(|core, _| core.channel_update());
        self.exit_critical_section();
        true
    }

    /// Apply the CCA configuration stored in the PIB
    ///
    /// Returns `false` if the driver is busy.
    pub fn cca_config_update(&self) -> bool {
        if !self.enter_and_verify_timeslot() {
            return false;
        }

        self.with_core(|core, _| core.cca_config_update());
        self.exit_critical_section();
        true
    }

    /// Inform the driver about the radio access level approved by the radio scheduler
    ///
    /// May be called from within [`Scheduler::request_priority`]. If the critical section is held,
    /// the level is processed when the section is released.
    pub fn priority_changed(&self, level: PriorityLevel) {
        self.crit_sect.post_priority(level);

        if self.crit_sect.enter(false) {
            self.exit_critical_section();
        }
    }

    /// Handle the radio interrupt
    pub fn irq_handler(&self) {
        self.crit_sect.forceful_enter();

        for event in HardwareEvent::IRQ_ORDER {
            self.with_core(|core, sched| core.irq_event(sched, event));
            self.dispatch_notifications();
        }

        self.exit_critical_section();
    }

    /// Current operation
    ///
    /// # Errors
    ///
    /// Returns [`Error::WouldBlock`] if the driver is busy.
    pub fn state(&self) -> Result<OperationState, Error> {
        self.with_locked(|core| core.state())
    }

    /// Parity bits of the successful transfers
    ///
    /// # Errors
    ///
    /// Returns [`Error::WouldBlock`] if the driver is busy.
    pub fn sequence_toggles(&self) -> Result<SequenceToggles, Error> {
        self.with_locked(|core| core.toggles())
    }

    /// Read the PIB
    ///
    /// # Errors
    ///
    /// Returns [`Error::WouldBlock`] if the driver is busy.
    pub fn pib<F, R>(&self, f: F) -> Result<R, Error>
    where
        F: FnOnce(&Pib) -> R,
    {
        self.with_locked(|core| f(core.pib()))
    }

    /// Modify the PIB
    ///
    /// A new channel or CCA configuration is applied to the radio by
    /// [`channel_update`](Driver::channel_update) or
    /// [`cca_config_update`](Driver::cca_config_update).
    ///
    /// # Errors
    ///
    /// Returns [`Error::WouldBlock`] if the driver is busy.
    pub fn update_pib<F, R>(&self, f: F) -> Result<R, Error>
    where
        F: FnOnce(&mut Pib) -> R,
    {
        self.with_locked(|core| f(core.pib_mut()))
    }

    /// Terminate any operation, power the radio down and release the radio interrupt
    pub fn deinit(&self) {
        self.crit_sect.forceful_enter();
        self.with_core(|core, sched| core.deinit(sched));
        self.exit_critical_section();
    }

    fn with_locked<F, R>(&self, f: F) -> Result<R, Error>
    where
        F: FnOnce(&mut Core<'a, H>) -> R,
    {
        if !self.crit_sect.enter(false) {
            return Err(Error::WouldBlock);
        }

        let result = self.with_core(|core, _| f(core));
        self.exit_critical_section();
        Ok(result)
    }
}
