//! Driver state and the procedures starting and stopping hardware operations
//!
//! Every operation has an init procedure, programming the hardware to perform it, and a terminate
//! procedure, stopping it. Init procedures do nothing but bookkeeping while the radio scheduler
//! has not granted a timeslot; the operation is then started when the timeslot is granted.
//!
//! The `dwt` ("disabled was triggered") argument of the init procedures tells if the radio is
//! being disabled by the previous operation's terminate procedure. The DISABLED event then starts
//! the new operation through the signal routing. Otherwise the procedure disables the radio
//! itself.

use super::state::{OperationState, RxFlags, SequenceToggles, Termination, Transfer};
use crate::config::Config;
use crate::error::{CcaError, EdError, RxError, TxError};
use crate::hw::ppi::{PpiChannel, RoutedEvent, RoutedTask};
use crate::hw::radio::{HardwareEvent, Interrupts, RadioState, RadioTask, Shorts};
use crate::hw::settle::wait_for;
use crate::hw::timer::{TimerShorts, CC_ACK_TX};
use crate::hw::Hardware;
use crate::ieee802154::ack::AckFrame;
use crate::ieee802154::correction::{
    lqi_scaled, rssi_dbm, AlwaysPending, NoCorrection, PendingBitLookup, SignalCorrection,
};
use crate::ieee802154::duration::{
    cca_duration_us, tx_duration_us, RAMP_UP_TIME_US, TURNAROUND_TIME_US,
};
use crate::ieee802154::filter::FILTER_INITIAL_BYTES;
use crate::ieee802154::pib::Pib;
use crate::ieee802154::{ack_requested, lqi_byte, FRAME_TYPE_ACK};
use crate::log::{debug, trace};
use crate::notification::Notification;
use crate::rx_buffer::{RxBufferPool, RxFrame};
use crate::scheduler::{PriorityLevel, Scheduler};
use heapless::Deque;

/// Capacity of the queue of notifications waiting for dispatch
pub(crate) const NOTIFICATION_QUEUE_SIZE: usize = 4;

pub(super) const SHORTS_RX: Shorts = Shorts::ADDRESS_RSSISTART
    .union(Shorts::END_DISABLE)
    .union(Shorts::ADDRESS_BCSTART);
pub(super) const SHORTS_RX_FREE_BUFFER: Shorts = Shorts::RXREADY_START;
pub(super) const SHORTS_TX_ACK: Shorts = Shorts::TXREADY_START.union(Shorts::PHYEND_DISABLE);
pub(super) const SHORTS_RX_ACK: Shorts = Shorts::ADDRESS_RSSISTART.union(Shorts::END_DISABLE);
const SHORTS_TX: Shorts = Shorts::TXREADY_START.union(Shorts::PHYEND_DISABLE);
const SHORTS_CCA_TX: Shorts = Shorts::RXREADY_CCASTART
    .union(Shorts::CCABUSY_DISABLE)
    .union(Shorts::CCAIDLE_TXEN)
    .union(Shorts::TXREADY_START)
    .union(Shorts::PHYEND_DISABLE);
const SHORTS_ED: Shorts = Shorts::READY_EDSTART;
const SHORTS_CCA: Shorts = Shorts::RXREADY_CCASTART;

pub(super) const RX_INTERRUPTS: Interrupts = Interrupts::of(HardwareEvent::CrcError)
    .with(HardwareEvent::Bcmatch)
    .with(HardwareEvent::CrcOk)
    .with(HardwareEvent::TransactionError);
pub(super) const TX_ACK_INTERRUPTS: Interrupts =
    Interrupts::of(HardwareEvent::PhyEnd).with(HardwareEvent::Address);
const TX_INTERRUPTS: Interrupts = Interrupts::of(HardwareEvent::PhyEnd)
    .with(HardwareEvent::Address)
    .with(HardwareEvent::TransactionError);
pub(super) const RX_ACK_INTERRUPTS: Interrupts = Interrupts::of(HardwareEvent::End)
    .with(HardwareEvent::AckTimeout)
    .with(HardwareEvent::TransactionError);
const ED_INTERRUPTS: Interrupts =
    Interrupts::of(HardwareEvent::EdEnd).with(HardwareEvent::TransactionError);
const CCA_INTERRUPTS: Interrupts = Interrupts::of(HardwareEvent::CcaBusy)
    .with(HardwareEvent::CcaIdle)
    .with(HardwareEvent::TransactionError);

/// Bit counter value at which the first part of a frame is filtered
pub(super) const BCC_INIT: u32 = (FILTER_INITIAL_BYTES * 8) as u32;

/// Latency of the signal routing between the timer compare event and the radio task
const EVENT_LATENCY_US: u32 = 23;
/// Timer value at which the ACK ramp-up starts, counted from the end of the received frame
pub(super) const ACK_TX_DELAY_US: u32 = TURNAROUND_TIME_US - RAMP_UP_TIME_US - EVENT_LATENCY_US;

/// Header-match unit mask covering the frame type and the sequence number
const MHMU_MASK: u32 = 0xff00_0700;
/// Header-match unit pattern of an ACK frame, without the sequence number
const MHMU_PATTERN: u32 = (FRAME_TYPE_ACK as u32) << 8;

/// State of the driver guarded by its critical section
pub(crate) struct Core<'a, H: Hardware> {
    pub(super) hw: H,
    pub(super) pib: Pib,
    pub(super) config: Config,
    pub(super) state: OperationState,
    pub(super) transfer: Transfer<'a>,
    pub(super) rx_flags: RxFlags,
    pub(super) toggles: SequenceToggles,
    pub(super) timeslot_granted: bool,
    pub(super) requested_priority: Option<PriorityLevel>,
    pub(super) rx_buffers: &'a RxBufferPool,
    pub(super) current_rx_buffer: Option<usize>,
    pub(super) ack: AckFrame,
    pub(super) correction: &'a dyn SignalCorrection,
    pub(super) pending_bit: &'a dyn PendingBitLookup,
    notifications: Deque<Notification<'a>, NOTIFICATION_QUEUE_SIZE>,
}

impl<'a, H: Hardware> Core<'a, H> {
    pub(crate) fn new(hw: H, rx_buffers: &'a RxBufferPool) -> Self {
        Self {
            hw,
            pib: Pib::new(),
            config: Config::new(),
            state: OperationState::Sleep,
            transfer: Transfer::default(),
            rx_flags: RxFlags::default(),
            toggles: SequenceToggles::default(),
            timeslot_granted: false,
            requested_priority: None,
            rx_buffers,
            current_rx_buffer: None,
            ack: AckFrame::new(),
            correction: &NoCorrection,
            pending_bit: &AlwaysPending,
            notifications: Deque::new(),
        }
    }

    pub(crate) fn state(&self) -> OperationState {
        self.state
    }

    pub(crate) fn toggles(&self) -> SequenceToggles {
        self.toggles
    }

    pub(crate) fn pib(&self) -> &Pib {
        &self.pib
    }

    pub(crate) fn pib_mut(&mut self) -> &mut Pib {
        &mut self.pib
    }

    pub(crate) fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub(crate) fn set_correction(&mut self, correction: &'a dyn SignalCorrection) {
        self.correction = correction;
    }

    pub(crate) fn set_pending_bit(&mut self, lookup: &'a dyn PendingBitLookup) {
        self.pending_bit = lookup;
    }

    pub(crate) fn has_notifications(&self) -> bool {
        !self.notifications.is_empty()
    }

    pub(crate) fn next_notification(&mut self) -> Option<Notification<'a>> {
        self.notifications.pop_front()
    }

    pub(super) fn notify(&mut self, notification: Notification<'a>) {
        let queued = self.notifications.push_back(notification).is_ok();
        assert!(queued, "Notification queue overflow");
    }

    /// Check if a critical section started from the API has enough time in the timeslot
    pub(crate) fn can_be_processed_now(&self, sched: &dyn Scheduler) -> bool {
        !self.timeslot_granted || sched.timeslot_us_left() >= self.config.min_crit_sect_time_us
    }

    pub(super) fn state_set(&mut self, sched: &dyn Scheduler, state: OperationState) {
        debug!("State {:?} -> {:?}", self.state, state);

        let tx_frame = if state.transmits_frame() {
            self.transfer.tx_frame
        } else {
            None
        };
        self.transfer = Transfer {
            tx_frame,
            ..Transfer::default()
        };
        self.state = state;
        self.priority_request(sched, state.priority());
    }

    pub(super) fn priority_request(&mut self, sched: &dyn Scheduler, level: PriorityLevel) {
        if self.requested_priority != Some(level) {
            trace!("Requesting priority {:?}", level);
            self.requested_priority = Some(level);
            sched.request_priority(level);
        }
    }

    /// Frame of the ongoing transmission
    pub(super) fn tx_frame(&self) -> &'a [u8] {
        match self.transfer.tx_frame {
            Some(frame) => frame,
            None => panic!("No frame to transmit in {:?} state", self.state),
        }
    }

    pub(super) fn rx_buffer_in_use(&self) -> usize {
        match self.current_rx_buffer {
            Some(id) => id,
            None => panic!("No receive buffer in use"),
        }
    }

    pub(super) fn rx_buffer_available(&self) -> bool {
        self.current_rx_buffer
            .map_or(false, |id| self.rx_buffers.is_free(id))
    }

    /// Pick a free buffer unless the one in use is still free
    ///
    /// Returns `false` if the pool is exhausted.
    pub(super) fn rx_buffer_select(&mut self) -> bool {
        if !self.rx_buffer_available() {
            self.current_rx_buffer = self.rx_buffers.free_find();
        }
        self.current_rx_buffer.is_some()
    }

    /// Let a receiver waiting without memory continue with the selected buffer
    pub(super) fn rx_buffer_attach(&mut self, shorts: Shorts) {
        if let Some(id) = self.current_rx_buffer {
            self.hw.packet_ptr_set(self.rx_buffers.ptr(id));
            self.hw.shorts_set(shorts | SHORTS_RX_FREE_BUFFER);

            if self.hw.state_get() == RadioState::RxIdle {
                self.hw.task_trigger(RadioTask::Start);
            }
        }
    }

    /// Hand the buffer in use over to the application
    pub(super) fn rx_buffer_take(&mut self) -> RxFrame<'a> {
        let id = self.rx_buffer_in_use();
        let pool = self.rx_buffers;
        pool.take(id)
    }

    /// Queue the received frame for delivery
    pub(super) fn received_notify(&mut self, frame: RxFrame<'a>) {
        let rssi = rssi_dbm(self.correction, self.hw.rssi_sample());
        let lqi = lqi_scaled(self.correction, lqi_byte(&frame));

        self.toggles.rx = !self.toggles.rx;
        self.attempt_completed();
        self.notify(Notification::Received { frame, rssi, lqi });
    }

    /// Start counting transaction errors of the next hardware attempt
    pub(super) fn attempt_completed(&mut self) {
        self.transfer.transaction_errors = 0;
    }

    pub(super) fn rx_flags_clear(&mut self) {
        self.rx_flags = RxFlags::default();
    }

    pub(super) fn channel_set(&mut self) {
        let offset = self.pib.frequency_offset();
        self.hw.frequency_set(offset);
    }

    pub(super) fn cca_configuration_update(&mut self) {
        let cca = *self.pib.get_cca();
        let ed_threshold = self.correction.cca_ed_threshold(cca.ed_threshold);
        self.hw
            .cca_configure(cca.mode, ed_threshold, cca.corr_threshold, cca.corr_limit);
    }

    /// Configure the radio after it was powered up in a new timeslot
    pub(super) fn radio_init(&mut self) {
        self.hw.configure_802154();
        self.cca_configuration_update();
        self.hw.mhmu_pattern_set(0);
        self.hw.mhmu_mask_set(MHMU_MASK);
        self.channel_set();
        self.hw.timer_init();
    }

    /// Check if the DISABLED event of the radio was routed to the EGU
    ///
    /// If it was not, the routes were set up after the radio had already been disabled.
    pub(super) fn ppi_egu_worked(&mut self) -> bool {
        if self.hw.state_get() != RadioState::Disabled {
            // Still ramping down, or already ramping up
            return true;
        }

        let timeout = self.config.ppi_settle_timeout_us;
        wait_for(&mut self.hw, timeout, |hw| hw.egu_event_check())
    }

    pub(super) fn ppis_for_egu_and_ramp_up_set(&mut self, task: RoutedTask, self_disabling: bool) {
        self.hw
            .ppi_connect(PpiChannel::EguRampUp, RoutedEvent::EguTriggered, task);
        if self_disabling {
            self.hw
                .ppi_fork(PpiChannel::EguRampUp, Some(RoutedTask::GroupDisable));
            self.hw.ppi_group_include(PpiChannel::EguRampUp);
        } else {
            self.hw.ppi_fork(PpiChannel::EguRampUp, None);
        }
        self.hw.ppi_connect(
            PpiChannel::DisabledEgu,
            RoutedEvent::RadioDisabled,
            RoutedTask::EguTrigger,
        );

        self.hw.ppi_enable(PpiChannel::EguRampUp);
        self.hw.ppi_enable(PpiChannel::DisabledEgu);
    }

    fn ramp_up_ppis_clear(&mut self) {
        self.hw.ppi_disable(PpiChannel::DisabledEgu);
        self.hw.ppi_disable(PpiChannel::EguRampUp);
        self.hw.ppi_group_remove(PpiChannel::EguRampUp);
        self.hw.ppi_fork(PpiChannel::EguRampUp, None);
    }

    fn disable_unless_routed(&mut self, dwt: bool) {
        if !dwt || !self.ppi_egu_worked() {
            self.hw.task_trigger(RadioTask::Disable);
        }
    }

    pub(super) fn ack_matching_enable(&mut self, dsn: u8) {
        self.hw.event_clear(HardwareEvent::MhrMatch);
        self.hw.mhmu_pattern_set(MHMU_PATTERN | (u32::from(dsn) << 24));
    }

    pub(super) fn ack_matching_disable(&mut self) {
        self.hw.mhmu_pattern_set(0);
        self.hw.event_clear(HardwareEvent::MhrMatch);
    }

    // Init procedures

    pub(super) fn sleep_init(&mut self, sched: &dyn Scheduler) {
        self.priority_request(sched, PriorityLevel::Idle);
        self.timeslot_granted = false;
    }

    pub(super) fn falling_asleep_init(&mut self, sched: &dyn Scheduler) {
        if !self.timeslot_granted {
            self.state_set(sched, OperationState::Sleep);
            self.sleep_init(sched);
            return;
        }

        self.hw.event_clear(HardwareEvent::Disabled);
        self.hw
            .interrupts_enable(Interrupts::of(HardwareEvent::Disabled));

        if self.hw.state_get() == RadioState::Disabled {
            // The DISABLED event might have been generated before the interrupt was enabled
            self.falling_asleep_terminate();
            self.state_set(sched, OperationState::Sleep);
            self.sleep_init(sched);
        }
    }

    pub(super) fn rx_init(&mut self, dwt: bool) {
        if !self.timeslot_granted {
            return;
        }

        self.rx_flags_clear();
        self.hw.tx_power_set(self.pib.get_tx_power());

        let free_buffer = self.rx_buffer_select();
        if let Some(id) = self.current_rx_buffer {
            self.hw.packet_ptr_set(self.rx_buffers.ptr(id));
        }
        self.hw.shorts_set(if free_buffer {
            SHORTS_RX | SHORTS_RX_FREE_BUFFER
        } else {
            SHORTS_RX
        });
        self.hw.bcc_set(BCC_INIT);

        self.hw.event_clear(HardwareEvent::CrcError);
        self.hw.event_clear(HardwareEvent::Bcmatch);
        self.hw.event_clear(HardwareEvent::CrcOk);
        self.hw.event_clear(HardwareEvent::TransactionError);
        self.hw.interrupts_enable(RX_INTERRUPTS);

        // The timer starts at the end of a received frame to time the ACK transmission
        self.hw.timer_shorts_set(TimerShorts::compare_stop(CC_ACK_TX));
        self.hw.timer_compare_set(CC_ACK_TX, ACK_TX_DELAY_US);

        self.hw.egu_event_clear();
        self.ppis_for_egu_and_ramp_up_set(RoutedTask::RadioRxEn, true);
        self.hw.ppi_connect(
            PpiChannel::EguTimerStart,
            RoutedEvent::EguTriggered,
            RoutedTask::TimerStart,
        );
        self.hw.ppi_enable(PpiChannel::EguTimerStart);

        self.disable_unless_routed(dwt);

        if !free_buffer && self.rx_buffer_select() {
            // A buffer was freed in the meantime
            self.rx_buffer_attach(SHORTS_RX);
        }
    }

    pub(super) fn tx_init(
        &mut self,
        sched: &dyn Scheduler,
        frame: &'a [u8],
        cca: bool,
        dwt: bool,
    ) -> bool {
        let ack_timeout = ack_requested(frame).then_some(self.config.ack_timeout_us);

        if !self.timeslot_granted
            || !sched.timeslot_request(tx_duration_us(frame[0], cca, ack_timeout))
        {
            return false;
        }

        self.hw.tx_power_set(self.pib.get_tx_power());
        self.hw.packet_ptr_set(frame.as_ptr());
        self.hw.shorts_set(if cca { SHORTS_CCA_TX } else { SHORTS_TX });

        self.hw.event_clear(HardwareEvent::PhyEnd);
        self.hw.event_clear(HardwareEvent::Address);
        self.hw.event_clear(HardwareEvent::TransactionError);
        let mut interrupts = TX_INTERRUPTS;
        if cca {
            self.hw.event_clear(HardwareEvent::CcaBusy);
            interrupts = interrupts.with(HardwareEvent::CcaBusy);
        }
        self.hw.interrupts_enable(interrupts);
        self.transfer.tx_started = false;

        self.hw.egu_event_clear();
        self.ppis_for_egu_and_ramp_up_set(
            if cca {
                RoutedTask::RadioRxEn
            } else {
                RoutedTask::RadioTxEn
            },
            true,
        );

        self.disable_unless_routed(dwt);
        true
    }

    pub(super) fn ed_init(&mut self, sched: &dyn Scheduler, dwt: bool) {
        if !self.timeslot_granted || !self.ed_iter_setup(sched, self.transfer.ed_time_left_us) {
            return;
        }

        self.hw.shorts_set(SHORTS_ED);
        self.hw.event_clear(HardwareEvent::EdEnd);
        self.hw.event_clear(HardwareEvent::TransactionError);
        self.hw.interrupts_enable(ED_INTERRUPTS);

        self.hw.egu_event_clear();
        self.ppis_for_egu_and_ramp_up_set(RoutedTask::RadioRxEn, true);

        self.disable_unless_routed(dwt);
    }

    /// Program the number of ED windows fitting both the remaining time and the timeslot
    ///
    /// Returns `false` if the timeslot is too short for another window. The remaining time is
    /// then measured in the next timeslot.
    pub(super) fn ed_iter_setup(&mut self, sched: &dyn Scheduler, time_us: u32) -> bool {
        let iter_duration = self.config.ed_iter_duration_us.max(1);
        let mut iters = sched.timeslot_us_left() / iter_duration;

        if iters > self.config.ed_iters_overhead {
            iters -= self.config.ed_iters_overhead;

            if time_us / iter_duration < iters {
                self.transfer.ed_time_left_us = 0;
                iters = time_us / iter_duration;
            } else {
                self.transfer.ed_time_left_us = time_us - iters * iter_duration;
                // The hardware performs one window more than the loop count
                iters -= 1;
            }

            self.hw.ed_loop_count_set(iters);
            true
        } else {
            self.transfer.ed_time_left_us = time_us;
            false
        }
    }

    pub(super) fn cca_init(&mut self, sched: &dyn Scheduler, dwt: bool) {
        if !self.timeslot_granted || !sched.timeslot_request(cca_duration_us()) {
            return;
        }

        self.hw.shorts_set(SHORTS_CCA);
        self.hw.event_clear(HardwareEvent::CcaBusy);
        self.hw.event_clear(HardwareEvent::CcaIdle);
        self.hw.event_clear(HardwareEvent::TransactionError);
        self.hw.interrupts_enable(CCA_INTERRUPTS);

        self.hw.egu_event_clear();
        self.ppis_for_egu_and_ramp_up_set(RoutedTask::RadioRxEn, true);

        self.disable_unless_routed(dwt);
    }

    pub(super) fn cc_init(&mut self, dwt: bool) {
        if !self.timeslot_granted {
            return;
        }

        self.hw.egu_event_clear();
        self.ppis_for_egu_and_ramp_up_set(RoutedTask::RadioTxEn, false);

        self.disable_unless_routed(dwt);
    }

    // Terminate procedures

    pub(super) fn falling_asleep_terminate(&mut self) {
        if self.timeslot_granted {
            self.hw
                .interrupts_disable(Interrupts::of(HardwareEvent::Disabled));
        }
    }

    pub(super) fn rx_terminate(&mut self) {
        self.ramp_up_ppis_clear();
        self.hw.ppi_disable(PpiChannel::EguTimerStart);

        self.hw.timer_shutdown();
        self.hw.timer_shorts_set(TimerShorts::NONE);

        if self.timeslot_granted {
            self.hw.interrupts_disable(RX_INTERRUPTS);
            self.hw.shorts_set(Shorts::NONE);
            self.hw.task_trigger(RadioTask::Disable);
        }
    }

    pub(super) fn tx_ack_terminate(&mut self) {
        self.ramp_up_ppis_clear();
        self.hw.ppi_disable(PpiChannel::EguTimerStart);
        self.hw.ppi_disable(PpiChannel::TimerTxAck);

        self.hw.timer_shutdown();
        self.hw.timer_shorts_set(TimerShorts::NONE);

        if self.timeslot_granted {
            self.hw.interrupts_disable(TX_ACK_INTERRUPTS);
            self.hw.shorts_set(Shorts::NONE);
            self.hw.task_trigger(RadioTask::Disable);
        }
    }

    pub(super) fn tx_terminate(&mut self) {
        self.ramp_up_ppis_clear();

        if self.timeslot_granted {
            self.hw
                .interrupts_disable(TX_INTERRUPTS.with(HardwareEvent::CcaBusy));
            self.hw.shorts_set(Shorts::NONE);
            self.hw.task_trigger(RadioTask::CcaStop);
            self.hw.task_trigger(RadioTask::Disable);
        }
    }

    pub(super) fn rx_ack_terminate(&mut self) {
        self.ramp_up_ppis_clear();

        self.hw.timer_shutdown();
        self.hw.timer_shorts_set(TimerShorts::NONE);

        if self.timeslot_granted {
            self.hw.interrupts_disable(RX_ACK_INTERRUPTS);
            self.hw.shorts_set(Shorts::NONE);
            self.hw.task_trigger(RadioTask::Disable);
            self.ack_matching_disable();
        }
    }

    pub(super) fn ed_terminate(&mut self) {
        self.ramp_up_ppis_clear();

        if self.timeslot_granted {
            self.hw.interrupts_disable(ED_INTERRUPTS);
            self.hw.shorts_set(Shorts::NONE);
            self.hw.task_trigger(RadioTask::EdStop);
            self.hw.task_trigger(RadioTask::Disable);
        }
    }

    pub(super) fn cca_terminate(&mut self) {
        self.ramp_up_ppis_clear();

        if self.timeslot_granted {
            self.hw.interrupts_disable(CCA_INTERRUPTS);
            self.hw.shorts_set(Shorts::NONE);
            self.hw.task_trigger(RadioTask::CcaStop);
            self.hw.task_trigger(RadioTask::Disable);
        }
    }

    pub(super) fn cc_terminate(&mut self) {
        self.ramp_up_ppis_clear();

        if self.timeslot_granted {
            self.hw.task_trigger(RadioTask::Disable);
        }
    }

    /// Stop the ongoing operation if `term` is severe enough
    ///
    /// With `notify` set, the owner of the terminated operation is informed that it was aborted.
    /// Returns `false` if the operation goes on.
    pub(super) fn terminate(&mut self, term: Termination, notify: bool) -> bool {
        match self.state {
            OperationState::Sleep => true,

            OperationState::FallingAsleep => {
                self.falling_asleep_terminate();
                true
            }

            OperationState::Receive => {
                if !self.rx_flags.psdu_being_received {
                    self.rx_terminate();
                    true
                } else if term >= Termination::Forced {
                    self.rx_terminate();
                    if notify {
                        self.notify(Notification::ReceiveFailed(RxError::Aborted));
                    }
                    true
                } else {
                    false
                }
            }

            OperationState::TransmitAck => {
                if term < Termination::Protocol {
                    return false;
                }
                self.tx_ack_terminate();
                if notify {
                    let frame = self.rx_buffer_take();
                    self.received_notify(frame);
                }
                true
            }

            OperationState::Transmit
            | OperationState::ClearChannelTransmit
            | OperationState::ReceiveAck => {
                if term < Termination::Protocol {
                    return false;
                }
                if self.state == OperationState::ReceiveAck {
                    self.rx_ack_terminate();
                } else {
                    self.tx_terminate();
                }
                if notify {
                    let frame = self.tx_frame();
                    self.notify(Notification::TransmitFailed {
                        frame,
                        error: TxError::Aborted,
                    });
                }
                true
            }

            OperationState::EnergyDetect => {
                if term < Termination::Protocol {
                    return false;
                }
                self.ed_terminate();
                if notify {
                    self.notify(Notification::EnergyDetectionFailed(EdError::Aborted));
                }
                true
            }

            OperationState::ClearChannelAssess => {
                if term < Termination::Protocol {
                    return false;
                }
                self.cca_terminate();
                if notify {
                    self.notify(Notification::CcaFailed(CcaError::Aborted));
                }
                true
            }

            OperationState::ContinuousCarrier => {
                self.cc_terminate();
                true
            }
        }
    }

    // Entry points, called with the critical section held

    pub(crate) fn sleep(&mut self, sched: &dyn Scheduler, term: Termination) -> bool {
        if matches!(
            self.state,
            OperationState::Sleep | OperationState::FallingAsleep
        ) {
            return true;
        }

        if self.can_be_processed_now(sched) {
            let result = self.terminate(term, true);
            if result {
                self.state_set(sched, OperationState::FallingAsleep);
                self.falling_asleep_init(sched);
            }
            result
        } else {
            // Not enough time in the timeslot to fall asleep gracefully
            self.hw.irq_deinit();
            self.hw.reset();
            self.state_set(sched, OperationState::Sleep);
            self.sleep_init(sched);
            true
        }
    }

    /// Returns `None` if the receiver was already running
    pub(crate) fn receive(
        &mut self,
        sched: &dyn Scheduler,
        term: Termination,
        notify_abort: bool,
    ) -> Option<bool> {
        if matches!(
            self.state,
            OperationState::Receive | OperationState::TransmitAck
        ) {
            return None;
        }

        let mut result = false;
        if self.can_be_processed_now(sched) {
            result = self.terminate(term, notify_abort);
            if result {
                self.state_set(sched, OperationState::Receive);
                self.rx_init(true);
            }
        }
        Some(result)
    }

    pub(crate) fn transmit(
        &mut self,
        sched: &dyn Scheduler,
        term: Termination,
        frame: &'a [u8],
        cca: bool,
        immediate: bool,
    ) -> bool {
        if !self.terminate(term, true) {
            return false;
        }

        self.state_set(sched, OperationState::Receive);
        self.transfer.tx_frame = Some(frame);

        let result = self.tx_init(sched, frame, cca, true) || !immediate;
        if result {
            self.state_set(
                sched,
                if cca {
                    OperationState::ClearChannelTransmit
                } else {
                    OperationState::Transmit
                },
            );
        } else {
            self.transfer.tx_frame = None;
            self.rx_init(true);
        }
        result
    }

    pub(crate) fn energy_detection(
        &mut self,
        sched: &dyn Scheduler,
        term: Termination,
        duration_us: u32,
    ) -> bool {
        let result = self.terminate(term, true);
        if result {
            self.state_set(sched, OperationState::EnergyDetect);
            self.transfer.ed_time_left_us = duration_us;
            self.transfer.ed_result = 0;
            self.ed_init(sched, true);
        }
        result
    }

    pub(crate) fn cca(&mut self, sched: &dyn Scheduler, term: Termination) -> bool {
        let result = self.terminate(term, true);
        if result {
            self.state_set(sched, OperationState::ClearChannelAssess);
            self.cca_init(sched, true);
        }
        result
    }

    pub(crate) fn continuous_carrier(&mut self, sched: &dyn Scheduler, term: Termination) -> bool {
        let result = self.terminate(term, true);
        if result {
            self.state_set(sched, OperationState::ContinuousCarrier);
            self.cc_init(true);
        }
        result
    }

    /// Restart a receiver which waits for memory with the freed buffer `id`
    pub(crate) fn buffer_freed(&mut self, id: usize) {
        if !self.timeslot_granted || self.hw.state_get() != RadioState::RxIdle {
            return;
        }

        let shorts = match self.state {
            OperationState::Receive => SHORTS_RX,
            OperationState::ReceiveAck => SHORTS_RX_ACK,
            _ => return,
        };

        debug_assert_eq!(self.hw.shorts_get(), shorts);
        self.current_rx_buffer = Some(id);
        self.rx_buffer_attach(shorts);
    }

    pub(crate) fn channel_update(&mut self) {
        match self.state {
            OperationState::Receive => {
                if self.timeslot_granted {
                    self.channel_set();
                }
                if self.terminate(Termination::None, true) {
                    self.rx_init(true);
                }
            }

            OperationState::ContinuousCarrier => {
                if self.timeslot_granted {
                    self.channel_set();
                    self.hw.task_trigger(RadioTask::Disable);
                }
            }

            OperationState::TransmitAck
            | OperationState::ClearChannelTransmit
            | OperationState::Transmit
            | OperationState::ReceiveAck
            | OperationState::ClearChannelAssess => {
                if self.timeslot_granted {
                    self.channel_set();
                }
            }

            // ED restores the channel when it finishes
            OperationState::Sleep | OperationState::FallingAsleep | OperationState::EnergyDetect => {
            }
        }
    }

    pub(crate) fn cca_config_update(&mut self) {
        if self.timeslot_granted {
            self.cca_configuration_update();
        }
    }

    pub(crate) fn deinit(&mut self, sched: &dyn Scheduler) {
        let terminated = self.terminate(Termination::Forced, false);
        debug_assert!(terminated);

        if self.timeslot_granted {
            self.hw.reset();
        }
        self.hw.irq_deinit();
        self.rx_flags_clear();
        self.state_set(sched, OperationState::Sleep);
        self.sleep_init(sched);
    }
}
