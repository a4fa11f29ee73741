//! Sub-transitions of the operations driven by the radio interrupt

use super::fsm::{
    Core, ACK_TX_DELAY_US, BCC_INIT, RX_ACK_INTERRUPTS, RX_INTERRUPTS, SHORTS_RX, SHORTS_RX_ACK,
    SHORTS_RX_FREE_BUFFER, SHORTS_TX_ACK, TX_ACK_INTERRUPTS,
};
use super::state::OperationState;
use crate::error::{CcaError, EdError, RxError, TxError};
use crate::hw::ppi::{PpiChannel, RoutedEvent, RoutedTask};
use crate::hw::radio::{HardwareEvent, Interrupts, RadioState, RadioTask};
use crate::hw::settle::wait_for;
use crate::hw::timer::{TimerShorts, CC_ACK_TIMEOUT, CC_ACK_TX, CC_CAPTURE};
use crate::hw::Hardware;
use crate::ieee802154::correction::{ed_scaled, lqi_scaled, rssi_dbm};
use crate::ieee802154::duration::rx_duration_us;
use crate::ieee802154::filter::Filter;
use crate::ieee802154::{ack_requested, is_ack, lqi_byte, DSN_OFFSET};
use crate::log::{error, info, trace, warn};
use crate::notification::Notification;
use crate::scheduler::{PriorityLevel, Scheduler};

impl<'a, H: Hardware> Core<'a, H> {
    /// Handle `event` if it is pending and its interrupt is enabled
    pub(crate) fn irq_event(&mut self, sched: &dyn Scheduler, event: HardwareEvent) {
        if !self.hw.interrupts_enabled().contains(event) || !self.hw.event_check(event) {
            return;
        }
        self.hw.event_clear(event);
        trace!("{:?} event in {:?} state", event, self.state);

        use HardwareEvent::*;
        use OperationState::*;

        match (self.state, event) {
            (Transmit | ClearChannelTransmit, Address) => self.transfer.tx_started = true,
            (TransmitAck, Address) => trace!("ACK transmission started"),

            (Receive, Bcmatch) => self.irq_bcmatch_rx(sched),
            (Receive, CrcError) => self.irq_crcerror_rx(sched),
            (Receive, CrcOk) => self.irq_crcok_rx(sched),

            (TransmitAck, PhyEnd) => self.irq_phyend_tx_ack(sched),
            (Transmit | ClearChannelTransmit, PhyEnd) => self.irq_phyend_tx(sched),
            (Transmit | ClearChannelTransmit, CcaBusy) => self.irq_ccabusy_tx(sched),

            (ReceiveAck, End) => self.irq_end_rx_ack(sched),
            (ReceiveAck, AckTimeout) => self.irq_ack_timeout(sched),

            (FallingAsleep, Disabled) => {
                self.falling_asleep_terminate();
                self.state_set(sched, Sleep);
                self.sleep_init(sched);
            }

            (ClearChannelAssess, CcaIdle) => self.irq_cca_result(sched, true),
            (ClearChannelAssess, CcaBusy) => self.irq_cca_result(sched, false),

            (EnergyDetect, EdEnd) => self.irq_edend(sched),

            (
                Receive | Transmit | ClearChannelTransmit | ReceiveAck | EnergyDetect
                | ClearChannelAssess,
                TransactionError,
            ) => self.irq_transaction_error(sched),

            (state, event) => panic!("Unexpected {:?} event in {:?} state", event, state),
        }
    }

    /// Prepare the receiver for the next frame while it ramps up again after the previous one
    fn rx_restart(&mut self, sched: &dyn Scheduler, set_shorts: bool) {
        self.attempt_completed();
        self.hw.ppi_disable(PpiChannel::DisabledEgu);

        if set_shorts {
            self.hw.shorts_set(SHORTS_RX);
        }

        self.hw.timer_shutdown();
        self.hw.ppi_enable(PpiChannel::EguRampUp);

        self.rx_flags_clear();
        self.hw.event_clear(HardwareEvent::Bcmatch);
        self.hw.bcc_set(BCC_INIT);

        self.hw.egu_event_clear();
        self.hw.ppi_enable(PpiChannel::DisabledEgu);

        if !self.ppi_egu_worked() {
            self.hw.task_trigger(RadioTask::Disable);
        }

        self.priority_request(sched, PriorityLevel::IdleListening);
    }

    fn irq_bcmatch_rx(&mut self, sched: &dyn Scheduler) {
        let mut num_bytes = (self.hw.bcc_get() / 8) as usize;
        let prev_num_bytes = num_bytes;

        // The frame is restarted by the CrcError handler
        if self.hw.event_check(HardwareEvent::CrcError) {
            return;
        }

        let pool = self.rx_buffers;
        let frame = pool.data(self.rx_buffer_in_use());
        let mut accepted = true;

        if !self.rx_flags.frame_filtered {
            self.rx_flags.psdu_being_received = true;

            let result = Filter::new(&self.pib).filter_frame_part(frame, &mut num_bytes);
            match result {
                Ok(()) => {
                    if num_bytes != prev_num_bytes {
                        self.hw.bcc_set((num_bytes * 8) as u32);
                    } else {
                        self.rx_flags.frame_filtered = true;
                    }
                }
                Err(error) if error == RxError::InvalidLength || !self.pib.get_promiscuous() => {
                    trace!("Frame rejected: {:?}", error);
                    self.attempt_completed();
                    self.rx_terminate();
                    self.rx_init(true);
                    accepted = false;

                    if !is_ack(frame) {
                        self.notify(Notification::ReceiveFailed(error));
                    }
                }
                // Promiscuous mode receives frames not addressed to this device
                Err(_) => {}
            }
        }

        if accepted && !self.rx_flags.timeslot_requested {
            if sched.timeslot_request(rx_duration_us(frame[0], ack_requested(frame))) {
                self.rx_flags.timeslot_requested = true;
                self.priority_request(sched, PriorityLevel::Receive);
            } else {
                info!("No time to receive the frame");
                self.attempt_completed();
                self.rx_terminate();
                self.rx_init(true);
                self.notify(Notification::ReceiveFailed(RxError::TimeslotEnded));
            }
        }
    }

    fn irq_crcerror_rx(&mut self, sched: &dyn Scheduler) {
        self.rx_restart(sched, false);

        if self.config.notify_crc_error {
            self.notify(Notification::ReceiveFailed(RxError::InvalidFcs));
        }
    }

    fn irq_crcok_rx(&mut self, sched: &dyn Scheduler) {
        let pool = self.rx_buffers;
        let frame = pool.data(self.rx_buffer_in_use());
        let promiscuous = self.pib.get_promiscuous();

        if !self.rx_flags.frame_filtered && !promiscuous {
            error!("Frame received without being filtered");
            self.attempt_completed();
            self.rx_terminate();
            self.rx_init(true);
            self.notify(Notification::ReceiveFailed(RxError::Runtime));
            return;
        }

        if self.rx_flags.frame_filtered && ack_requested(frame) && self.pib.get_auto_ack() {
            self.ack_transmit_start(sched);
            return;
        }

        self.rx_restart(sched, true);

        if !is_ack(frame) || promiscuous {
            let received = self.rx_buffer_take();
            self.rx_buffer_select();
            self.rx_buffer_attach(SHORTS_RX);
            self.received_notify(received);
        } else {
            // ACKs are handled only by the transmitter, the buffer is reused
            self.hw.shorts_set(SHORTS_RX | SHORTS_RX_FREE_BUFFER);
            if self.hw.state_get() == RadioState::RxIdle {
                self.hw.task_trigger(RadioTask::Start);
            }
        }
    }

    /// Switch the radio to transmit the ACK to the frame in the buffer in use
    fn ack_transmit_start(&mut self, sched: &dyn Scheduler) {
        let pool = self.rx_buffers;
        let frame = pool.data(self.rx_buffer_in_use());

        self.ack.prepare_for(frame);
        self.hw.packet_ptr_set(self.ack.as_ptr());
        self.hw.shorts_set(SHORTS_TX_ACK);
        self.hw.event_clear(HardwareEvent::TxReady);

        self.hw.ppi_connect(
            PpiChannel::TimerTxAck,
            RoutedEvent::TimerCompare(CC_ACK_TX),
            RoutedTask::RadioTxEn,
        );
        self.hw.ppi_enable(PpiChannel::TimerTxAck);

        // The ACK is sent if the route was set up before the timer fired
        let ack_on_time = self.hw.timer_capture(CC_CAPTURE) < ACK_TX_DELAY_US || {
            let timeout = self.config.ppi_settle_timeout_us;
            wait_for(&mut self.hw, timeout, |hw| {
                hw.state_get() == RadioState::TxRu || hw.event_check(HardwareEvent::TxReady)
            })
        };

        if ack_on_time {
            let pending = self.pending_bit.pending_bit_should_be_set(frame);
            self.ack.set_pending(pending);

            self.state_set(sched, OperationState::TransmitAck);

            self.hw.interrupts_disable(RX_INTERRUPTS);
            self.hw.event_clear(HardwareEvent::PhyEnd);
            self.hw.event_clear(HardwareEvent::Address);
            self.hw.interrupts_enable(TX_ACK_INTERRUPTS);
        } else {
            warn!("ACK not sent on time");
            self.attempt_completed();
            let received = self.rx_buffer_take();
            self.hw.ppi_disable(PpiChannel::TimerTxAck);
            self.rx_terminate();
            self.rx_init(true);
            self.received_notify(received);
        }
    }

    fn irq_phyend_tx_ack(&mut self, sched: &dyn Scheduler) {
        self.hw.ppi_disable(PpiChannel::DisabledEgu);
        self.hw.shorts_set(SHORTS_RX);
        self.hw.bcc_set(BCC_INIT);

        self.hw.interrupts_disable(TX_ACK_INTERRUPTS);
        self.hw.event_clear(HardwareEvent::CrcError);
        self.hw.event_clear(HardwareEvent::Bcmatch);
        self.hw.event_clear(HardwareEvent::CrcOk);
        self.hw.event_clear(HardwareEvent::TransactionError);
        self.hw.interrupts_enable(RX_INTERRUPTS);

        self.hw.timer_shutdown();
        self.hw.ppi_disable(PpiChannel::TimerTxAck);
        self.hw.ppi_enable(PpiChannel::EguRampUp);
        self.hw.egu_event_clear();
        self.hw.ppi_enable(PpiChannel::DisabledEgu);

        if !self.ppi_egu_worked() {
            self.hw.task_trigger(RadioTask::Disable);
        }

        let received = self.rx_buffer_take();
        self.rx_buffer_select();
        self.rx_buffer_attach(SHORTS_RX);

        self.state_set(sched, OperationState::Receive);
        self.rx_flags_clear();
        self.received_notify(received);
    }

    fn irq_phyend_tx(&mut self, sched: &dyn Scheduler) {
        if !self.transfer.tx_started {
            // PHYEND of a transmission started before the current one was requested
            return;
        }

        let frame = self.tx_frame();

        if !ack_requested(frame) {
            self.tx_terminate();
            self.state_set(sched, OperationState::Receive);
            self.rx_init(true);

            self.toggles.tx = !self.toggles.tx;
            self.notify(Notification::Transmitted {
                frame,
                ack: None,
                rssi: 0,
                lqi: 0,
            });
            return;
        }

        let free_buffer = self.rx_buffer_available();

        self.hw.ppi_disable(PpiChannel::DisabledEgu);
        if free_buffer {
            let id = self.rx_buffer_in_use();
            self.hw.packet_ptr_set(self.rx_buffers.ptr(id));
            self.hw.shorts_set(SHORTS_RX_ACK | SHORTS_RX_FREE_BUFFER);
        } else {
            self.hw.shorts_set(SHORTS_RX_ACK);
        }

        self.hw.interrupts_disable(
            Interrupts::of(HardwareEvent::CcaBusy)
                .with(HardwareEvent::Address)
                .with(HardwareEvent::PhyEnd),
        );
        self.hw.event_clear(HardwareEvent::End);
        self.hw.event_clear(HardwareEvent::AckTimeout);
        self.hw.interrupts_enable(RX_ACK_INTERRUPTS);

        self.hw.ppi_connect(
            PpiChannel::EguRampUp,
            RoutedEvent::EguTriggered,
            RoutedTask::RadioRxEn,
        );
        self.hw
            .ppi_fork(PpiChannel::EguRampUp, Some(RoutedTask::GroupDisable));
        self.hw.egu_event_clear();
        self.hw.ppi_enable(PpiChannel::EguRampUp);
        self.hw.ppi_enable(PpiChannel::DisabledEgu);

        self.state_set(sched, OperationState::ReceiveAck);

        if !self.ppi_egu_worked() {
            self.hw.task_trigger(RadioTask::Disable);
        }

        if !free_buffer && self.rx_buffer_select() {
            self.rx_buffer_attach(SHORTS_RX_ACK);
        }

        self.ack_matching_enable(frame[DSN_OFFSET]);

        self.hw
            .timer_shorts_set(TimerShorts::compare_stop(CC_ACK_TIMEOUT));
        self.hw
            .timer_compare_set(CC_ACK_TIMEOUT, self.config.ack_timeout_us);
        self.hw.timer_start();
    }

    fn irq_ccabusy_tx(&mut self, sched: &dyn Scheduler) {
        let frame = self.tx_frame();

        self.tx_terminate();
        self.state_set(sched, OperationState::Receive);
        self.rx_init(true);

        info!("Channel busy");
        self.notify(Notification::TransmitFailed {
            frame,
            error: TxError::BusyChannel,
        });
    }

    fn irq_end_rx_ack(&mut self, sched: &dyn Scheduler) {
        let frame = self.tx_frame();
        let matched = self.hw.event_check(HardwareEvent::MhrMatch) && self.hw.crc_ok();

        let ack = if matched {
            Some(self.rx_buffer_take())
        } else {
            None
        };
        let rssi = rssi_dbm(self.correction, self.hw.rssi_sample());

        self.rx_ack_terminate();
        self.state_set(sched, OperationState::Receive);
        self.rx_init(true);

        match ack {
            Some(ack) => {
                let lqi = lqi_scaled(self.correction, lqi_byte(&ack));
                self.toggles.tx = !self.toggles.tx;
                self.notify(Notification::Transmitted {
                    frame,
                    ack: Some(ack),
                    rssi,
                    lqi,
                });
            }
            None => {
                info!("Invalid ACK received");
                self.notify(Notification::TransmitFailed {
                    frame,
                    error: TxError::InvalidAck,
                });
            }
        }
    }

    fn irq_ack_timeout(&mut self, sched: &dyn Scheduler) {
        let frame = self.tx_frame();

        self.rx_ack_terminate();
        self.state_set(sched, OperationState::Receive);
        self.rx_init(true);

        info!("No ACK received");
        self.notify(Notification::TransmitFailed {
            frame,
            error: TxError::NoAck,
        });
    }

    fn irq_cca_result(&mut self, sched: &dyn Scheduler, channel_free: bool) {
        self.cca_terminate();
        self.state_set(sched, OperationState::Receive);
        self.rx_init(true);

        self.notify(Notification::CcaDone(channel_free));
    }

    fn irq_edend(&mut self, sched: &dyn Scheduler) {
        let sample = self.hw.ed_sample();
        self.transfer.ed_result = self.transfer.ed_result.max(sample);
        self.attempt_completed();

        if self.transfer.ed_time_left_us > 0 {
            if self.ed_iter_setup(sched, self.transfer.ed_time_left_us) {
                self.hw.task_trigger(RadioTask::EdStart);
            }
            // Otherwise the detection continues in the next timeslot
            return;
        }

        let result = ed_scaled(self.correction, self.transfer.ed_result);

        self.channel_set();
        self.ed_terminate();
        self.state_set(sched, OperationState::Receive);
        self.rx_init(true);

        self.notify(Notification::EnergyDetected(result));
    }

    fn irq_transaction_error(&mut self, sched: &dyn Scheduler) {
        self.transfer.transaction_errors += 1;

        if self.transfer.transaction_errors < self.config.max_transaction_errors {
            warn!(
                "Transaction error {} in {:?} state, retrying",
                self.transfer.transaction_errors, self.state
            );
            if !self.transaction_retry(sched) {
                self.transaction_fail(sched, TxError::TimeslotEnded);
            }
        } else {
            error!("Transaction error limit reached in {:?} state", self.state);
            self.transaction_fail(sched, TxError::HardwareError);
        }
    }

    /// Re-arm the hardware action which failed, returns `false` if it cannot be repeated
    fn transaction_retry(&mut self, sched: &dyn Scheduler) -> bool {
        match self.state {
            OperationState::Receive => {
                self.rx_terminate();
                self.rx_init(true);
                true
            }
            OperationState::Transmit | OperationState::ClearChannelTransmit => {
                let frame = self.tx_frame();
                let cca = self.state == OperationState::ClearChannelTransmit;
                self.tx_terminate();
                self.tx_init(sched, frame, cca, false)
            }
            OperationState::ReceiveAck => {
                self.hw.ppi_enable(PpiChannel::EguRampUp);
                self.hw.egu_event_clear();
                self.hw.task_trigger(RadioTask::Disable);
                true
            }
            OperationState::EnergyDetect => {
                self.hw.task_trigger(RadioTask::EdStart);
                true
            }
            OperationState::ClearChannelAssess => {
                self.hw.task_trigger(RadioTask::CcaStart);
                true
            }
            state => panic!("No transaction to retry in {:?} state", state),
        }
    }

    /// Abort the operation which failed and report it to its owner
    ///
    /// `tx_error` is reported if the failed operation was a transmission.
    fn transaction_fail(&mut self, sched: &dyn Scheduler, tx_error: TxError) {
        match self.state {
            OperationState::Receive => {
                self.rx_terminate();
                self.rx_init(true);
                self.attempt_completed();
                self.notify(Notification::ReceiveFailed(RxError::HardwareError));
            }
            OperationState::Transmit
            | OperationState::ClearChannelTransmit
            | OperationState::ReceiveAck => {
                let frame = self.tx_frame();
                if self.state == OperationState::ReceiveAck {
                    self.rx_ack_terminate();
                } else {
                    self.tx_terminate();
                }
                self.state_set(sched, OperationState::Receive);
                self.rx_init(true);
                self.notify(Notification::TransmitFailed {
                    frame,
                    error: tx_error,
                });
            }
            OperationState::EnergyDetect => {
                self.ed_terminate();
                self.state_set(sched, OperationState::Receive);
                self.rx_init(true);
                self.notify(Notification::EnergyDetectionFailed(EdError::HardwareError));
            }
            OperationState::ClearChannelAssess => {
                self.cca_terminate();
                self.state_set(sched, OperationState::Receive);
                self.rx_init(true);
                self.notify(Notification::CcaFailed(CcaError::HardwareError));
            }
            state => panic!("No transaction to abort in {:?} state", state),
        }
    }
}
