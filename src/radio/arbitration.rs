//! Reaction to the radio access levels approved by the radio scheduler

use super::fsm::Core;
use super::state::{OperationState, Termination};
use crate::error::{RxError, TxError};
use crate::hw::Hardware;
use crate::log::{debug, info};
use crate::notification::Notification;
use crate::scheduler::{PriorityLevel, Scheduler};

impl<'a, H: Hardware> Core<'a, H> {
    pub(crate) fn priority_changed(&mut self, sched: &dyn Scheduler, level: PriorityLevel) {
        debug!("Approved priority {:?}", level);

        if level > PriorityLevel::Idle {
            self.timeslot_started(sched);
        } else {
            self.timeslot_ended(sched);
            sched.continuous_ended();
        }
    }

    fn timeslot_started(&mut self, sched: &dyn Scheduler) {
        if self.timeslot_granted || sched.timeslot_us_left() < self.config.min_crit_sect_time_us {
            return;
        }

        self.hw.reset();
        self.radio_init();
        self.hw.irq_init();

        if self.state != OperationState::Sleep {
            self.timeslot_granted = true;
        }

        match self.state {
            // The radio is released with the next request of the Idle level
            OperationState::Sleep => {}
            OperationState::Receive => self.rx_init(false),
            OperationState::Transmit | OperationState::ClearChannelTransmit => {
                let frame = self.tx_frame();
                let cca = self.state == OperationState::ClearChannelTransmit;
                if !self.tx_init(sched, frame, cca, false) {
                    info!("Timeslot too short to transmit");
                }
            }
            OperationState::EnergyDetect => self.ed_init(sched, false),
            OperationState::ClearChannelAssess => self.cca_init(sched, false),
            OperationState::ContinuousCarrier => self.cc_init(false),
            state => panic!("Timeslot started in {:?} state", state),
        }
    }

    fn timeslot_ended(&mut self, sched: &dyn Scheduler) {
        if !self.timeslot_granted {
            return;
        }

        self.hw.irq_deinit();
        self.hw.reset();
        self.timeslot_granted = false;

        // The owner learns about the lost timeslot below, not about an abort
        let terminated = self.terminate(Termination::Forced, false);
        assert!(terminated);

        match self.state {
            OperationState::FallingAsleep => {
                self.state_set(sched, OperationState::Sleep);
                self.sleep_init(sched);
            }

            OperationState::Receive => {
                if self.rx_flags.psdu_being_received {
                    info!("Timeslot ended during reception");
                    self.rx_flags_clear();
                    self.notify(Notification::ReceiveFailed(RxError::TimeslotEnded));
                }
            }

            OperationState::TransmitAck => {
                let frame = self.rx_buffer_take();
                self.state_set(sched, OperationState::Receive);
                self.rx_flags_clear();
                self.received_notify(frame);
            }

            OperationState::Transmit
            | OperationState::ClearChannelTransmit
            | OperationState::ReceiveAck => {
                let frame = self.tx_frame();
                info!("Timeslot ended during transmission");
                self.state_set(sched, OperationState::Receive);
                self.notify(Notification::TransmitFailed {
                    frame,
                    error: TxError::TimeslotEnded,
                });
            }

            // Resumed in the next timeslot
            OperationState::Sleep
            | OperationState::EnergyDetect
            | OperationState::ClearChannelAssess
            | OperationState::ContinuousCarrier => {}
        }
    }
}
