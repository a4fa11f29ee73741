//! Implementation of signal routing based on legacy PPI peripheral from nRF52 series
//!
//! The routes use fixed PPI channels and the channel group 0. The route starting a sequence
//! through the EGU uses channel 0 of the EGU instance.

use super::traits::SignalRouting;
use super::{PpiChannel, RoutedEvent, RoutedTask};
use crate::hw::nrf52840::Nrf52840Hardware;
use crate::hw::radio::nrf52840::reg_ptr;

/// Channel group disabled by [`RoutedTask::GroupDisable`]
const PPI_GROUP: usize = 0;
/// EGU channel used to start sequences
const EGU_CHANNEL: usize = 0;

const fn channel_id(channel: PpiChannel) -> usize {
    match channel {
        PpiChannel::DisabledEgu => 6,
        PpiChannel::EguRampUp => 7,
        PpiChannel::EguTimerStart => 8,
        PpiChannel::TimerTxAck => 9,
    }
}

impl Nrf52840Hardware {
    fn event_address(&self, event: RoutedEvent) -> u32 {
        let reg = match event {
            RoutedEvent::RadioDisabled => reg_ptr(&self.radio.events_disabled),
            RoutedEvent::EguTriggered => reg_ptr(&self.egu.events_triggered[EGU_CHANNEL]),
            RoutedEvent::TimerCompare(ch) => reg_ptr(&self.timer.events_compare[ch as usize]),
        };
        reg as u32
    }

    fn task_address(&self, task: RoutedTask) -> u32 {
        let reg = match task {
            RoutedTask::RadioRxEn => reg_ptr(&self.radio.tasks_rxen),
            RoutedTask::RadioTxEn => reg_ptr(&self.radio.tasks_txen),
            RoutedTask::EguTrigger => reg_ptr(&self.egu.tasks_trigger[EGU_CHANNEL]),
            RoutedTask::TimerStart => reg_ptr(&self.timer.tasks_start),
            RoutedTask::GroupDisable => reg_ptr(&self.ppi.tasks_chg[PPI_GROUP].dis),
        };
        reg as u32
    }
}

impl SignalRouting for Nrf52840Hardware {
    fn ppi_connect(&mut self, channel: PpiChannel, event: RoutedEvent, task: RoutedTask) {
        let id = channel_id(channel);
        let eep = self.event_address(event);
        let tep = self.task_address(task);

        self.ppi.ch[id].eep.write(|w| w.eep().variant(eep));
        self.ppi.ch[id].tep.write(|w| w.tep().variant(tep));
    }

    fn ppi_fork(&mut self, channel: PpiChannel, task: Option<RoutedTask>) {
        let tep = task.map_or(0, |task| self.task_address(task));
        self.ppi.fork[channel_id(channel)]
            .tep
            .write(|w| w.tep().variant(tep));
    }

    fn ppi_enable(&mut self, channel: PpiChannel) {
        self.ppi
            .chenset
            .write(|w| unsafe { w.bits(1u32 << channel_id(channel)) });
    }

    fn ppi_disable(&mut self, channel: PpiChannel) {
        self.ppi
            .chenclr
            .write(|w| unsafe { w.bits(1u32 << channel_id(channel)) });
    }

    fn ppi_group_include(&mut self, channel: PpiChannel) {
        self.ppi.chg[PPI_GROUP]
            .modify(|r, w| unsafe { w.bits(r.bits() | 1u32 << channel_id(channel)) });
    }

    fn ppi_group_remove(&mut self, channel: PpiChannel) {
        self.ppi.chg[PPI_GROUP]
            .modify(|r, w| unsafe { w.bits(r.bits() & !(1u32 << channel_id(channel))) });
    }

    fn egu_event_clear(&mut self) {
        self.egu.events_triggered[EGU_CHANNEL].write(|w| unsafe { w.bits(0) });
    }

    fn egu_event_check(&self) -> bool {
        self.egu.events_triggered[EGU_CHANNEL].read().bits() != 0
    }
}
