//! Radio peripheral of nRF52840

use super::traits::RadioPeripheral;
use super::{CcaMode, HardwareEvent, Interrupts, RadioState, RadioTask, Shorts};
use crate::hw::nrf52840::Nrf52840Hardware;
use crate::hw::timer::CC_ACK_TIMEOUT;
use cortex_m::peripheral::NVIC;
use nrf52840_hal::pac::{radio, Interrupt};

const MAX_PSDU_LENGTH: u8 = 127;
const CRC_POLYNOMIAL: u32 = 0x01_1021;

/// Address of a 32-bit register
pub(crate) fn reg_ptr<T>(reg: &T) -> *mut u32 {
    reg as *const T as *mut u32
}

/// Bit of the timer's compare event in its `INTENSET` register
const fn timer_compare_int(channel: u8) -> u32 {
    1 << (16 + channel)
}

impl Nrf52840Hardware {
    /// Address of the register holding `event`
    ///
    /// Returns `None` for events this port does not detect.
    pub(crate) fn event_ptr(&self, event: HardwareEvent) -> Option<*mut u32> {
        let reg = match event {
            HardwareEvent::Ready => reg_ptr(&self.radio.events_ready),
            HardwareEvent::Address => reg_ptr(&self.radio.events_address),
            HardwareEvent::End => reg_ptr(&self.radio.events_end),
            HardwareEvent::Disabled => reg_ptr(&self.radio.events_disabled),
            HardwareEvent::Bcmatch => reg_ptr(&self.radio.events_bcmatch),
            HardwareEvent::CrcOk => reg_ptr(&self.radio.events_crcok),
            HardwareEvent::CrcError => reg_ptr(&self.radio.events_crcerror),
            HardwareEvent::EdEnd => reg_ptr(&self.radio.events_edend),
            HardwareEvent::CcaIdle => reg_ptr(&self.radio.events_ccaidle),
            HardwareEvent::CcaBusy => reg_ptr(&self.radio.events_ccabusy),
            HardwareEvent::TxReady => reg_ptr(&self.radio.events_txready),
            HardwareEvent::MhrMatch => reg_ptr(&self.radio.events_mhrmatch),
            HardwareEvent::PhyEnd => reg_ptr(&self.radio.events_phyend),
            HardwareEvent::AckTimeout => {
                reg_ptr(&self.timer.events_compare[CC_ACK_TIMEOUT as usize])
            }
            HardwareEvent::TransactionError => return None,
        };
        Some(reg)
    }
}

impl RadioPeripheral for Nrf52840Hardware {
    fn reset(&mut self) {
        self.radio.power.write(|w| unsafe { w.bits(0) });
        self.radio.power.write(|w| unsafe { w.bits(1) });
    }

    fn configure_802154(&mut self) {
        self.radio
            .mode
            .write(|w| w.mode().variant(radio::mode::MODE_A::IEEE802154_250KBIT));
        self.radio.pcnf0.write(|w| {
            w.lflen()
                .variant(8)
                .plen()
                .variant(radio::pcnf0::PLEN_A::_32BIT_ZERO)
                .crcinc()
                .variant(radio::pcnf0::CRCINC_A::INCLUDE)
        });
        self.radio
            .pcnf1
            .write(|w| w.maxlen().variant(MAX_PSDU_LENGTH));
        self.radio
            .modecnf0
            .write(|w| w.ru().variant(radio::modecnf0::RU_A::FAST));
        self.radio.crccnf.write(|w| {
            w.len()
                .variant(radio::crccnf::LEN_A::TWO)
                .skipaddr()
                .variant(radio::crccnf::SKIPADDR_A::IEEE802154)
        });
        self.radio
            .crcpoly
            .write(|w| w.crcpoly().variant(CRC_POLYNOMIAL));
        self.radio.crcinit.write(|w| unsafe { w.bits(0) });
    }

    fn irq_init(&mut self) {
        NVIC::unpend(Interrupt::RADIO);
        NVIC::unpend(self.timer_irq);
        // Safety: the interrupt handlers enter the driver's critical section
        unsafe {
            NVIC::unmask(Interrupt::RADIO);
            NVIC::unmask(self.timer_irq);
        }
    }

    fn irq_deinit(&mut self) {
        NVIC::mask(Interrupt::RADIO);
        NVIC::mask(self.timer_irq);
        NVIC::unpend(Interrupt::RADIO);
        NVIC::unpend(self.timer_irq);
    }

    fn frequency_set(&mut self, offset_mhz: u8) {
        self.radio
            .frequency
            .write(|w| w.frequency().variant(offset_mhz));
    }

    fn tx_power_set(&mut self, dbm: i8) {
        self.radio
            .txpower
            .write(|w| unsafe { w.bits(u32::from(dbm as u8)) });
    }

    fn cca_configure(&mut self, mode: CcaMode, ed_threshold: u8, corr_threshold: u8, corr_limit: u8) {
        let mode: u32 = match mode {
            CcaMode::Ed => 0,
            CcaMode::Carrier => 1,
            CcaMode::CarrierAndEd => 2,
            CcaMode::CarrierOrEd => 3,
        };
        let bits = mode
            | u32::from(ed_threshold) << 8
            | u32::from(corr_threshold) << 16
            | u32::from(corr_limit) << 24;
        self.radio.ccactrl.write(|w| unsafe { w.bits(bits) });
    }

    fn packet_ptr_set(&mut self, ptr: *const u8) {
        self.radio
            .packetptr
            .write(|w| w.packetptr().variant(ptr as u32));
    }

    fn shorts_set(&mut self, shorts: Shorts) {
        self.radio.shorts.write(|w| unsafe { w.bits(shorts.bits()) });
    }

    fn shorts_get(&self) -> Shorts {
        Shorts::from_bits(self.radio.shorts.read().bits())
    }

    fn task_trigger(&mut self, task: RadioTask) {
        match task {
            RadioTask::TxEn => self.radio.tasks_txen.write(|w| unsafe { w.bits(1) }),
            RadioTask::RxEn => self.radio.tasks_rxen.write(|w| unsafe { w.bits(1) }),
            RadioTask::Start => self.radio.tasks_start.write(|w| unsafe { w.bits(1) }),
            RadioTask::Stop => self.radio.tasks_stop.write(|w| unsafe { w.bits(1) }),
            RadioTask::Disable => self.radio.tasks_disable.write(|w| unsafe { w.bits(1) }),
            RadioTask::EdStart => self.radio.tasks_edstart.write(|w| unsafe { w.bits(1) }),
            RadioTask::EdStop => self.radio.tasks_edstop.write(|w| unsafe { w.bits(1) }),
            RadioTask::CcaStart => self.radio.tasks_ccastart.write(|w| unsafe { w.bits(1) }),
            RadioTask::CcaStop => self.radio.tasks_ccastop.write(|w| unsafe { w.bits(1) }),
        }
    }

    fn event_check(&self, event: HardwareEvent) -> bool {
        // Safety: the pointer addresses an event register of an owned peripheral
        self.event_ptr(event)
            .map_or(false, |reg| unsafe { core::ptr::read_volatile(reg) } != 0)
    }

    fn event_clear(&mut self, event: HardwareEvent) {
        if let Some(reg) = self.event_ptr(event) {
            // Safety: the pointer addresses an event register of an owned peripheral
            unsafe { core::ptr::write_volatile(reg, 0) };
        }
    }

    fn interrupts_enable(&mut self, interrupts: Interrupts) {
        self.radio
            .intenset
            .write(|w| unsafe { w.bits(interrupts.bits() & Interrupts::RADIO_MASK) });

        if interrupts.contains(HardwareEvent::AckTimeout) {
            self.timer
                .intenset
                .write(|w| unsafe { w.bits(timer_compare_int(CC_ACK_TIMEOUT)) });
        }
    }

    fn interrupts_disable(&mut self, interrupts: Interrupts) {
        self.radio
            .intenclr
            .write(|w| unsafe { w.bits(interrupts.bits() & Interrupts::RADIO_MASK) });

        if interrupts.contains(HardwareEvent::AckTimeout) {
            self.timer
                .intenclr
                .write(|w| unsafe { w.bits(timer_compare_int(CC_ACK_TIMEOUT)) });
        }
    }

    fn interrupts_enabled(&self) -> Interrupts {
        let mut interrupts = Interrupts(self.radio.intenset.read().bits() & Interrupts::RADIO_MASK);
        if self.timer.intenset.read().bits() & timer_compare_int(CC_ACK_TIMEOUT) != 0 {
            interrupts = interrupts.with(HardwareEvent::AckTimeout);
        }
        interrupts
    }

    fn state_get(&self) -> RadioState {
        match self.radio.state.read().bits() {
            1 => RadioState::RxRu,
            2 => RadioState::RxIdle,
            3 => RadioState::Rx,
            4 => RadioState::RxDisable,
            9 => RadioState::TxRu,
            10 => RadioState::TxIdle,
            11 => RadioState::Tx,
            12 => RadioState::TxDisable,
            _ => RadioState::Disabled,
        }
    }

    fn crc_ok(&self) -> bool {
        self.radio.crcstatus.read().bits() == 1
    }

    fn rssi_sample(&self) -> u8 {
        self.radio.rssisample.read().bits() as u8
    }

    fn ed_sample(&self) -> u8 {
        self.radio.edsample.read().bits() as u8
    }

    fn ed_loop_count_set(&mut self, count: u32) {
        self.radio.edcnt.write(|w| unsafe { w.bits(count) });
    }

    fn bcc_set(&mut self, bits: u32) {
        self.radio.bcc.write(|w| unsafe { w.bits(bits) });
    }

    fn bcc_get(&self) -> u32 {
        self.radio.bcc.read().bits()
    }

    fn mhmu_pattern_set(&mut self, pattern: u32) {
        self.radio.mhrmatchconf.write(|w| unsafe { w.bits(pattern) });
    }

    fn mhmu_mask_set(&mut self, mask: u32) {
        self.radio.mhrmatchmas.write(|w| unsafe { w.bits(mask) });
    }
}
