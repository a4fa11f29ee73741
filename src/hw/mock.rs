//! RAM-backed fake of the hardware used by unit tests
//!
//! [`MockHardware`] implements all the hardware traits by storing register values in memory. It
//! records triggered tasks and counts modifications, while the test drives the hardware side:
//! raising events, changing the radio state and writing received frames to the memory pointed by
//! the packet pointer. Time passes only when the driver waits, through a [`VirtualClock`].
//!
//! Clones of a [`MockHardware`] share the same registers, so a test keeps a clone to inspect the
//! hardware owned by the driver.

use super::ppi::traits::SignalRouting;
use super::ppi::{PpiChannel, RoutedEvent, RoutedTask};
use super::radio::traits::RadioPeripheral;
use super::radio::{CcaMode, HardwareEvent, Interrupts, RadioState, RadioTask, Shorts};
use super::settle::{Settle, VirtualClock};
use super::timer::traits::RadioTimer;
use super::timer::TimerShorts;
use std::cell::{RefCell, RefMut};
use std::rc::Rc;

/// Register values of the fake hardware
pub struct Registers {
    /// Radio shortcuts
    pub shorts: Shorts,
    /// Enabled interrupt sources
    pub interrupts: Interrupts,
    /// Generated, not cleared events
    pub events: Interrupts,
    /// Radio state
    pub state: RadioState,
    /// Memory used by the next transfer
    pub packet_ptr: *const u8,
    /// Frequency offset from 2400 MHz
    pub frequency: u8,
    /// Transmit power
    pub tx_power: i8,
    /// CCA configuration: mode, ED threshold, correlator threshold and limit
    pub cca: Option<(CcaMode, u8, u8, u8)>,
    /// CRC status of the last received frame
    pub crc_ok: bool,
    /// RSSI sample register
    pub rssi_sample: u8,
    /// Energy detection result register
    pub ed_sample: u8,
    /// Energy detection loop count
    pub ed_loop_count: u32,
    /// Bit counter compare value
    pub bcc: u32,
    /// Header-match unit pattern
    pub mhmu_pattern: u32,
    /// Header-match unit mask
    pub mhmu_mask: u32,
    /// Interrupt line enabled
    pub irq_enabled: bool,
    /// Radio configured for IEEE 802.15.4
    pub configured: bool,
    /// Triggered radio tasks in order
    pub tasks: Vec<RadioTask>,
    /// Configured routes
    pub routes: Vec<(PpiChannel, RoutedEvent, RoutedTask)>,
    /// Enabled routes
    pub enabled_routes: Vec<PpiChannel>,
    /// Time after clearing the EGU event at which the EGU event appears, `None` for never
    pub egu_fires_after_us: Option<u32>,
    egu_cleared_at: u64,
    /// Timer running
    pub timer_running: bool,
    /// Timer compare values
    pub timer_compare: [u32; 4],
    /// Value returned by timer captures
    pub timer_now: u32,
    /// Timer shortcuts
    pub timer_shorts: TimerShorts,
    /// Number of power cycles
    pub resets: usize,
    /// Number of modifications of any register
    pub writes: usize,
    clock: VirtualClock,
}

impl Registers {
    fn new() -> Self {
        Self {
            shorts: Shorts::NONE,
            interrupts: Interrupts::NONE,
            events: Interrupts::NONE,
            state: RadioState::Disabled,
            packet_ptr: core::ptr::null(),
            frequency: 0,
            tx_power: 0,
            cca: None,
            crc_ok: false,
            rssi_sample: 0,
            ed_sample: 0,
            ed_loop_count: 0,
            bcc: 0,
            mhmu_pattern: 0,
            mhmu_mask: 0,
            irq_enabled: false,
            configured: false,
            tasks: Vec::new(),
            routes: Vec::new(),
            enabled_routes: Vec::new(),
            egu_fires_after_us: None,
            egu_cleared_at: 0,
            timer_running: false,
            timer_compare: [0; 4],
            timer_now: 0,
            timer_shorts: TimerShorts::NONE,
            resets: 0,
            writes: 0,
            clock: VirtualClock::new(),
        }
    }

    /// Microseconds waited by the driver so far
    pub fn now_us(&self) -> u64 {
        self.clock.now_us()
    }
}

/// Fake hardware sharing its registers among clones
#[derive(Clone)]
pub struct MockHardware {
    regs: Rc<RefCell<Registers>>,
}

impl MockHardware {
    /// Create hardware in the reset state
    pub fn new() -> Self {
        Self {
            regs: Rc::new(RefCell::new(Registers::new())),
        }
    }

    /// Access the registers
    pub fn regs(&self) -> RefMut<'_, Registers> {
        self.regs.borrow_mut()
    }

    fn write(&self) -> RefMut<'_, Registers> {
        let mut regs = self.regs.borrow_mut();
        regs.writes += 1;
        regs
    }

    /// Generate `event`
    pub fn raise(&self, event: HardwareEvent) {
        let mut regs = self.regs.borrow_mut();
        regs.events = regs.events | event;
    }

    /// Number of modifications of any register
    pub fn writes(&self) -> usize {
        self.regs.borrow().writes
    }

    /// Take the list of the tasks triggered so far
    pub fn take_tasks(&self) -> Vec<RadioTask> {
        core::mem::take(&mut self.regs.borrow_mut().tasks)
    }

    /// Check if `channel` route is enabled
    pub fn route_enabled(&self, channel: PpiChannel) -> bool {
        self.regs.borrow().enabled_routes.contains(&channel)
    }

    /// Simulate reception of `frame` (PHR and PSDU) to the memory pointed by the packet pointer
    ///
    /// Sets the CRC status and generates the `MhrMatch` event if the header-match unit is enabled
    /// and the frame matches its pattern. Other events are left to the test.
    pub fn receive(&self, frame: &[u8], crc_ok: bool) {
        let mut regs = self.regs.borrow_mut();
        assert!(!regs.packet_ptr.is_null(), "No buffer for reception");

        // Safety: the driver keeps the memory valid while it is used by the radio
        unsafe {
            core::ptr::copy_nonoverlapping(frame.as_ptr(), regs.packet_ptr as *mut u8, frame.len())
        };
        regs.crc_ok = crc_ok;

        if regs.mhmu_mask != 0 && frame.len() >= 4 {
            let header = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);
            if (header ^ regs.mhmu_pattern) & regs.mhmu_mask == 0 {
                regs.events = regs.events | HardwareEvent::MhrMatch;
            }
        }
    }

    /// Content of the memory pointed by the packet pointer
    pub fn packet(&self, len: usize) -> Vec<u8> {
        let regs = self.regs.borrow();
        assert!(!regs.packet_ptr.is_null());
        // Safety: the driver keeps the memory valid while it is used by the radio
        unsafe { core::slice::from_raw_parts(regs.packet_ptr, len) }.to_vec()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioPeripheral for MockHardware {
    fn reset(&mut self) {
        let mut regs = self.regs.borrow_mut();
        let resets = regs.resets + 1;
        let writes = regs.writes + 1;
        let egu_fires_after_us = regs.egu_fires_after_us;
        let clock = core::mem::take(&mut regs.clock);
        let tasks = core::mem::take(&mut regs.tasks);
        *regs = Registers {
            resets,
            writes,
            egu_fires_after_us,
            clock,
            tasks,
            ..Registers::new()
        };
    }

    fn configure_802154(&mut self) {
        self.write().configured = true;
    }

    fn irq_init(&mut self) {
        self.write().irq_enabled = true;
    }

    fn irq_deinit(&mut self) {
        self.write().irq_enabled = false;
    }

    fn frequency_set(&mut self, offset_mhz: u8) {
        self.write().frequency = offset_mhz;
    }

    fn tx_power_set(&mut self, dbm: i8) {
        self.write().tx_power = dbm;
    }

    fn cca_configure(&mut self, mode: CcaMode, ed_threshold: u8, corr_threshold: u8, corr_limit: u8) {
        self.write().cca = Some((mode, ed_threshold, corr_threshold, corr_limit));
    }

    fn packet_ptr_set(&mut self, ptr: *const u8) {
        self.write().packet_ptr = ptr;
    }

    fn shorts_set(&mut self, shorts: Shorts) {
        self.write().shorts = shorts;
    }

    fn shorts_get(&self) -> Shorts {
        self.regs.borrow().shorts
    }

    fn task_trigger(&mut self, task: RadioTask) {
        let mut regs = self.write();
        if task == RadioTask::Start {
            regs.state = match regs.state {
                RadioState::RxIdle => RadioState::Rx,
                RadioState::TxIdle => RadioState::Tx,
                state => state,
            };
        }
        regs.tasks.push(task);
    }

    fn event_check(&self, event: HardwareEvent) -> bool {
        self.regs.borrow().events.contains(event)
    }

    fn event_clear(&mut self, event: HardwareEvent) {
        let mut regs = self.write();
        regs.events = regs.events.without(Interrupts::of(event));
    }

    fn interrupts_enable(&mut self, interrupts: Interrupts) {
        let mut regs = self.write();
        regs.interrupts = regs.interrupts | interrupts;
    }

    fn interrupts_disable(&mut self, interrupts: Interrupts) {
        let mut regs = self.write();
        regs.interrupts = regs.interrupts.without(interrupts);
    }

    fn interrupts_enabled(&self) -> Interrupts {
        self.regs.borrow().interrupts
    }

    fn state_get(&self) -> RadioState {
        self.regs.borrow().state
    }

    fn crc_ok(&self) -> bool {
        self.regs.borrow().crc_ok
    }

    fn rssi_sample(&self) -> u8 {
        self.regs.borrow().rssi_sample
    }

    fn ed_sample(&self) -> u8 {
        self.regs.borrow().ed_sample
    }

    fn ed_loop_count_set(&mut self, count: u32) {
        self.write().ed_loop_count = count;
    }

    fn bcc_set(&mut self, bits: u32) {
        self.write().bcc = bits;
    }

    fn bcc_get(&self) -> u32 {
        self.regs.borrow().bcc
    }

    fn mhmu_pattern_set(&mut self, pattern: u32) {
        self.write().mhmu_pattern = pattern;
    }

    fn mhmu_mask_set(&mut self, mask: u32) {
        self.write().mhmu_mask = mask;
    }
}

impl SignalRouting for MockHardware {
    fn ppi_connect(&mut self, channel: PpiChannel, event: RoutedEvent, task: RoutedTask) {
        let mut regs = self.write();
        regs.routes.retain(|(ch, _, _)| *ch != channel);
        regs.routes.push((channel, event, task));
    }

    fn ppi_fork(&mut self, _channel: PpiChannel, _task: Option<RoutedTask>) {
        self.write();
    }

    fn ppi_enable(&mut self, channel: PpiChannel) {
        let mut regs = self.write();
        if !regs.enabled_routes.contains(&channel) {
            regs.enabled_routes.push(channel);
        }
    }

    fn ppi_disable(&mut self, channel: PpiChannel) {
        self.write().enabled_routes.retain(|ch| *ch != channel);
    }

    fn ppi_group_include(&mut self, _channel: PpiChannel) {
        self.write();
    }

    fn ppi_group_remove(&mut self, _channel: PpiChannel) {
        self.write();
    }

    fn egu_event_clear(&mut self) {
        let mut regs = self.write();
        regs.egu_cleared_at = regs.clock.now_us();
    }

    fn egu_event_check(&self) -> bool {
        let regs = self.regs.borrow();
        regs.egu_fires_after_us.map_or(false, |after| {
            regs.clock.now_us() >= regs.egu_cleared_at + u64::from(after)
        })
    }
}

impl RadioTimer for MockHardware {
    fn timer_init(&mut self) {
        self.write().timer_running = false;
    }

    fn timer_start(&mut self) {
        self.write().timer_running = true;
    }

    fn timer_shutdown(&mut self) {
        self.write().timer_running = false;
    }

    fn timer_shorts_set(&mut self, shorts: TimerShorts) {
        self.write().timer_shorts = shorts;
    }

    fn timer_compare_set(&mut self, channel: u8, value_us: u32) {
        self.write().timer_compare[channel as usize] = value_us;
    }

    fn timer_capture(&mut self, _channel: u8) -> u32 {
        self.write().timer_now
    }
}

impl Settle for MockHardware {
    fn delay_us(&mut self, us: u32) {
        self.regs.borrow().clock.advance(us);
    }
}
