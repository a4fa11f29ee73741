//! Pool of buffers for received frames
//!
//! The radio receives frames directly to memory, so a free buffer has to be handed to the
//! hardware before a frame arrives. A buffer is owned by the driver while it is free, and it is
//! owned by the application from the moment the frame is delivered in a notification until the
//! application returns it with [`Driver::buffer_free`](crate::radio::Driver::buffer_free).

use crate::ieee802154::MAX_PACKET_SIZE;
use core::cell::UnsafeCell;
use core::fmt;
use core::ops::Deref;
use core::sync::atomic::{AtomicBool, Ordering};

/// Number of buffers in the pool
pub const NUM_RX_BUFFERS: usize = 16;

/// Size of a single buffer: PHR and the longest PSDU
pub const RX_BUFFER_SIZE: usize = MAX_PACKET_SIZE + 1;

struct RxBuffer {
    data: UnsafeCell<[u8; RX_BUFFER_SIZE]>,
    free: AtomicBool,
}

impl RxBuffer {
    const fn new() -> Self {
        Self {
            data: UnsafeCell::new([0; RX_BUFFER_SIZE]),
            free: AtomicBool::new(true),
        }
    }
}

/// Pool of receive buffers
///
/// # Examples
///
/// ```
/// use nrf_radio_802154::rx_buffer::RxBufferPool;
///
/// static RX_BUFFERS: RxBufferPool = RxBufferPool::new();
/// ```
pub struct RxBufferPool {
    buffers: [RxBuffer; NUM_RX_BUFFERS],
}

impl RxBufferPool {
    /// Create a pool with all buffers free
    pub const fn new() -> Self {
        Self {
            // using magic number because of https://github.com/JoshMcguigan/arr_macro/issues/2
            buffers: arr_macro::arr![RxBuffer::new(); 16],
        }
    }

    /// Find a free buffer to be used by the receiver
    pub(crate) fn free_find(&self) -> Option<usize> {
        self.buffers
            .iter()
            .position(|buffer| buffer.free.load(Ordering::Acquire))
    }

    pub(crate) fn is_free(&self, id: usize) -> bool {
        self.buffers[id].free.load(Ordering::Acquire)
    }

    /// Hand the buffer over to the application
    pub(crate) fn take(&self, id: usize) -> RxFrame<'_> {
        let was_free = self.buffers[id].free.swap(false, Ordering::AcqRel);
        assert!(was_free, "Delivering a buffer which is not owned by the driver");
        RxFrame { pool: self, id }
    }

    /// Return the buffer to the driver
    pub(crate) fn release(&self, frame: RxFrame) -> usize {
        let id = frame.id;
        let was_free = self.buffers[id].free.swap(true, Ordering::AcqRel);
        assert!(!was_free, "Releasing a buffer which is already free");
        id
    }

    /// Pointer passed to the radio to receive a frame into the buffer
    pub(crate) fn ptr(&self, id: usize) -> *mut u8 {
        self.buffers[id].data.get() as *mut u8
    }

    /// Content of the buffer: PHR followed by the PSDU
    pub(crate) fn data(&self, id: usize) -> &[u8; RX_BUFFER_SIZE] {
        // Safety: the radio writes to the buffer only while it is free, and the driver reads it
        // only inside its critical section or after the buffer is handed over
        unsafe { &*self.buffers[id].data.get() }
    }

    /// Number of buffers owned by the driver
    pub fn free_count(&self) -> usize {
        self.buffers
            .iter()
            .filter(|buffer| buffer.free.load(Ordering::Relaxed))
            .count()
    }
}

impl Default for RxBufferPool {
    fn default() -> Self {
        Self::new()
    }
}

// Safety: the free flag is atomic and the ownership protocol above guarantees that the content of
// a buffer is accessed by one party at a time
unsafe impl Sync for RxBufferPool {}

/// Frame received by the radio, owned by the application
///
/// Dereferences to the PHR followed by the PSDU. The buffer must be returned to the driver with
/// [`Driver::buffer_free`](crate::radio::Driver::buffer_free), otherwise the pool shrinks.
#[must_use = "received frames must be returned with Driver::buffer_free"]
pub struct RxFrame<'pool> {
    pool: &'pool RxBufferPool,
    id: usize,
}

impl RxFrame<'_> {
    /// PSDU of the frame, without the PHR
    pub fn psdu(&self) -> &[u8] {
        &self[1..]
    }
}

impl Deref for RxFrame<'_> {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        let data = self.pool.data(self.id);
        let len = (data[0] as usize).min(MAX_PACKET_SIZE);
        &data[..=len]
    }
}

impl fmt::Debug for RxFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RxFrame")
            .field("id", &self.id)
            .field("data", &self.deref())
            .finish()
    }
}
