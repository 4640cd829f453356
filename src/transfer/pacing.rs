//! Packet pacing and cancellation.
//!
//! The delay between packets is the only suspension point of a transfer.
//! It goes through the `Pacer` trait so tests can run transfers without
//! sleeping, and a shared `CancelToken` lets the driver stop a transfer at
//! the next packet boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default simulated latency between two packets
pub const DEFAULT_PACKET_DELAY: Duration = Duration::from_millis(100);

/// Waits out the simulated latency between packets
pub trait Pacer {
    fn pause(&mut self, delay: Duration);
}

/// Sleeps the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, delay: Duration) {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

/// Never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Pacer for NoDelay {
    fn pause(&mut self, _delay: Duration) {}
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn pause(&mut self, delay: Duration) {
        (**self).pause(delay);
    }
}

/// Cancellation flag shared between a transfer and whoever drives it.
///
/// Once cancelled the token stays cancelled until `reset` is called, so
/// every later transfer using it stops before its first packet. The engine
/// also marks the token while packets are flowing, which lets a signal
/// handler tell an interrupted transfer apart from an idle prompt.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// True while a transfer using this token is streaming packets
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Cancel only if a transfer is streaming; returns whether it was
    pub fn cancel_running(&self) -> bool {
        if self.is_running() {
            self.cancel();
            true
        } else {
            false
        }
    }

    /// Mark the token as running until the returned guard is dropped
    pub(crate) fn start_running(&self) -> RunningGuard {
        self.running.store(true, Ordering::SeqCst);
        RunningGuard {
            running: Arc::clone(&self.running),
        }
    }
}

/// Clears the running mark of a `CancelToken` on drop
#[derive(Debug)]
pub(crate) struct RunningGuard {
    running: Arc<AtomicBool>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
