//! Blocking pauses between batches and polls.

use std::thread;
use std::time::Duration;

/// Waits between consecutive operations.
pub trait Pacer {
    fn pause(&mut self, period: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, period: Duration) {
        if !period.is_zero() {
            thread::sleep(period);
        }
    }
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn pause(&mut self, period: Duration) {
        (**self).pause(period);
    }
}
