use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

type Subscriber = Box<dyn FnOnce() + Send>;

/// Closed flag shared by every owner of one decoded image.
///
/// Frames cut from the same image each hold the same status. The first `close` flips the flag
/// and runs every subscriber exactly once; later calls are no-ops.
pub struct CloseStatus {
    closed: AtomicBool,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl Default for CloseStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl CloseStatus {
    /// Open status with no subscribers.
    pub fn new() -> Self {
        Self {
            closed: AtomicBool::new(false),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Return `true` once any owner has closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Run `f` when the status closes, or immediately if it already has.
    pub fn subscribe(&self, f: impl FnOnce() + Send + 'static) {
        let mut subscribers = self.subscribers.lock();
        if self.is_closed() {
            drop(subscribers);
            f();
            return;
        }
        subscribers.push(Box::new(f));
    }

    /// Close and notify subscribers. Returns `true` only for the call that actually closed.
    pub fn close(&self) -> bool {
        let subscribers = {
            let mut guard = self.subscribers.lock();
            if self.closed.swap(true, Ordering::AcqRel) {
                return false;
            }
            std::mem::take(&mut *guard)
        };
        for s in subscribers {
            s();
        }
        true
    }
}

impl std::fmt::Debug for CloseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloseStatus")
            .field("closed", &self.is_closed())
            .field("subscribers", &self.subscribers.lock().len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/close.rs"]
mod tests;
