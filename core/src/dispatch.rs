//! The caller-owned callback queue that background operations report to.
//!
//! # Design
//! Handlers must run on the caller's thread, not on the background thread
//! that performed the HTTP call. `Dispatcher` makes that marshaling
//! explicit: background operations post boxed callbacks through a
//! `DispatchHandle`, and the thread that owns the `Dispatcher` drains them
//! with `run_pending`. Each operation posts a single callback covering its
//! progress and terminal notifications, so ordering within one operation
//! is preserved and the terminal callback fires exactly once.
//!
//! Dropping the `Dispatcher` disconnects the queue; posts from still-live
//! background threads are silently discarded, mirroring results that
//! arrive after the caller has gone away.

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Single-consumer callback queue. Owned by the thread that wants to
/// receive handler callbacks.
pub struct Dispatcher {
    tx: Sender<Callback>,
    rx: Receiver<Callback>,
}

/// Cloneable producer side of a `Dispatcher`, held by `Session` and its
/// background threads.
#[derive(Clone)]
pub struct DispatchHandle {
    tx: Sender<Callback>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle {
            tx: self.tx.clone(),
        }
    }

    /// Run every callback currently queued and return how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(callback) = self.rx.try_recv() {
            callback();
            ran += 1;
        }
        ran
    }

    /// Block up to `timeout` for one callback and run it. Returns whether
    /// a callback ran.
    pub fn run_one(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(callback) => {
                callback();
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchHandle {
    /// Queue a callback for the dispatcher's thread. A post after the
    /// dispatcher is gone is a no-op.
    pub fn post(&self, callback: Box<dyn FnOnce() + Send + 'static>) {
        let _ = self.tx.send(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn callbacks_run_in_post_order() {
        let dispatcher = Dispatcher::new();
        let handle = dispatcher.handle();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let seen = Arc::clone(&seen);
            handle.post(Box::new(move || seen.lock().unwrap().push(i)));
        }

        assert_eq!(dispatcher.run_pending(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(dispatcher.run_pending(), 0);
    }

    #[test]
    fn run_one_waits_for_a_background_post() {
        let dispatcher = Dispatcher::new();
        let handle = dispatcher.handle();
        let seen = Arc::new(Mutex::new(false));

        let flag = Arc::clone(&seen);
        std::thread::spawn(move || {
            handle.post(Box::new(move || *flag.lock().unwrap() = true));
        });

        assert!(dispatcher.run_one(Duration::from_secs(5)));
        assert!(*seen.lock().unwrap());
    }

    #[test]
    fn post_after_drop_is_a_no_op() {
        let dispatcher = Dispatcher::new();
        let handle = dispatcher.handle();
        drop(dispatcher);
        handle.post(Box::new(|| panic!("must not run")));
    }
}
