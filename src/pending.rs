use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use crate::error::Error;

/// Receiving half of one in-flight engine request.
///
/// The sending half lives inside the line hook installed for the request and
/// is consumed on first resolution, so a result is delivered at most once.
/// If that hook is dropped before a terminal line arrives (the facade was
/// torn down, or a later request replaced a completed hook), waiting ends in
/// [`Error::Disconnected`] instead of hanging.
#[derive(Debug)]
pub struct Pending<T> {
    engine: &'static str,
    rx: mpsc::Receiver<T>,
}

impl<T> Pending<T> {
    pub(crate) fn new(engine: &'static str, rx: mpsc::Receiver<T>) -> Self {
        Self { engine, rx }
    }

    /// Block until the engine's terminal line resolves this request. A
    /// stalled engine blocks the caller indefinitely; use [`wait_timeout`]
    /// when that is not acceptable.
    ///
    /// [`wait_timeout`]: Pending::wait_timeout
    pub fn wait(self) -> Result<T, Error> {
        self.rx.recv().map_err(|_| Error::Disconnected { engine: self.engine })
    }

    /// Block for at most `timeout`. Timing out only releases the caller;
    /// the request stays pending on the engine side.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<T, Error> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => Error::Timeout { engine: self.engine },
            RecvTimeoutError::Disconnected => Error::Disconnected { engine: self.engine },
        })
    }

    /// Non-blocking probe; `None` while the request is still in flight or
    /// already abandoned.
    pub fn poll(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Engine this request was issued on.
    pub fn engine(&self) -> &'static str {
        self.engine
    }
}
