//! Events driving an `implement` run
//!
//! Child output, the elapsed-time ticker, terminal resizes and signals are
//! produced on helper threads and funnelled through one channel, so the
//! thread draining it is the only one touching the terminal.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Everything the orchestration loop reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A chunk of the agent's stdout
    Stdout(String),
    /// A chunk of the agent's stderr
    Stderr(String),
    /// The agent exited; both streams are fully drained
    Exited(i32),
    /// One tick of the elapsed-time timer
    Tick,
    /// The terminal was resized
    Resize,
    /// SIGINT or SIGTERM was delivered to this process
    Signal(i32),
}

/// Sends [`Event::Tick`] at a fixed interval until dropped
pub struct Ticker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Starts ticking into `events`
    pub fn start(interval: Duration, events: Sender<Event>) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if events.send(Event::Tick).is_err() {
                        break;
                    }
                }
                // Stop requested or the ticker was dropped
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Stops the ticker and waits for its thread; no tick is sent afterwards
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
