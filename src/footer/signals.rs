//! Signal interception while the footer owns the terminal
//!
//! SIGINT and SIGTERM are turned into [`Event::Signal`] and SIGWINCH into
//! [`Event::Resize`], so the thread that owns the footer can restore the
//! terminal before the process goes away. A terminating signal is also
//! recorded as it arrives, so it is still honoured when the footer is torn
//! down before the event is read. Once the hooks are removed both signals take
//! their default action again.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};

use signal_hook::consts::signal::{SIGINT, SIGTERM, SIGWINCH};
use signal_hook::flag;
use signal_hook::iterator::{Handle, Signals};
use signal_hook::low_level;
use signal_hook::SigId;

use crate::event::Event;

/// Signals forwarded while the footer is active
pub const FORWARDED: [i32; 3] = [SIGINT, SIGTERM, SIGWINCH];

/// Forwarded signals that end the run
const TERMINATING: [i32; 2] = [SIGINT, SIGTERM];

/// Whether SIGINT/SIGTERM should run their default action
///
/// Registered once per process. signal-hook never hands the disposition back
/// to the OS, so this flag stands in for it outside a footer session.
static DEFAULT_ACTION: OnceLock<Arc<AtomicBool>> = OnceLock::new();

fn default_action() -> io::Result<&'static Arc<AtomicBool>> {
    if let Some(enabled) = DEFAULT_ACTION.get() {
        return Ok(enabled);
    }
    let enabled = Arc::new(AtomicBool::new(true));
    for signal in TERMINATING {
        flag::register_conditional_default(signal, Arc::clone(&enabled))?;
    }
    Ok(DEFAULT_ACTION.get_or_init(|| enabled))
}

/// Registered signal handlers feeding an event channel
pub struct SignalHooks {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
    caught: Arc<AtomicUsize>,
    flag_ids: Vec<SigId>,
    default_action: &'static Arc<AtomicBool>,
}

impl SignalHooks {
    /// Registers the handlers and starts forwarding
    pub fn install(events: Sender<Event>) -> io::Result<Self> {
        let default_action = default_action()?;
        default_action.store(false, Ordering::SeqCst);

        let caught = Arc::new(AtomicUsize::new(0));
        let mut flag_ids = Vec::with_capacity(TERMINATING.len());
        for signal in TERMINATING {
            // Signal numbers are positive
            let id = flag::register_usize(signal, Arc::clone(&caught), signal as usize);
            match id {
                Ok(id) => flag_ids.push(id),
                Err(e) => {
                    release(&flag_ids, default_action);
                    return Err(e);
                }
            }
        }

        let mut signals = match Signals::new(FORWARDED) {
            Ok(signals) => signals,
            Err(e) => {
                release(&flag_ids, default_action);
                return Err(e);
            }
        };
        let handle = signals.handle();

        let thread = thread::spawn(move || {
            for signal in signals.forever() {
                let event = if signal == SIGWINCH {
                    Event::Resize
                } else {
                    Event::Signal(signal)
                };
                if events.send(event).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            handle,
            thread: Some(thread),
            caught,
            flag_ids,
            default_action,
        })
    }

    /// Last terminating signal received since install
    pub fn caught(&self) -> Option<i32> {
        match self.caught.load(Ordering::SeqCst) {
            0 => None,
            signal => i32::try_from(signal).ok(),
        }
    }

    /// Stops forwarding and deregisters the handlers
    ///
    /// Returns the terminating signal received while installed, if any.
    pub fn remove(&mut self) -> Option<i32> {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        release(&self.flag_ids, self.default_action);
        self.flag_ids.clear();
        self.caught()
    }
}

fn release(flag_ids: &[SigId], default_action: &AtomicBool) {
    for id in flag_ids {
        low_level::unregister(*id);
    }
    default_action.store(true, Ordering::SeqCst);
}

impl Drop for SignalHooks {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Delivers `signal` again with its default disposition
///
/// For SIGINT and SIGTERM this terminates the process, so callers only see
/// it return when the default action could not be emulated.
pub fn redeliver(signal: i32) -> io::Result<()> {
    signal_hook::low_level::emulate_default_handler(signal)
}

/// Conventional shell exit status for death by `signal`
pub fn exit_code_for(signal: i32) -> i32 {
    128 + signal
}
