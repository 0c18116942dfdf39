//! Sticky footer scenarios
//!
//! Drives `StickyFooter` over in-memory terminals and checks the exact
//! escape sequences it emits across start, redraw, resize, signals and
//! cleanup.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::mpsc;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use eightx::domain::{StepState, StepStatus};
use eightx::event::Event;
use eightx::footer::{render_step_progress, FooterError, MemoryTerminal, StickyFooter, Terminal};

/// Only one footer may be active per process, so scenarios run one at a time
fn serial() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

fn lines(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("line{}", i)).collect()
}

const RESET: &str = "\x1b[r";

// =============================================================================
// Resize
// =============================================================================

#[test]
fn resize_shrinks_scroll_region_and_redraws() {
    let _guard = serial();
    let mut footer = StickyFooter::new(MemoryTerminal::tty(80, 24));
    footer.start(6).unwrap();
    assert_eq!(footer.scroll_bottom(), Some(18));

    footer.update(lines(6));
    footer.terminal_mut().clear();

    footer.terminal_mut().resize(80, 10);
    footer.handle_resize();

    assert_eq!(footer.scroll_bottom(), Some(4));
    let out = footer.terminal().stdout_text();
    assert!(out.starts_with("\x1b[1;4r\x1b[4;1H"));
    assert!(out.contains("\x1b[?2026h\x1b7"));
    assert!(out.contains("\x1b[5;1H\x1b[2Kline0"));
    assert!(out.contains("\x1b[10;1H\x1b[2Kline5"));
    assert!(out.ends_with("\x1b8\x1b[?2026l"));
}

#[test]
fn too_small_terminal_is_left_alone_until_it_grows() {
    let _guard = serial();
    let mut footer = StickyFooter::new(MemoryTerminal::tty(80, 24));
    footer.start(6).unwrap();
    footer.update(lines(6));
    footer.terminal_mut().clear();

    footer.terminal_mut().resize(80, 5);
    footer.handle_resize();
    footer.update(vec!["newer".to_string()]);

    assert_eq!(footer.scroll_bottom(), None);
    assert!(footer.is_active());
    assert_eq!(footer.terminal().stdout_text(), "");

    footer.terminal_mut().resize(80, 12);
    footer.handle_resize();

    let out = footer.terminal().stdout_text();
    assert!(out.starts_with("\x1b[1;6r\x1b[6;1H"));
    assert!(out.contains("\x1b[7;1H\x1b[2Knewer\x1b[8;1H\x1b[2K"));
}

#[test]
fn exactly_fitting_terminal_keeps_one_scroll_row() {
    let _guard = serial();
    let mut footer = StickyFooter::new(MemoryTerminal::tty(80, 7));
    footer.start(6).unwrap();

    assert_eq!(footer.scroll_bottom(), Some(1));
    assert!(footer.terminal().stdout_text().contains("\x1b[1;1r\x1b[1;1H"));
}

// =============================================================================
// Pass-through
// =============================================================================

#[test]
fn non_tty_passes_writes_through() {
    let _guard = serial();
    let mut footer = StickyFooter::new(MemoryTerminal::piped());
    footer.start(4).unwrap();

    assert!(!footer.is_active());

    footer.update(lines(4));
    footer.handle_resize();
    footer.write_output("plain out\n");
    footer.write_error("plain err\n");
    footer.cleanup();

    assert_eq!(footer.terminal().stdout_text(), "plain out\n");
    assert_eq!(footer.terminal().stderr_text(), "plain err\n");
    assert!(footer.last_content().is_empty());
}

#[test]
fn non_tty_footer_does_not_claim_the_terminal() {
    let _guard = serial();
    let mut piped = StickyFooter::new(MemoryTerminal::piped());
    piped.start(4).unwrap();

    let mut tty = StickyFooter::new(MemoryTerminal::tty(80, 24));
    tty.start(4).unwrap();
    assert!(tty.is_active());
}

// =============================================================================
// Cleanup
// =============================================================================

#[test]
fn cleanup_is_idempotent() {
    let _guard = serial();
    let mut footer = StickyFooter::new(MemoryTerminal::tty(80, 24));
    footer.start(3).unwrap();
    footer.terminal_mut().clear();

    footer.cleanup();
    let once = footer.terminal().stdout_text();
    footer.cleanup();
    let twice = footer.terminal().stdout_text();

    assert_eq!(once, format!("{}\x1b[24;1H\x1b[?25h\n", RESET));
    assert_eq!(once, twice);
    assert!(!footer.is_active());
}

#[test]
fn writes_after_cleanup_use_native_streams() {
    let _guard = serial();
    let mut footer = StickyFooter::new(MemoryTerminal::tty(80, 24));
    footer.start(3).unwrap();
    footer.cleanup();
    footer.terminal_mut().clear();

    footer.update(lines(3));
    footer.write_error("late\n");

    assert_eq!(footer.terminal().stdout_text(), "");
    assert_eq!(footer.terminal().stderr_text(), "late\n");
}

/// Terminal whose output outlives the footer that owns it
#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct SharedTerminal {
    out: SharedBuf,
    err: io::Sink,
}

impl Terminal for SharedTerminal {
    fn is_tty(&self) -> bool {
        true
    }

    fn size(&self) -> (u16, u16) {
        (40, 12)
    }

    fn stdout(&mut self) -> &mut dyn Write {
        &mut self.out
    }

    fn stderr(&mut self) -> &mut dyn Write {
        &mut self.err
    }
}

#[test]
fn dropping_an_active_footer_restores_the_terminal() {
    let _guard = serial();
    let out = SharedBuf::default();
    {
        let mut footer = StickyFooter::new(SharedTerminal {
            out: out.clone(),
            err: io::sink(),
        });
        footer.start(2).unwrap();
    }

    let written = String::from_utf8(out.0.borrow().clone()).unwrap();
    assert!(written.ends_with("\x1b[r\x1b[12;1H\x1b[?25h\n"));
    assert_eq!(written.matches(RESET).count(), 1);
}

// =============================================================================
// Single active session
// =============================================================================

#[test]
fn only_one_footer_at_a_time() {
    let _guard = serial();
    let mut first = StickyFooter::new(MemoryTerminal::tty(80, 24));
    first.start(2).unwrap();

    let mut second = StickyFooter::new(MemoryTerminal::tty(80, 24));
    assert!(matches!(second.start(2), Err(FooterError::AlreadyActive)));
    assert_eq!(second.terminal().stdout_text(), "");

    drop(first);
    second.start(2).unwrap();
}

// =============================================================================
// Signals
// =============================================================================

// SIGINT ends the process once the terminal is restored, so each of these
// runs alone in a fresh copy of this test binary.

#[cfg(unix)]
const ISOLATED: &str = "EIGHTX_ISOLATED_SIGNAL_TEST";

/// Runs the ignored test `name` in its own process and returns its signal and
/// stdout
#[cfg(unix)]
fn run_isolated(name: &str) -> (Option<i32>, String) {
    use std::os::unix::process::ExitStatusExt;
    use std::process::Command;

    let output = Command::new(std::env::current_exe().unwrap())
        .args([name, "--exact", "--ignored", "--nocapture", "--test-threads=1"])
        .env(ISOLATED, "1")
        .output()
        .unwrap();
    (
        output.status.signal(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
    )
}

/// A real terminal stand-in that the parent process can read back
#[cfg(unix)]
struct StdoutTty {
    out: io::Stdout,
    err: io::Stderr,
}

#[cfg(unix)]
impl StdoutTty {
    fn new() -> Self {
        Self {
            out: io::stdout(),
            err: io::stderr(),
        }
    }
}

#[cfg(unix)]
impl Terminal for StdoutTty {
    fn is_tty(&self) -> bool {
        true
    }

    fn size(&self) -> (u16, u16) {
        (80, 24)
    }

    fn stdout(&mut self) -> &mut dyn Write {
        &mut self.out
    }

    fn stderr(&mut self) -> &mut dyn Write {
        &mut self.err
    }
}

#[cfg(unix)]
#[test]
fn sigint_event_restores_terminal_then_terminates() {
    use signal_hook::consts::signal::SIGINT;

    let (signal, out) = run_isolated("isolated_sigint_through_event");
    assert_eq!(signal, Some(SIGINT));
    assert_eq!(out.matches("\x1b[r\x1b[24;1H\x1b[?25h\n").count(), 1);
}

#[cfg(unix)]
#[test]
fn sigint_still_queued_at_cleanup_is_delivered() {
    use signal_hook::consts::signal::SIGINT;

    let (signal, out) = run_isolated("isolated_sigint_unread_at_cleanup");
    assert_eq!(signal, Some(SIGINT));
    assert_eq!(out.matches("\x1b[r\x1b[24;1H\x1b[?25h\n").count(), 1);
}

#[cfg(unix)]
#[test]
fn sigint_after_cleanup_has_default_behaviour() {
    use signal_hook::consts::signal::SIGINT;

    let (signal, _) = run_isolated("isolated_sigint_after_cleanup");
    assert_eq!(signal, Some(SIGINT));
}

#[cfg(unix)]
#[test]
#[ignore = "run in its own process by sigint_event_restores_terminal_then_terminates"]
fn isolated_sigint_through_event() {
    use signal_hook::consts::signal::SIGINT;

    if std::env::var_os(ISOLATED).is_none() {
        return;
    }
    let (tx, rx) = mpsc::channel();
    let mut footer = StickyFooter::with_events(StdoutTty::new(), tx);
    footer.start(3).unwrap();

    signal_hook::low_level::raise(SIGINT).unwrap();
    let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(event, Event::Signal(SIGINT));

    footer.on_signal(SIGINT);
    std::process::exit(0);
}

#[cfg(unix)]
#[test]
#[ignore = "run in its own process by sigint_still_queued_at_cleanup_is_delivered"]
fn isolated_sigint_unread_at_cleanup() {
    use signal_hook::consts::signal::SIGINT;

    if std::env::var_os(ISOLATED).is_none() {
        return;
    }
    let (tx, _rx) = mpsc::channel();
    let mut footer = StickyFooter::with_events(StdoutTty::new(), tx);
    footer.start(3).unwrap();

    signal_hook::low_level::raise(SIGINT).unwrap();
    assert_eq!(footer.caught_signal(), Some(SIGINT));

    footer.cleanup();
    std::process::exit(0);
}

#[cfg(unix)]
#[test]
#[ignore = "run in its own process by sigint_after_cleanup_has_default_behaviour"]
fn isolated_sigint_after_cleanup() {
    use signal_hook::consts::signal::SIGINT;

    if std::env::var_os(ISOLATED).is_none() {
        return;
    }
    let (tx, _rx) = mpsc::channel();
    let mut footer = StickyFooter::with_events(StdoutTty::new(), tx);
    footer.start(3).unwrap();
    footer.cleanup();

    signal_hook::low_level::raise(SIGINT).unwrap();
    std::process::exit(0);
}

#[cfg(unix)]
#[test]
fn sigwinch_becomes_a_resize_event() {
    use signal_hook::consts::signal::SIGWINCH;

    let _guard = serial();
    let (tx, rx) = mpsc::channel();
    let mut footer = StickyFooter::with_events(MemoryTerminal::tty(80, 24), tx);
    footer.start(3).unwrap();

    signal_hook::low_level::raise(SIGWINCH).unwrap();
    let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(event, Event::Resize);
}

// =============================================================================
// Step progress through the footer
// =============================================================================

#[test]
fn three_step_progress_fills_the_footer() {
    let _guard = serial();
    let steps = vec![
        StepState {
            title: "Create schema".to_string(),
            stage_title: None,
            status: StepStatus::Done,
            duration: Some("12s".to_string()),
        },
        StepState {
            title: "Write queries".to_string(),
            stage_title: None,
            status: StepStatus::Running,
            duration: Some("4s".to_string()),
        },
        StepState::new("Add tests"),
    ];

    let mut footer = StickyFooter::new(MemoryTerminal::tty(80, 24));
    footer.start(4).unwrap();
    footer.terminal_mut().clear();

    let rendered = render_step_progress(&steps, footer.columns());
    assert_eq!(rendered.len(), 4);
    footer.update(rendered.clone());

    let out = footer.terminal().stdout_text();
    for (row, line) in (21..=24).zip(&rendered) {
        assert!(out.contains(&format!("\x1b[{};1H\x1b[2K{}", row, line)));
    }
}
