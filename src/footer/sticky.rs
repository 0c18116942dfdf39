//! Sticky footer: a fixed status area below a scrolling region
//!
//! Lifecycle is `Inactive → Active → CleanedUp`. Once cleaned up a footer
//! can't be restarted; build a new one. Only one footer may be active per
//! process at a time.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

use crossterm::cursor::{MoveTo, RestorePosition, SavePosition, Show};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate};
use thiserror::Error;

use super::ansi::{ResetScrollRegion, SetScrollRegion};
use super::signals::{self, SignalHooks};
use super::terminal::{StdTerminal, Terminal};
use crate::event::Event;

static FOOTER_CLAIMED: AtomicBool = AtomicBool::new(false);

#[derive(Error, Debug)]
pub enum FooterError {
    #[error("Another progress footer is already active")]
    AlreadyActive,

    #[error("Footer was already cleaned up")]
    CleanedUp,

    #[error("Failed to install signal handlers: {0}")]
    Hooks(#[from] io::Error),
}

/// Process-wide right to own the terminal, released on drop
#[derive(Debug)]
struct SessionClaim;

impl SessionClaim {
    fn acquire() -> Option<Self> {
        FOOTER_CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SessionClaim)
    }
}

impl Drop for SessionClaim {
    fn drop(&mut self) {
        FOOTER_CLAIMED.store(false, Ordering::Release);
    }
}

/// Reserves the bottom rows of the terminal for a status footer
///
/// Output written through [`write_output`](Self::write_output) and
/// [`write_error`](Self::write_error) scrolls above the footer. When the
/// output stream is not a terminal the footer never activates and writes pass
/// straight through. Dropping the footer restores the terminal.
pub struct StickyFooter<T: Terminal = StdTerminal> {
    terminal: T,
    line_count: u16,
    active: bool,
    cleaned_up: bool,
    last_content: Vec<String>,
    events: Option<Sender<Event>>,
    hooks: Option<SignalHooks>,
    claim: Option<SessionClaim>,
}

impl StickyFooter<StdTerminal> {
    /// Footer on the process's stdout, forwarding signals into `events`
    pub fn stdio(events: Sender<Event>) -> Self {
        Self::with_events(StdTerminal::new(), events)
    }
}

impl<T: Terminal> StickyFooter<T> {
    /// Footer without signal interception
    pub fn new(terminal: T) -> Self {
        Self {
            terminal,
            line_count: 0,
            active: false,
            cleaned_up: false,
            last_content: Vec::new(),
            events: None,
            hooks: None,
            claim: None,
        }
    }

    /// Footer that, once started, turns SIGINT/SIGTERM into
    /// [`Event::Signal`] and SIGWINCH into [`Event::Resize`] on `events`
    pub fn with_events(terminal: T, events: Sender<Event>) -> Self {
        let mut footer = Self::new(terminal);
        footer.events = Some(events);
        footer
    }

    /// Reserves `line_count` rows at the bottom of the terminal
    ///
    /// On a non-terminal stream this is a no-op. On a terminal too short to
    /// fit the footer the session is still active but nothing is drawn until
    /// a resize makes room.
    pub fn start(&mut self, line_count: u16) -> Result<(), FooterError> {
        if self.cleaned_up {
            return Err(FooterError::CleanedUp);
        }
        if self.active {
            return Err(FooterError::AlreadyActive);
        }
        if !self.terminal.is_tty() {
            return Ok(());
        }

        let claim = SessionClaim::acquire().ok_or(FooterError::AlreadyActive)?;
        let hooks = match &self.events {
            Some(events) => Some(SignalHooks::install(events.clone())?),
            None => None,
        };

        self.claim = Some(claim);
        self.hooks = hooks;
        self.line_count = line_count;
        self.active = true;

        let Some(scroll_bottom) = self.scroll_bottom() else {
            return Ok(());
        };

        let rows = self.rows();
        let mut buf = Vec::new();
        let _ = queue!(buf, MoveTo(0, rows - 1));
        for _ in 0..line_count {
            let _ = queue!(buf, Print("\n"));
        }
        let _ = queue!(
            buf,
            SetScrollRegion::new(1, scroll_bottom),
            MoveTo(0, scroll_bottom - 1)
        );
        self.emit(&buf);

        Ok(())
    }

    /// Replaces the footer content and redraws it
    pub fn update(&mut self, lines: Vec<String>) {
        if !self.active {
            return;
        }
        self.last_content = lines;
        self.render();
    }

    /// Writes child stdout into the scrolling region
    pub fn write_output(&mut self, text: &str) {
        write_text(self.terminal.stdout(), text);
    }

    /// Writes child stderr; merged into stdout while the footer is active
    pub fn write_error(&mut self, text: &str) {
        let out = if self.active {
            self.terminal.stdout()
        } else {
            self.terminal.stderr()
        };
        write_text(out, text);
    }

    /// Re-fits the scroll region and footer to the current terminal size
    pub fn handle_resize(&mut self) {
        if !self.active {
            return;
        }
        let Some(scroll_bottom) = self.scroll_bottom() else {
            return;
        };

        let mut buf = Vec::new();
        let _ = queue!(
            buf,
            SetScrollRegion::new(1, scroll_bottom),
            MoveTo(0, scroll_bottom - 1)
        );
        self.emit(&buf);

        if !self.last_content.is_empty() {
            self.render();
        }
    }

    /// Hands the whole terminal back
    ///
    /// Resets the scroll region, parks the cursor on the last row, shows it
    /// and ends with a newline. Safe to call any number of times; only the
    /// first call does anything. A SIGINT or SIGTERM that arrived while the
    /// footer was active is delivered again once the terminal is restored.
    pub fn cleanup(&mut self) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;
        let was_active = std::mem::replace(&mut self.active, false);

        if was_active && self.terminal.is_tty() {
            let rows = self.rows();
            let mut buf = Vec::new();
            let _ = queue!(buf, ResetScrollRegion, MoveTo(0, rows - 1), Show, Print("\n"));
            self.emit(&buf);
        }

        let caught = self.hooks.take().and_then(|mut hooks| hooks.remove());
        self.claim = None;

        if let Some(signal) = caught {
            let _ = signals::redeliver(signal);
        }
    }

    /// Restores the terminal, then lets `signal` take its default course
    ///
    /// Returns the exit code to use if the process is still alive afterwards.
    pub fn on_signal(&mut self, signal: i32) -> i32 {
        self.cleanup();
        let _ = signals::redeliver(signal);
        signals::exit_code_for(signal)
    }

    /// SIGINT or SIGTERM received while active, whether or not its event
    /// has been read yet
    pub fn caught_signal(&self) -> Option<i32> {
        self.hooks.as_ref().and_then(SignalHooks::caught)
    }

    pub fn columns(&self) -> u16 {
        self.terminal.size().0
    }

    pub fn rows(&self) -> u16 {
        self.terminal.size().1
    }

    /// Last row of the scrolling region, `None` when the footer doesn't fit
    pub fn scroll_bottom(&self) -> Option<u16> {
        self.rows()
            .checked_sub(self.line_count)
            .filter(|bottom| *bottom >= 1)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn line_count(&self) -> u16 {
        self.line_count
    }

    pub fn last_content(&self) -> &[String] {
        &self.last_content
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    fn render(&mut self) {
        let Some(scroll_bottom) = self.scroll_bottom() else {
            return;
        };
        let footer_top = scroll_bottom; // 0-based row of the first footer line

        let mut buf = Vec::new();
        let _ = queue!(buf, BeginSynchronizedUpdate, SavePosition);
        for row in 0..self.line_count {
            let _ = queue!(buf, MoveTo(0, footer_top + row), Clear(ClearType::CurrentLine));
            if let Some(line) = self.last_content.get(usize::from(row)) {
                let _ = queue!(buf, Print(line));
            }
        }
        let _ = queue!(buf, RestorePosition, EndSynchronizedUpdate);
        self.emit(&buf);
    }

    fn emit(&mut self, bytes: &[u8]) {
        let out = self.terminal.stdout();
        let _ = out.write_all(bytes).and_then(|_| out.flush());
    }
}

impl<T: Terminal> Drop for StickyFooter<T> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn write_text(out: &mut dyn Write, text: &str) {
    let _ = out.write_all(text.as_bytes()).and_then(|_| out.flush());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footer::{test_lock as serial, MemoryTerminal};

    #[test]
    fn start_reserves_rows_and_sets_region() {
        let _guard = serial();
        let mut footer = StickyFooter::new(MemoryTerminal::tty(80, 24));
        footer.start(4).unwrap();

        assert!(footer.is_active());
        assert_eq!(footer.scroll_bottom(), Some(20));
        assert_eq!(
            footer.terminal().stdout_text(),
            "\x1b[24;1H\n\n\n\n\x1b[1;20r\x1b[20;1H"
        );
    }

    #[test]
    fn update_redraws_each_footer_row() {
        let _guard = serial();
        let mut footer = StickyFooter::new(MemoryTerminal::tty(80, 10));
        footer.start(2).unwrap();
        footer.terminal_mut().clear();

        footer.update(vec!["sep".to_string(), "step".to_string()]);

        assert_eq!(
            footer.terminal().stdout_text(),
            "\x1b[?2026h\x1b7\x1b[9;1H\x1b[2Ksep\x1b[10;1H\x1b[2Kstep\x1b8\x1b[?2026l"
        );
        assert_eq!(footer.last_content(), &["sep".to_string(), "step".to_string()]);
    }

    #[test]
    fn missing_lines_are_left_blank() {
        let _guard = serial();
        let mut footer = StickyFooter::new(MemoryTerminal::tty(80, 10));
        footer.start(2).unwrap();
        footer.terminal_mut().clear();

        footer.update(vec!["only".to_string()]);

        let out = footer.terminal().stdout_text();
        assert!(out.contains("\x1b[9;1H\x1b[2Konly\x1b[10;1H\x1b[2K\x1b8"));
    }

    #[test]
    fn stderr_merges_into_stdout_while_active() {
        let _guard = serial();
        let mut footer = StickyFooter::new(MemoryTerminal::tty(80, 24));
        footer.start(2).unwrap();
        footer.terminal_mut().clear();

        footer.write_output("out\n");
        footer.write_error("err\n");

        assert_eq!(footer.terminal().stdout_text(), "out\nerr\n");
        assert_eq!(footer.terminal().stderr_text(), "");
    }

    #[test]
    fn second_active_footer_is_refused() {
        let _guard = serial();
        let mut first = StickyFooter::new(MemoryTerminal::tty(80, 24));
        first.start(2).unwrap();

        let mut second = StickyFooter::new(MemoryTerminal::tty(80, 24));
        assert!(matches!(second.start(2), Err(FooterError::AlreadyActive)));
        assert!(!second.is_active());

        first.cleanup();
        second.start(2).unwrap();
        assert!(second.is_active());
    }

    #[test]
    fn dropping_releases_the_claim() {
        let _guard = serial();
        {
            let mut footer = StickyFooter::new(MemoryTerminal::tty(80, 24));
            footer.start(2).unwrap();
        }

        let mut next = StickyFooter::new(MemoryTerminal::tty(80, 24));
        next.start(2).unwrap();
        assert!(next.is_active());
    }

    #[test]
    fn cleaned_up_footer_cannot_restart() {
        let _guard = serial();
        let mut footer = StickyFooter::new(MemoryTerminal::tty(80, 24));
        footer.start(2).unwrap();
        footer.cleanup();

        assert!(matches!(footer.start(2), Err(FooterError::CleanedUp)));
        assert!(!footer.is_active());
    }

    #[test]
    fn restarting_an_active_footer_is_refused() {
        let _guard = serial();
        let mut footer = StickyFooter::new(MemoryTerminal::tty(80, 24));
        footer.start(2).unwrap();

        assert!(matches!(footer.start(3), Err(FooterError::AlreadyActive)));
        assert_eq!(footer.line_count(), 2);
    }

    #[test]
    fn too_short_terminal_draws_nothing() {
        let _guard = serial();
        let mut footer = StickyFooter::new(MemoryTerminal::tty(80, 3));
        footer.start(5).unwrap();

        assert!(footer.is_active());
        assert_eq!(footer.scroll_bottom(), None);
        footer.update(vec!["a".to_string()]);
        assert_eq!(footer.terminal().stdout_text(), "");
    }

    #[test]
    fn cleanup_without_start_writes_nothing() {
        let _guard = serial();
        let mut footer = StickyFooter::new(MemoryTerminal::tty(80, 24));
        footer.cleanup();

        assert_eq!(footer.terminal().stdout_text(), "");
    }
}
