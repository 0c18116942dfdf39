//! Terminal handle used by the footer
//!
//! [`StdTerminal`] is the real thing; [`MemoryTerminal`] records everything
//! written to it and lets callers pick the geometry, which is how the footer
//! state machine is exercised without a TTY.

use std::io::{self, Stderr, Stdout, Write};

use crossterm::tty::IsTty;

/// Geometry assumed when the terminal doesn't report one
pub const DEFAULT_COLUMNS: u16 = 80;
pub const DEFAULT_ROWS: u16 = 24;

/// What the footer needs from a terminal
pub trait Terminal {
    /// True when stdout is an interactive terminal
    fn is_tty(&self) -> bool;

    /// Current `(columns, rows)`, never zero
    fn size(&self) -> (u16, u16);

    /// Primary output stream
    fn stdout(&mut self) -> &mut dyn Write;

    /// Native error stream, only used while the footer is inactive
    fn stderr(&mut self) -> &mut dyn Write;
}

/// The process's own stdout/stderr
pub struct StdTerminal {
    out: Stdout,
    err: Stderr,
}

impl StdTerminal {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            err: io::stderr(),
        }
    }
}

impl Default for StdTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for StdTerminal {
    fn is_tty(&self) -> bool {
        self.out.is_tty()
    }

    fn size(&self) -> (u16, u16) {
        match crossterm::terminal::size() {
            Ok((columns, rows)) if columns > 0 && rows > 0 => (columns, rows),
            _ => (DEFAULT_COLUMNS, DEFAULT_ROWS),
        }
    }

    fn stdout(&mut self) -> &mut dyn Write {
        &mut self.out
    }

    fn stderr(&mut self) -> &mut dyn Write {
        &mut self.err
    }
}

/// In-memory terminal with a configurable size
#[derive(Debug, Clone)]
pub struct MemoryTerminal {
    pub tty: bool,
    pub columns: u16,
    pub rows: u16,
    pub out: Vec<u8>,
    pub err: Vec<u8>,
}

impl MemoryTerminal {
    /// An interactive terminal of the given size
    pub fn tty(columns: u16, rows: u16) -> Self {
        Self {
            tty: true,
            columns,
            rows,
            out: Vec::new(),
            err: Vec::new(),
        }
    }

    /// A redirected stream (pipe or file)
    pub fn piped() -> Self {
        Self {
            tty: false,
            ..Self::tty(DEFAULT_COLUMNS, DEFAULT_ROWS)
        }
    }

    /// Everything written to stdout so far
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }

    /// Everything written to stderr so far
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.err).into_owned()
    }

    /// Drops recorded output
    pub fn clear(&mut self) {
        self.out.clear();
        self.err.clear();
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.columns = columns;
        self.rows = rows;
    }
}

impl Terminal for MemoryTerminal {
    fn is_tty(&self) -> bool {
        self.tty
    }

    fn size(&self) -> (u16, u16) {
        (self.columns.max(1), self.rows.max(1))
    }

    fn stdout(&mut self) -> &mut dyn Write {
        &mut self.out
    }

    fn stderr(&mut self) -> &mut dyn Write {
        &mut self.err
    }
}
