//! Escape sequences crossterm doesn't ship as commands

use std::fmt;

use crossterm::Command;

/// Restricts scrolling to rows `top..=bottom` (1-based, DECSTBM)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetScrollRegion {
    pub top: u16,
    pub bottom: u16,
}

impl SetScrollRegion {
    pub fn new(top: u16, bottom: u16) -> Self {
        Self { top, bottom }
    }
}

impl Command for SetScrollRegion {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "\x1b[{};{}r", self.top, self.bottom)
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "scroll regions require ANSI support",
        ))
    }
}

/// Lets the whole screen scroll again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetScrollRegion;

impl Command for ResetScrollRegion {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("\x1b[r")
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "scroll regions require ANSI support",
        ))
    }
}
