//! Agent child process with piped output

use std::io::Read;
use std::process::Stdio;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use super::{exit_code, shell_command, RunnerError};
use crate::event::Event;

const READ_CHUNK: usize = 8192;

/// A running agent whose output is forwarded as events
///
/// Output arrives as [`Event::Stdout`] / [`Event::Stderr`] chunks. Once both
/// streams hit EOF and the child has been reaped, exactly one
/// [`Event::Exited`] follows, so no output is ever delivered after it.
pub struct AgentProcess {
    pid: u32,
    waiter: Option<JoinHandle<()>>,
}

impl AgentProcess {
    /// Spawns the agent; stdin stays attached to ours
    pub fn spawn(command: &str, prompt: &str, events: Sender<Event>) -> Result<Self, RunnerError> {
        let mut child = shell_command(command, prompt)?
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(RunnerError::Launch)?;

        let pid = child.id();
        let readers: Vec<JoinHandle<()>> = [
            child
                .stdout
                .take()
                .map(|out| spawn_reader(out, events.clone(), Event::Stdout)),
            child
                .stderr
                .take()
                .map(|err| spawn_reader(err, events.clone(), Event::Stderr)),
        ]
        .into_iter()
        .flatten()
        .collect();

        let waiter = thread::spawn(move || {
            for reader in readers {
                let _ = reader.join();
            }
            let code = child.wait().map(exit_code).unwrap_or(1);
            let _ = events.send(Event::Exited(code));
        });

        Ok(Self {
            pid,
            waiter: Some(waiter),
        })
    }

    /// OS process id of the shell running the agent
    pub fn id(&self) -> u32 {
        self.pid
    }

    /// Waits for the helper threads after [`Event::Exited`] was received
    pub fn join(mut self) {
        if let Some(waiter) = self.waiter.take() {
            let _ = waiter.join();
        }
    }
}

fn spawn_reader<R>(mut stream: R, events: Sender<Event>, wrap: fn(String) -> Event) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut decoder = Utf8Chunks::default();
        let mut buf = [0u8; READ_CHUNK];

        loop {
            let n = match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };

            let text = decoder.push(&buf[..n]);
            if !text.is_empty() && events.send(wrap(text)).is_err() {
                return;
            }
        }

        let rest = decoder.finish();
        if !rest.is_empty() {
            let _ = events.send(wrap(rest));
        }
    })
}

/// Turns a byte stream into text without splitting multi-byte characters
/// that straddle two reads
#[derive(Debug, Default)]
struct Utf8Chunks {
    pending: Vec<u8>,
}

impl Utf8Chunks {
    fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let complete = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            // Incomplete sequence at the end: hold it back for the next read
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(_) => self.pending.len(),
        };

        let tail = self.pending.split_off(complete);
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending = tail;
        text
    }

    fn finish(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        text
    }
}
