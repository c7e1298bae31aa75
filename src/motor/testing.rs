// Test doubles for the transport and the clock

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use super::protocol::Transport;
use super::timing::{CancelToken, Clock};

enum Step {
    Reply(Vec<u8>),
    Silent,
    AfterPolls(usize, Vec<u8>),
}

/// Transport that answers each write with the next scripted step
///
/// Writes beyond the script get no reply.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: VecDeque<Step>,
    pending: VecDeque<u8>,
    hold_polls: usize,
    written: Rc<RefCell<Vec<String>>>,
    reads: usize,
    fail_from: Option<usize>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, line: &str) -> Self {
        self.reply_bytes(line.as_bytes())
    }

    pub fn reply_bytes(mut self, bytes: &[u8]) -> Self {
        self.script.push_back(Step::Reply(bytes.to_vec()));
        self
    }

    pub fn silent(mut self) -> Self {
        self.script.push_back(Step::Silent);
        self
    }

    /// Reply that only shows up after `polls` calls to `bytes_available`
    pub fn reply_after_polls(mut self, polls: usize, line: &str) -> Self {
        self.script
            .push_back(Step::AfterPolls(polls, line.as_bytes().to_vec()));
        self
    }

    pub fn fail_writes(self) -> Self {
        self.fail_writes_from(0)
    }

    /// Every write starting with the `n`th (0-based) fails
    pub fn fail_writes_from(mut self, n: usize) -> Self {
        self.fail_from = Some(n);
        self
    }

    /// Lines written so far, without the newline
    pub fn written(&self) -> Vec<String> {
        self.written.borrow().clone()
    }

    /// Shared view of the written lines that outlives the transport
    pub fn write_log(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.written)
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl Transport for ScriptedTransport {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let sent = self.written.borrow().len();
        if self.fail_from.is_some_and(|n| sent >= n) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "port unplugged"));
        }

        let line = String::from_utf8_lossy(bytes);
        self.written
            .borrow_mut()
            .push(line.trim_end_matches('\n').to_string());

        match self.script.pop_front() {
            Some(Step::Reply(reply)) => self.pending.extend(reply),
            Some(Step::AfterPolls(polls, reply)) => {
                self.hold_polls = polls;
                self.pending.extend(reply);
            }
            Some(Step::Silent) | None => {}
        }
        Ok(())
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        if self.hold_polls > 0 {
            self.hold_polls -= 1;
            return Ok(0);
        }
        Ok(self.pending.len())
    }

    fn read_line(&mut self, _timeout: Duration) -> io::Result<Vec<u8>> {
        self.reads += 1;
        let mut line = Vec::new();
        while let Some(b) = self.pending.pop_front() {
            line.push(b);
            if b == b'\n' {
                break;
            }
        }
        Ok(line)
    }
}

/// Clock that records requested sleeps instead of sleeping
#[derive(Default)]
pub(crate) struct ManualClock {
    sleeps: Vec<Duration>,
    cancel_after: Option<(usize, CancelToken)>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip `token` once `n` sleeps have been recorded
    pub fn cancel_after(mut self, n: usize, token: CancelToken) -> Self {
        self.cancel_after = Some((n, token));
        self
    }

    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }

    pub fn total(&self) -> Duration {
        self.sleeps.iter().sum()
    }
}

impl Clock for ManualClock {
    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
        if let Some((n, token)) = &self.cancel_after {
            if self.sleeps.len() >= *n {
                token.cancel();
            }
        }
    }
}
