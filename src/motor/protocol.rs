// Line protocol spoken by the RollerCAN firmware bridge
//
// One command per line, ASCII: "<VERB>[ <ARG>]\n"
// The firmware answers with at most one line (LF or CRLF), or stays silent.
// Numeric arguments and replies are in wire units (0.01 rpm, 0.01 degree).

use serialport::{self, SerialPort};
use std::fmt;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::time::Duration;
use tracing::debug;

use super::timing::{Clock, SettlePolicy};
use crate::config::SerialConfig;

/// Command verbs understood by the firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    SetSpeed,
    GetSpeed,
    SetMode,
    SetPosition,
    GetPosition,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::SetSpeed => "SET_SPEED",
            Verb::GetSpeed => "GET_SPEED",
            Verb::SetMode => "SET_MODE",
            Verb::SetPosition => "SET_POSITION",
            Verb::GetPosition => "GET_POSITION",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating mode as mirrored on the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorMode {
    Speed,
    Position,
    /// No `SET_MODE` has gone through yet, or the transport failed
    #[default]
    Unknown,
}

impl MotorMode {
    /// Literal sent with `SET_MODE`; `Unknown` cannot be commanded
    pub fn wire_literal(&self) -> Option<&'static str> {
        match self {
            MotorMode::Speed => Some("SPEED"),
            MotorMode::Position => Some("POSITION"),
            MotorMode::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Arg {
    Int(i64),
    Literal(&'static str),
}

/// One framed command
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    verb: Verb,
    arg: Option<Arg>,
}

impl Command {
    /// Speed in 0.01 rpm
    pub fn set_speed(raw: i64) -> Self {
        Self { verb: Verb::SetSpeed, arg: Some(Arg::Int(raw)) }
    }

    pub fn get_speed() -> Self {
        Self { verb: Verb::GetSpeed, arg: None }
    }

    /// `MotorMode::Unknown` has no wire form and is rejected
    pub fn set_mode(mode: MotorMode) -> Result<Self> {
        let literal = mode.wire_literal().ok_or_else(|| {
            RollerError::InputContract("SET_MODE requires a concrete mode".to_string())
        })?;
        Ok(Self { verb: Verb::SetMode, arg: Some(Arg::Literal(literal)) })
    }

    /// Absolute position in 0.01 degrees
    pub fn set_position(raw: i64) -> Self {
        Self { verb: Verb::SetPosition, arg: Some(Arg::Int(raw)) }
    }

    pub fn get_position() -> Self {
        Self { verb: Verb::GetPosition, arg: None }
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Wire form including the trailing newline
    pub fn to_line(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arg {
            None => write!(f, "{}", self.verb),
            Some(Arg::Int(n)) => write!(f, "{} {}", self.verb, n),
            Some(Arg::Literal(s)) => write!(f, "{} {}", self.verb, s),
        }
    }
}

/// Reply line from the firmware, `None` when nothing usable arrived
pub type Reply = Option<String>;

/// Hard failures of a session operation
#[derive(Debug, thiserror::Error)]
pub enum RollerError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InputContract(String),
}

impl RollerError {
    pub fn is_transport(&self) -> bool {
        matches!(self, RollerError::Serial(_) | RollerError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, RollerError>;

/// Recoverable protocol problems; the operation carries on with a default value
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Warning {
    #[error("No reply to {verb}")]
    NoReply { verb: Verb },

    #[error("Malformed reply to {verb}: {reply:?}")]
    MalformedReply { verb: Verb, reply: String },
}

/// Parse an integer reply, keeping the reason it failed
///
/// The firmware reports 32-bit values; anything wider is malformed.
pub fn parse_integer(verb: Verb, reply: Option<&str>) -> std::result::Result<i64, Warning> {
    let line = reply.ok_or(Warning::NoReply { verb })?;
    line.trim()
        .parse::<i32>()
        .map(i64::from)
        .map_err(|_| Warning::MalformedReply { verb, reply: line.to_string() })
}

/// Byte stream to the firmware
pub trait Transport {
    /// Write every byte or fail
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()>;

    /// Bytes that can be read without blocking
    fn bytes_available(&mut self) -> std::io::Result<usize>;

    /// Read up to and including the next `\n`, waiting at most `timeout`
    ///
    /// A timeout returns whatever was read so far (possibly nothing).
    fn read_line(&mut self, timeout: Duration) -> std::io::Result<Vec<u8>>;
}

/// Serial port transport
pub struct SerialTransport {
    reader: BufReader<Box<dyn SerialPort>>,
    timeout: Duration,
}

impl SerialTransport {
    /// Open with default baudrate and timeout
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with(&SerialConfig {
            port: port_name.to_string(),
            ..SerialConfig::default()
        })
    }

    pub fn open_with(config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(&config.port, config.baudrate)
            .timeout(config.read_timeout)
            .open()?;

        Ok(Self {
            reader: BufReader::new(port),
            timeout: config.read_timeout,
        })
    }

    pub fn port_name(&self) -> Option<String> {
        self.reader.get_ref().name()
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let port = self.reader.get_mut();
        port.write_all(bytes)?;
        port.flush()
    }

    fn bytes_available(&mut self) -> std::io::Result<usize> {
        let pending = self.reader.get_ref().bytes_to_read()?;
        Ok(self.reader.buffer().len() + pending as usize)
    }

    fn read_line(&mut self, timeout: Duration) -> std::io::Result<Vec<u8>> {
        if timeout != self.timeout {
            self.reader.get_mut().set_timeout(timeout)?;
            self.timeout = timeout;
        }

        let mut line = Vec::new();
        match self.reader.read_until(b'\n', &mut line) {
            Ok(_) => Ok(line),
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(line),
            Err(e) => Err(e),
        }
    }
}

/// Writes commands and collects the single optional reply line
pub struct CommandExchange<T, C> {
    transport: T,
    clock: C,
    settle: SettlePolicy,
    reply_timeout: Duration,
}

impl<T: Transport, C: Clock> CommandExchange<T, C> {
    pub fn new(transport: T, clock: C, settle: SettlePolicy, reply_timeout: Duration) -> Self {
        Self { transport, clock, settle, reply_timeout }
    }

    /// Send one command and return its reply, if any
    ///
    /// Only I/O failures are errors. Silence, undecodable bytes and blank
    /// lines all come back as `Ok(None)`.
    pub fn exchange(&mut self, cmd: &Command) -> Result<Reply> {
        debug!("-> {}", cmd);
        self.transport.write(cmd.to_line().as_bytes())?;

        if self.settle()? == 0 {
            debug!("<- (no reply to {})", cmd.verb());
            return Ok(None);
        }

        let bytes = self.transport.read_line(self.reply_timeout)?;
        let reply = decode_line(&bytes);
        match &reply {
            Some(line) => debug!("<- {}", line),
            None => debug!("<- (unusable reply to {}: {:02X?})", cmd.verb(), bytes),
        }
        Ok(reply)
    }

    /// Wait per the settle policy, returning the number of pending bytes
    fn settle(&mut self) -> std::io::Result<usize> {
        match self.settle {
            SettlePolicy::Fixed(wait) => {
                self.clock.sleep(wait);
                self.transport.bytes_available()
            }
            SettlePolicy::UntilPending { poll, max } => {
                let mut waited = Duration::ZERO;
                loop {
                    let pending = self.transport.bytes_available()?;
                    if pending > 0 || waited >= max || poll.is_zero() {
                        return Ok(pending);
                    }
                    let step = poll.min(max - waited);
                    self.clock.sleep(step);
                    waited += step;
                }
            }
        }
    }

    /// Block for `duration` on the exchange's clock
    pub fn pause(&mut self, duration: Duration) {
        self.clock.sleep(duration);
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

/// Strip line endings and trailing whitespace; reject non-UTF-8 and blank lines
fn decode_line(bytes: &[u8]) -> Reply {
    let text = std::str::from_utf8(bytes).ok()?;
    let line = text.trim_end();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}
