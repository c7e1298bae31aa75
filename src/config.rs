// Timeouts, topics, motor configuration
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::motor::timing::SettlePolicy;

// Serial link to the firmware bridge
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUDRATE: u32 = 115_200;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

// Wait after each write before looking for a reply
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(100);

// Time the firmware needs to ramp after a speed change
pub const DEFAULT_SPEED_SETTLE: Duration = Duration::from_secs(1);

// Approach speed for position moves (rpm)
pub const DEFAULT_POSITION_SPEED_RPM: f64 = 20.0;

// Largest speed the host will command (rpm)
pub const DEFAULT_MAX_SPEED_RPM: f64 = 1000.0;

// Granularity of the cancellable wait inside timed moves
pub const CANCEL_POLL: Duration = Duration::from_millis(50);

// Bridge loop frequency
pub const LOOP_HZ: u64 = 20;

// Zenoh topics
pub const TOPIC_CMD: &str = "roller/cmd"; // commands
pub const TOPIC_STATE: &str = "roller/state"; // motor status
pub const TOPIC_HEALTH: &str = "roller/state/health"; // bridge health

/// Serial port settings used to open the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialConfig {
    pub port: String,
    pub baudrate: u32,
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baudrate: DEFAULT_BAUDRATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Tunables for a motor session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long to wait after each command before the single reply read
    pub settle: SettlePolicy,
    /// Wait after every `SET_SPEED` issued through `set_speed`
    pub speed_settle: Duration,
    /// Read timeout handed to the transport for the reply line
    pub reply_timeout: Duration,
    /// Approach speed used by `set_position` when none is given
    pub position_speed_rpm: f64,
    /// Absolute speed limit, checked before any I/O
    pub max_speed_rpm: f64,
    /// Sample `GET_SPEED` once after a timed move has ramped
    pub sample_speed: bool,
    pub cancel_poll: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle: SettlePolicy::Fixed(DEFAULT_SETTLE),
            speed_settle: DEFAULT_SPEED_SETTLE,
            reply_timeout: DEFAULT_READ_TIMEOUT,
            position_speed_rpm: DEFAULT_POSITION_SPEED_RPM,
            max_speed_rpm: DEFAULT_MAX_SPEED_RPM,
            sample_speed: true,
            cancel_poll: CANCEL_POLL,
        }
    }
}
