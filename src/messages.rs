// Message types exchanged by the bridge

use serde::{Deserialize, Serialize};

use crate::motor::MotorMode;

// Command from scripts/teleop -> bridge
// Tagged by "op", e.g. {"op":"set_position","deg":90.0}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MotorCommand {
    SetSpeed { rpm: f64 },
    Spin { rpm: f64 },
    MoveFor { rpm: f64, secs: f64 },
    SetPosition {
        deg: f64,
        #[serde(default)]
        speed_rpm: Option<f64>,
    },
    Stop,
    Read,
}

/// Host-side mirror of the motor, published by the bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MotorStatus {
    pub mode: MotorMode,
    /// Last raw reading in 0.01 degrees (unwrapped)
    pub position_raw: Option<i64>,
    /// Last reading wrapped to [0, 360)
    pub position_deg: Option<f64>,
    /// Last `GET_SPEED` answer
    pub speed_rpm: Option<f64>,
    /// Last speed sent with `SET_SPEED`
    pub commanded_rpm: f64,
    /// Whether the last operation had to fall back to defaults
    pub degraded: bool,
}

/// Health status published by the bridge
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum BridgeHealth {
    Ok,
    Degraded,
    LinkDown,
}
