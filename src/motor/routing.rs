// Shortest-path routing to an absolute heading
//
// The firmware takes absolute multi-turn targets. The router keeps the target
// next to the raw encoder reading instead of re-wrapping it, so crossing the
// 0/360 boundary never turns into a full reverse turn.

use super::protocol::{Result, RollerError};
use super::units::{from_wire_angle, normalize_deg, shortest_delta, to_wire_angle};

/// Result of routing one position move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    /// Raw reading the move starts from (0.01 deg, unwrapped)
    pub from_raw: i64,
    /// Signed minimal rotation in degrees
    pub delta_deg: f64,
    /// Absolute wire target for `SET_POSITION` (0.01 deg, unwrapped)
    pub target_raw: i64,
}

impl Route {
    /// Heading the move starts from, in [0, 360)
    pub fn from_deg(&self) -> f64 {
        normalize_deg(from_wire_angle(self.from_raw))
    }

    /// Heading the move ends on, in [0, 360)
    pub fn to_deg(&self) -> f64 {
        normalize_deg(from_wire_angle(self.target_raw))
    }

    pub fn is_noop(&self) -> bool {
        self.target_raw == self.from_raw
    }
}

/// Compute the absolute wire target reaching `target_deg` by the shortest path
pub fn route(current_raw: i64, target_deg: f64) -> Result<Route> {
    let cur_deg = normalize_deg(from_wire_angle(current_raw));
    let tgt_deg = normalize_deg(target_deg);
    let delta_deg = shortest_delta(cur_deg, tgt_deg);

    let target_raw = current_raw
        .checked_add(to_wire_angle(delta_deg))
        .ok_or_else(|| {
            RollerError::InputContract(format!(
                "moving {:+.2}° from raw position {} overflows",
                delta_deg, current_raw
            ))
        })?;

    Ok(Route { from_raw: current_raw, delta_deg, target_raw })
}
