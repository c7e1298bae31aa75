// Conversions between host units and firmware wire units
//
// Host side: rpm and degrees as f64.
// Wire side: signed integers in hundredths (0.01 rpm, 0.01 degree).

/// Wire units per host unit for both speed and angle
pub const WIRE_SCALE: f64 = 100.0;

/// Degrees in a full turn
pub const FULL_TURN_DEG: f64 = 360.0;

/// Convert rpm to 0.01 rpm
pub fn to_wire_speed(rpm: f64) -> i64 {
    (rpm * WIRE_SCALE).round() as i64
}

/// Convert 0.01 rpm to rpm
pub fn from_wire_speed(raw: i64) -> f64 {
    raw as f64 / WIRE_SCALE
}

/// Convert degrees to 0.01 degrees
pub fn to_wire_angle(deg: f64) -> i64 {
    (deg * WIRE_SCALE).round() as i64
}

/// Convert 0.01 degrees to degrees (no wrapping)
pub fn from_wire_angle(raw: i64) -> f64 {
    raw as f64 / WIRE_SCALE
}

/// Wrap an angle into [0, 360)
///
/// Values already in range come back bit-identical. Tiny negative inputs whose
/// shifted value rounds up to 360.0 wrap to 0.0 (plain `rem_euclid` would
/// return 360.0 for them).
pub fn normalize_deg(deg: f64) -> f64 {
    let rem = deg % FULL_TURN_DEG;
    if rem >= 0.0 {
        return rem;
    }
    let wrapped = rem + FULL_TURN_DEG;
    if wrapped >= FULL_TURN_DEG { 0.0 } else { wrapped }
}

/// Signed shortest rotation from `cur_deg` to `tgt_deg`, in [-180, 180)
///
/// Inputs need not be normalized. An exact half turn resolves to -180.
pub fn shortest_delta(cur_deg: f64, tgt_deg: f64) -> f64 {
    normalize_deg(tgt_deg - cur_deg + 540.0) - 180.0
}
