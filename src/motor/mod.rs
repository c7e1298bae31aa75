// Motor control module for the RollerCAN serial bridge
//
// Provides:
// - Line protocol framing and the single-reply command exchange
// - Host <-> wire unit conversion and angle normalization
// - Shortest-path routing to absolute headings
// - High-level session API

mod session;
pub mod protocol;
pub mod routing;
pub mod timing;
pub mod units;

#[cfg(test)]
pub(crate) mod testing;

pub use protocol::{
    Command, CommandExchange, MotorMode, RollerError, SerialTransport, Transport, Warning,
};
pub use routing::{route, Route};
pub use session::{MotorSession, MoveReport, Outcome};
pub use timing::{CancelToken, Clock, SettlePolicy, SystemClock};
