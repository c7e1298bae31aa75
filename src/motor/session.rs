// High-level motor session for the RollerCAN bridge
//
// Combines the command exchange, unit conversion and position routing into
// the operations a console or bridge calls. Protocol silence never aborts an
// operation: it degrades the outcome and the sequence carries on.

use std::time::Duration;
use tracing::{debug, info, warn};

use super::protocol::{
    parse_integer, Command, CommandExchange, MotorMode, Reply, Result, RollerError,
    SerialTransport, Transport, Verb, Warning,
};
use super::routing::{route, Route};
use super::timing::{sleep_cancellable, CancelToken, Clock, SystemClock};
use super::units::{from_wire_angle, from_wire_speed, normalize_deg, to_wire_speed};
use crate::config::{SerialConfig, SessionConfig};
use crate::messages::MotorStatus;

/// Result of an operation that may have completed on a best-effort basis
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Complete(T),
    /// Some replies were missing or unparseable; `value` may be a default
    Degraded { value: T, warnings: Vec<Warning> },
}

impl<T> Outcome<T> {
    pub fn degraded(value: T, warning: Warning) -> Self {
        Outcome::Degraded { value, warnings: vec![warning] }
    }

    fn from_parts(value: T, warnings: Vec<Warning>) -> Self {
        if warnings.is_empty() {
            Outcome::Complete(value)
        } else {
            Outcome::Degraded { value, warnings }
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Complete(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Complete(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    pub fn warnings(&self) -> &[Warning] {
        match self {
            Outcome::Complete(_) => &[],
            Outcome::Degraded { warnings, .. } => warnings,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Complete(value) => Outcome::Complete(f(value)),
            Outcome::Degraded { value, warnings } => Outcome::Degraded { value: f(value), warnings },
        }
    }

    /// Move this outcome's warnings into `sink` and return the value
    fn collect_into(self, sink: &mut Vec<Warning>) -> T {
        match self {
            Outcome::Complete(value) => value,
            Outcome::Degraded { value, warnings } => {
                sink.extend(warnings);
                value
            }
        }
    }
}

/// What a timed move observed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveReport {
    /// Speed read back once the ramp settled, if sampling is enabled
    pub sampled_rpm: Option<f64>,
    /// The wait was cut short through the cancel token
    pub cancelled: bool,
}

/// Host-side mirror of the firmware
#[derive(Debug, Clone, Default)]
struct MotorState {
    mode: MotorMode,
    last_position_raw: Option<i64>,
    last_speed_rpm: Option<f64>,
    commanded_rpm: f64,
    degraded: bool,
}

/// Exclusive owner of one link to the motor
pub struct MotorSession<T: Transport, C: Clock = SystemClock> {
    exchange: CommandExchange<T, C>,
    config: SessionConfig,
    state: MotorState,
    cancel: CancelToken,
    closed: bool,
}

impl MotorSession<SerialTransport, SystemClock> {
    /// Open the serial port and start a session on it
    pub fn open(serial: &SerialConfig, config: SessionConfig) -> Result<Self> {
        info!("Opening motor link on {} @ {} baud", serial.port, serial.baudrate);
        let transport = SerialTransport::open_with(serial)?;
        Ok(Self::new(transport, SystemClock, config))
    }
}

impl<T: Transport, C: Clock> MotorSession<T, C> {
    pub fn new(transport: T, clock: C, config: SessionConfig) -> Self {
        let exchange = CommandExchange::new(transport, clock, config.settle, config.reply_timeout);
        Self {
            exchange,
            config,
            state: MotorState::default(),
            cancel: CancelToken::new(),
            closed: false,
        }
    }

    /// Share an existing cancel token instead of the session's own
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// One exchange; a transport failure forgets the mirrored mode
    fn send(&mut self, cmd: Command) -> Result<Reply> {
        self.exchange.exchange(&cmd).inspect_err(|e| {
            if e.is_transport() {
                warn!("Transport failure on {}: {}", cmd.verb(), e);
                self.state.mode = MotorMode::Unknown;
            }
        })
    }

    /// Validate a host speed and convert it to wire units
    fn wire_speed(&self, rpm: f64) -> Result<i64> {
        if !rpm.is_finite() {
            return Err(RollerError::InputContract(format!("speed {} rpm is not finite", rpm)));
        }
        if rpm.abs() > self.config.max_speed_rpm {
            return Err(RollerError::InputContract(format!(
                "speed {} rpm exceeds limit of {} rpm",
                rpm, self.config.max_speed_rpm
            )));
        }
        Ok(to_wire_speed(rpm))
    }

    /// `SET_SPEED` without the ramp wait
    fn write_speed(&mut self, raw: i64) -> Result<()> {
        info!("Setting speed to {:.2} rpm", from_wire_speed(raw));
        if let Some(reply) = self.send(Command::set_speed(raw))? {
            debug!("Response: {}", reply);
        }
        self.state.commanded_rpm = from_wire_speed(raw);
        Ok(())
    }

    fn finish<V>(&mut self, outcome: Outcome<V>) -> Outcome<V> {
        self.state.degraded = outcome.is_degraded();
        outcome
    }

    /// Set the speed and wait for the firmware to ramp
    ///
    /// The reply is an optional acknowledgment; its absence is not a warning.
    pub fn set_speed(&mut self, rpm: f64) -> Result<Outcome<()>> {
        let raw = self.wire_speed(rpm)?;
        self.write_speed(raw)?;
        self.exchange.pause(self.config.speed_settle);
        Ok(self.finish(Outcome::Complete(())))
    }

    /// Read the speed in rpm; 0.0 with a warning when the reply is missing or garbled
    pub fn get_speed(&mut self) -> Result<Outcome<f64>> {
        let reply = self.send(Command::get_speed())?;
        let outcome = match parse_integer(Verb::GetSpeed, reply.as_deref()) {
            Ok(raw) => {
                let rpm = from_wire_speed(raw);
                self.state.last_speed_rpm = Some(rpm);
                Outcome::Complete(rpm)
            }
            Err(w) => {
                warn!("{}", w);
                Outcome::degraded(0.0, w)
            }
        };
        Ok(self.finish(outcome))
    }

    /// Read the raw position in 0.01 degrees; 0 with a warning on failure
    fn read_position_raw(&mut self) -> Result<Outcome<i64>> {
        let reply = self.send(Command::get_position())?;
        match parse_integer(Verb::GetPosition, reply.as_deref()) {
            Ok(raw) => {
                debug!("Motor position: {:.2}°", from_wire_angle(raw));
                self.state.last_position_raw = Some(raw);
                Ok(Outcome::Complete(raw))
            }
            Err(w) => {
                warn!("{}", w);
                Ok(Outcome::degraded(0, w))
            }
        }
    }

    /// Read the position in degrees
    ///
    /// With `raw` the multi-turn value is returned as is, otherwise it is
    /// wrapped to [0, 360).
    pub fn get_position(&mut self, raw: bool) -> Result<Outcome<f64>> {
        let outcome = self.read_position_raw()?.map(|centi| {
            let deg = from_wire_angle(centi);
            if raw { deg } else { normalize_deg(deg) }
        });
        Ok(self.finish(outcome))
    }

    /// Switch the firmware mode and mirror it once the exchange went through
    pub fn set_mode(&mut self, mode: MotorMode) -> Result<()> {
        let cmd = Command::set_mode(mode)?;
        self.send(cmd)?;
        self.state.mode = mode;
        Ok(())
    }

    /// Turn to an absolute heading along the shortest path
    ///
    /// Sequence: `GET_POSITION`, `SET_MODE POSITION`, `SET_SPEED`, `SET_POSITION`.
    /// A missing position reading routes from 0 and degrades the outcome; the
    /// remaining commands are sent regardless.
    pub fn set_position(&mut self, target_deg: f64, speed_rpm: Option<f64>) -> Result<Outcome<Route>> {
        if !target_deg.is_finite() {
            return Err(RollerError::InputContract(format!(
                "target {}° is not finite",
                target_deg
            )));
        }
        let speed_raw = self.wire_speed(speed_rpm.unwrap_or(self.config.position_speed_rpm))?;

        let mut warnings = Vec::new();
        let current_raw = self.read_position_raw()?.collect_into(&mut warnings);
        let route = route(current_raw, target_deg)?;
        if i32::try_from(route.target_raw).is_err() {
            return Err(RollerError::InputContract(format!(
                "position target {} is outside the firmware's range",
                route.target_raw
            )));
        }

        info!(
            "Move {:+.2}° (from {:.2}° to {:.2}°)",
            route.delta_deg,
            route.from_deg(),
            route.to_deg()
        );
        self.set_mode(MotorMode::Position)?;
        self.write_speed(speed_raw)?;
        if let Some(reply) = self.send(Command::set_position(route.target_raw))? {
            debug!("Response: {}", reply);
        }

        Ok(self.finish(Outcome::from_parts(route, warnings)))
    }

    /// Run in speed mode without an automatic stop
    pub fn spin(&mut self, rpm: f64) -> Result<Outcome<()>> {
        let raw = self.wire_speed(rpm)?;
        self.set_mode(MotorMode::Speed)?;
        self.write_speed(raw)?;
        self.exchange.pause(self.config.speed_settle);
        Ok(self.finish(Outcome::Complete(())))
    }

    /// Run at `speed_rpm` for `duration`, then stop
    ///
    /// The wait ends early when the session's cancel token is tripped; the
    /// stop command is sent either way.
    pub fn move_for(&mut self, speed_rpm: f64, duration: Duration) -> Result<Outcome<MoveReport>> {
        if duration.is_zero() {
            return Err(RollerError::InputContract("move duration must be positive".to_string()));
        }
        let raw = self.wire_speed(speed_rpm)?;

        self.set_mode(MotorMode::Speed)?;
        self.write_speed(raw)?;
        self.exchange.pause(self.config.speed_settle);

        let mut warnings = Vec::new();
        let sampled_rpm = if self.config.sample_speed {
            Some(self.get_speed()?.collect_into(&mut warnings))
        } else {
            None
        };

        let slice = self.config.cancel_poll;
        let cancelled = sleep_cancellable(self.exchange.clock_mut(), duration, slice, &self.cancel);
        if cancelled {
            info!("Timed move cancelled");
        }
        self.cancel.reset();

        self.set_speed(0.0)?;
        Ok(self.finish(Outcome::from_parts(MoveReport { sampled_rpm, cancelled }, warnings)))
    }

    /// Command zero speed, consuming any pending cancellation
    pub fn stop(&mut self) -> Result<Outcome<()>> {
        self.cancel.reset();
        self.set_speed(0.0)
    }

    /// Best-effort stop, then release the transport. Never fails.
    pub fn close(mut self) {
        self.closed = true;
        if let Err(e) = self.set_speed(0.0) {
            warn!("Failed to stop motor on close: {}", e);
        }
    }

    /// Release the transport and leave the motor as last commanded
    pub fn release(mut self) {
        self.closed = true;
    }

    /// Token that ends a running `move_for` early from another thread
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn mode(&self) -> MotorMode {
        self.state.mode
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Snapshot of the host-side mirror
    pub fn status(&self) -> MotorStatus {
        MotorStatus {
            mode: self.state.mode,
            position_raw: self.state.last_position_raw,
            position_deg: self
                .state
                .last_position_raw
                .map(|raw| normalize_deg(from_wire_angle(raw))),
            speed_rpm: self.state.last_speed_rpm,
            commanded_rpm: self.state.commanded_rpm,
            degraded: self.state.degraded,
        }
    }

    pub fn transport(&self) -> &T {
        self.exchange.transport()
    }

    pub fn clock(&self) -> &C {
        self.exchange.clock()
    }
}

impl<T: Transport, C: Clock> Drop for MotorSession<T, C> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        // Try to stop the motor when the session is dropped (safety measure)
        if let Err(e) = self.set_speed(0.0) {
            warn!("Failed to stop motor on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::testing::{ManualClock, ScriptedTransport};

    fn session(transport: ScriptedTransport) -> MotorSession<ScriptedTransport, ManualClock> {
        MotorSession::new(transport, ManualClock::new(), SessionConfig::default())
    }

    fn quiet_config() -> SessionConfig {
        SessionConfig { sample_speed: false, ..SessionConfig::default() }
    }

    #[test]
    fn test_set_position_end_to_end_from_zero() {
        let mut s = session(ScriptedTransport::new().reply("0\n"));

        let outcome = s.set_position(270.0, None).unwrap();

        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value().target_raw, -9000);
        assert_eq!(
            s.transport().written(),
            vec!["GET_POSITION", "SET_MODE POSITION", "SET_SPEED 2000", "SET_POSITION -9000"]
        );
        assert_eq!(s.mode(), MotorMode::Position);
        // Only the per-command settle, no ramp wait inside a position move
        assert_eq!(s.clock().total(), Duration::from_millis(400));
    }

    #[test]
    fn test_set_position_keeps_winding() {
        let mut s = session(ScriptedTransport::new().reply("35500\r\n"));

        let route = s.set_position(5.0, Some(12.5)).unwrap().into_value();

        assert_eq!(route.target_raw, 36500);
        assert_eq!(
            s.transport().written(),
            vec!["GET_POSITION", "SET_MODE POSITION", "SET_SPEED 1250", "SET_POSITION 36500"]
        );
    }

    #[test]
    fn test_set_position_same_heading_still_sent() {
        let mut s = session(ScriptedTransport::new().reply("40500\n"));

        let route = s.set_position(45.0, None).unwrap().into_value();

        assert!(route.is_noop());
        assert_eq!(s.transport().written().last().unwrap(), "SET_POSITION 40500");
    }

    #[test]
    fn test_set_position_without_reading_degrades_but_continues() {
        let mut s = session(ScriptedTransport::new().silent());

        let outcome = s.set_position(90.0, None).unwrap();

        assert!(outcome.is_degraded());
        assert_eq!(outcome.warnings(), &[Warning::NoReply { verb: Verb::GetPosition }]);
        assert_eq!(outcome.value().target_raw, 9000);
        assert_eq!(s.transport().written().len(), 4);
        assert!(s.status().degraded);
    }

    #[test]
    fn test_set_position_rejects_bad_input_before_io() {
        let mut s = session(ScriptedTransport::new());

        assert!(matches!(
            s.set_position(f64::NAN, None),
            Err(RollerError::InputContract(_))
        ));
        assert!(matches!(
            s.set_position(90.0, Some(5000.0)),
            Err(RollerError::InputContract(_))
        ));
        assert!(s.transport().written().is_empty());
    }

    #[test]
    fn test_set_position_oversized_reading_routes_from_zero() {
        let mut s = session(ScriptedTransport::new().reply("2147483648\n"));

        let outcome = s.set_position(90.0, None).unwrap();

        assert_eq!(
            outcome.warnings(),
            &[Warning::MalformedReply {
                verb: Verb::GetPosition,
                reply: "2147483648".to_string()
            }]
        );
        assert_eq!(outcome.value().from_raw, 0);
        assert_eq!(outcome.value().target_raw, 9000);
        assert_eq!(s.transport().written().len(), 4);
        assert_eq!(s.status().position_raw, None);
    }

    #[test]
    fn test_set_position_huge_reading_does_not_panic() {
        let mut s = session(ScriptedTransport::new().reply("9223372036854775807\n"));

        let outcome = s.set_position(0.0, None).unwrap();

        assert!(outcome.is_degraded());
        assert_eq!(outcome.value().target_raw, 0);
    }

    #[test]
    fn test_set_position_target_past_firmware_range_rejected() {
        // 21474830.00° wraps to 110°; a +90° move lands above i32::MAX
        let mut s = session(ScriptedTransport::new().reply("2147483000\n"));

        let err = s.set_position(200.0, None).unwrap_err();

        assert!(matches!(err, RollerError::InputContract(_)));
        assert_eq!(s.transport().written(), vec!["GET_POSITION"]);
        assert_eq!(s.mode(), MotorMode::Unknown);
    }

    #[test]
    fn test_set_speed_waits_for_ramp() {
        let mut s = session(ScriptedTransport::new().reply("Speed set to 15.00 rpm\n"));

        let outcome = s.set_speed(15.0).unwrap();

        assert_eq!(outcome, Outcome::Complete(()));
        assert_eq!(s.transport().written(), vec!["SET_SPEED 1500"]);
        assert_eq!(
            s.clock().sleeps(),
            &[Duration::from_millis(100), Duration::from_secs(1)]
        );
        assert_eq!(s.status().commanded_rpm, 15.0);
    }

    #[test]
    fn test_set_speed_rejects_out_of_range() {
        let mut s = session(ScriptedTransport::new());
        assert!(s.set_speed(f64::INFINITY).is_err());
        assert!(s.set_speed(-1000.5).is_err());
        assert!(s.transport().written().is_empty());
    }

    #[test]
    fn test_get_speed_parses_reply() {
        let mut s = session(ScriptedTransport::new().reply("-2050\n"));
        assert_eq!(s.get_speed().unwrap(), Outcome::Complete(-20.5));
        assert_eq!(s.status().speed_rpm, Some(-20.5));
    }

    #[test]
    fn test_get_speed_malformed_reply_is_zero_with_warning() {
        let mut s = session(ScriptedTransport::new().reply("ERR\n"));

        let outcome = s.get_speed().unwrap();

        assert_eq!(*outcome.value(), 0.0);
        assert_eq!(
            outcome.warnings(),
            &[Warning::MalformedReply { verb: Verb::GetSpeed, reply: "ERR".to_string() }]
        );
    }

    #[test]
    fn test_get_speed_out_of_range_is_malformed() {
        let mut s = session(ScriptedTransport::new().reply("-2147483649\n"));

        let outcome = s.get_speed().unwrap();

        assert_eq!(*outcome.value(), 0.0);
        assert!(matches!(
            outcome.warnings(),
            [Warning::MalformedReply { verb: Verb::GetSpeed, .. }]
        ));
        assert_eq!(s.status().speed_rpm, None);
    }

    #[test]
    fn test_get_speed_no_reply_is_zero_with_warning() {
        let mut s = session(ScriptedTransport::new().silent());

        let outcome = s.get_speed().unwrap();

        assert_eq!(*outcome.value(), 0.0);
        assert_eq!(outcome.warnings(), &[Warning::NoReply { verb: Verb::GetSpeed }]);
    }

    #[test]
    fn test_get_position_wrapped_and_raw() {
        let mut s = session(ScriptedTransport::new().reply("-9000\n").reply("-9000\n"));

        assert_eq!(s.get_position(false).unwrap(), Outcome::Complete(270.0));
        assert_eq!(s.get_position(true).unwrap(), Outcome::Complete(-90.0));
        assert_eq!(s.status().position_deg, Some(270.0));
    }

    #[test]
    fn test_get_position_multi_turn() {
        let mut s = session(ScriptedTransport::new().reply("73000\n").reply("73000\n"));

        assert_eq!(*s.get_position(true).unwrap().value(), 730.0);
        assert_eq!(*s.get_position(false).unwrap().value(), 10.0);
    }

    #[test]
    fn test_get_position_missing_is_zero() {
        let mut s = session(ScriptedTransport::new().reply("\n"));

        let outcome = s.get_position(false).unwrap();

        assert_eq!(*outcome.value(), 0.0);
        assert!(outcome.is_degraded());
        assert_eq!(s.status().position_raw, None);
    }

    #[test]
    fn test_move_for_sequence() {
        let mut s = session(
            ScriptedTransport::new()
                .reply("OK\n") // SET_MODE
                .reply("OK\n") // SET_SPEED
                .reply("2000\n") // GET_SPEED
                .reply("OK\n"), // SET_SPEED 0
        );

        let outcome = s.move_for(20.0, Duration::from_secs(2)).unwrap();

        assert_eq!(
            outcome,
            Outcome::Complete(MoveReport { sampled_rpm: Some(20.0), cancelled: false })
        );
        assert_eq!(
            s.transport().written(),
            vec!["SET_MODE SPEED", "SET_SPEED 2000", "GET_SPEED", "SET_SPEED 0"]
        );
        assert_eq!(s.mode(), MotorMode::Speed);
        // 4 settles + 2 ramps + the move itself
        assert_eq!(s.clock().total(), Duration::from_millis(400 + 2000 + 2000));
    }

    #[test]
    fn test_move_for_silent_firmware_still_stops() {
        let mut s = session(ScriptedTransport::new());

        let outcome = s.move_for(10.0, Duration::from_millis(500)).unwrap();

        assert!(outcome.is_degraded());
        assert_eq!(outcome.value().sampled_rpm, Some(0.0));
        assert_eq!(s.transport().written().last().unwrap(), "SET_SPEED 0");
    }

    #[test]
    fn test_move_for_rejects_zero_duration() {
        let mut s = session(ScriptedTransport::new());
        assert!(matches!(
            s.move_for(10.0, Duration::ZERO),
            Err(RollerError::InputContract(_))
        ));
        assert!(s.transport().written().is_empty());
    }

    #[test]
    fn test_move_for_cancelled_early() {
        let token = CancelToken::new();
        // Trips after 2 settles, 1 ramp and 3 wait slices
        let clock = ManualClock::new().cancel_after(6, token.clone());
        let mut s = MotorSession::new(ScriptedTransport::new(), clock, quiet_config())
            .with_cancel_token(token.clone());

        let report = s.move_for(30.0, Duration::from_secs(60)).unwrap().into_value();

        assert!(report.cancelled);
        assert_eq!(report.sampled_rpm, None);
        assert_eq!(s.transport().written().last().unwrap(), "SET_SPEED 0");
        assert_eq!(s.clock().total(), Duration::from_millis(100 + 100 + 1000 + 150 + 100 + 1000));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_spin_does_not_stop() {
        let mut s = session(ScriptedTransport::new());

        s.spin(-30.0).unwrap();

        assert_eq!(s.transport().written(), vec!["SET_MODE SPEED", "SET_SPEED -3000"]);
        assert_eq!(s.mode(), MotorMode::Speed);
    }

    #[test]
    fn test_transport_failure_resets_mode() {
        let mut s = session(ScriptedTransport::new().fail_writes_from(1));

        s.set_mode(MotorMode::Speed).unwrap();
        assert_eq!(s.mode(), MotorMode::Speed);

        let err = s.set_speed(10.0).unwrap_err();
        assert!(err.is_transport());
        assert_eq!(s.mode(), MotorMode::Unknown);
    }

    #[test]
    fn test_transport_failure_mid_position_move_aborts() {
        let mut s = session(ScriptedTransport::new().reply("0\n").fail_writes_from(2));

        assert!(s.set_position(90.0, None).unwrap_err().is_transport());
        assert_eq!(s.transport().written(), vec!["GET_POSITION", "SET_MODE POSITION"]);
        assert_eq!(s.mode(), MotorMode::Unknown);
    }

    #[test]
    fn test_close_sends_stop_once() {
        let transport = ScriptedTransport::new();
        let log = transport.write_log();
        let s = session(transport);

        s.close();

        assert_eq!(*log.borrow(), vec!["SET_SPEED 0".to_string()]);
    }

    #[test]
    fn test_close_swallows_transport_failure() {
        let transport = ScriptedTransport::new().fail_writes();
        let log = transport.write_log();

        session(transport).close();

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_drop_stops_motor() {
        let transport = ScriptedTransport::new();
        let log = transport.write_log();

        drop(session(transport));

        assert_eq!(*log.borrow(), vec!["SET_SPEED 0".to_string()]);
    }

    #[test]
    fn test_release_leaves_motor_running() {
        let transport = ScriptedTransport::new();
        let log = transport.write_log();
        let mut s = session(transport);

        s.spin(10.0).unwrap();
        s.release();

        assert_eq!(*log.borrow(), vec!["SET_MODE SPEED", "SET_SPEED 1000"]);
    }

    #[test]
    fn test_status_starts_unknown() {
        let s = session(ScriptedTransport::new());
        let status = s.status();
        assert_eq!(status.mode, MotorMode::Unknown);
        assert_eq!(status.position_raw, None);
        assert!(!status.degraded);
    }
}
