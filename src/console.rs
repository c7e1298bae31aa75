// Interactive console: one short command per line
//
//   sp <rpm> [secs]  run at rpm; stop after secs, or keep spinning
//   p <deg>          go to an absolute heading
//   s                stop
//   r [raw]          read the position
//   e                exit

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::info;

use crate::motor::{Clock, MotorSession, Outcome, RollerError, Transport};

pub const HELP: &str = "\
Available commands:
  sp <rpm> [secs]  - Set speed in RPM, optionally stopping after secs
  p <degrees>      - Move to absolute position in degrees
  s                - Stop the motor
  r [raw]          - Read the position (raw = unwrapped)
  e                - Exit the program";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Speed { rpm: f64, duration: Option<Duration> },
    Position { deg: f64 },
    Stop,
    Read { raw: bool },
    Help,
    Exit,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Speed value required")]
    MissingSpeed,

    #[error("Position value required")]
    MissingPosition,

    #[error("Invalid number format - {0:?}")]
    BadNumber(String),

    #[error("Invalid duration - {0:?}")]
    BadDuration(String),

    #[error("Invalid command: {0}")]
    Unknown(String),
}

fn number(token: &str) -> Result<f64, ParseError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::BadNumber(token.to_string()))
}

/// Parse one console line; blank lines give `Ok(None)`
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, ParseError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = parts.split_first() else {
        return Ok(None);
    };

    let cmd = match head {
        "sp" => {
            let rpm = number(args.first().ok_or(ParseError::MissingSpeed)?)?;
            let duration = match args.get(1) {
                Some(secs) => Some(
                    Duration::try_from_secs_f64(number(secs)?)
                        .map_err(|_| ParseError::BadDuration(secs.to_string()))?,
                ),
                None => None,
            };
            ConsoleCommand::Speed { rpm, duration }
        }
        "p" => ConsoleCommand::Position {
            deg: number(args.first().ok_or(ParseError::MissingPosition)?)?,
        },
        "s" => ConsoleCommand::Stop,
        "r" => ConsoleCommand::Read { raw: args.first() == Some(&"raw") },
        "h" | "help" | "?" => ConsoleCommand::Help,
        "e" | "q" | "exit" => ConsoleCommand::Exit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(cmd))
}

fn report<V>(out: &mut impl Write, outcome: &Outcome<V>) -> io::Result<()> {
    for w in outcome.warnings() {
        writeln!(out, "Warning: {}", w)?;
    }
    Ok(())
}

fn print_position<T: Transport, C: Clock>(
    session: &mut MotorSession<T, C>,
    out: &mut impl Write,
    label: impl Display,
    raw: bool,
) -> Result<(), RollerError> {
    let outcome = session.get_position(raw)?;
    report(out, &outcome)?;
    writeln!(out, "{}: {:.2}°", label, outcome.value())?;
    Ok(())
}

/// Execute one command; `Ok(false)` asks the loop to exit
pub fn execute<T: Transport, C: Clock>(
    session: &mut MotorSession<T, C>,
    cmd: ConsoleCommand,
    out: &mut impl Write,
) -> Result<bool, RollerError> {
    match cmd {
        ConsoleCommand::Speed { rpm, duration: Some(duration) } => {
            let outcome = session.move_for(rpm, duration)?;
            report(out, &outcome)?;
            if let Some(sampled) = outcome.value().sampled_rpm {
                writeln!(out, "Measured speed: {:.2} rpm", sampled)?;
            }
        }
        ConsoleCommand::Speed { rpm, duration: None } => {
            let outcome = session.spin(rpm)?;
            report(out, &outcome)?;
            writeln!(out, "Spinning at {:.2} rpm ('s' to stop)", rpm)?;
        }
        ConsoleCommand::Position { deg } => {
            print_position(session, out, "Current position", false)?;
            let outcome = session.set_position(deg, None)?;
            report(out, &outcome)?;
            let route = outcome.value();
            writeln!(
                out,
                "Move {:+.2}° (from {:.2}° to {:.2}°)",
                route.delta_deg,
                route.from_deg(),
                route.to_deg()
            )?;
        }
        ConsoleCommand::Stop => {
            writeln!(out, "Stopping motor...")?;
            let outcome = session.stop()?;
            report(out, &outcome)?;
            print_position(session, out, "Current position", false)?;
        }
        ConsoleCommand::Read { raw } => {
            let label = if raw { "Raw position" } else { "Current position" };
            print_position(session, out, label, raw)?;
        }
        ConsoleCommand::Help => writeln!(out, "{}", HELP)?,
        ConsoleCommand::Exit => {
            writeln!(out, "Exiting...")?;
            return Ok(false);
        }
    }
    Ok(true)
}

/// Read commands from `input` until exit or end of input
///
/// Parse errors and failed operations are printed and the loop continues.
pub fn run<T: Transport, C: Clock>(
    session: &mut MotorSession<T, C>,
    input: impl BufRead,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "{}", HELP)?;

    let mut lines = input.lines();
    loop {
        write!(out, "\nEnter command: ")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            break;
        };

        let cmd = match parse_line(&line?) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "Error: {}", e)?;
                continue;
            }
        };

        info!("Console command: {:?}", cmd);
        match execute(session, cmd, out) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => writeln!(out, "Error: {}", e)?,
        }
    }
    Ok(())
}
