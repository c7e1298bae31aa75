// Keyboard jog: A/D spin, S stop, R/F speed, 1-5 headings, Q quit
//
// Usage: cargo run --example jog -- [port]
//
// Mirrors the firmware's touch panel: ANTI / STOP / CW buttons plus the
// 0/90/180/270/360 degree presets. Every key runs a blocking motor operation,
// so keys pressed meanwhile are handled afterwards.

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::Duration;
use tracing::{info, warn};

use roller_link::config::{SerialConfig, SessionConfig, DEFAULT_PORT};
use roller_link::motor::{MotorSession, Outcome, SerialTransport, SystemClock};

const SPEEDS: [f64; 3] = [120.0, 200.0, 300.0]; // rpm
const HEADINGS: [f64; 5] = [0.0, 90.0, 180.0, 270.0, 360.0]; // degrees

type Session = MotorSession<SerialTransport, SystemClock>;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PORT.to_string());
    let serial = SerialConfig { port, ..SerialConfig::default() };

    let mut session = MotorSession::open(&serial, SessionConfig::default())?;

    info!("Controls: A=anti-clockwise, D=clockwise, S=stop, R/F=speed, 1-5=0/90/180/270/360°, Q=quit");
    print_speed(0);

    enable_raw_mode()?;
    let result = run_jog(&mut session);
    disable_raw_mode()?;

    session.close();
    result
}

fn run_jog(session: &mut Session) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut speed_idx: usize = 0;

    loop {
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(KeyEvent { code, kind, .. }) = event::read()? else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }

        let result = match code {
            KeyCode::Char('a') => session.spin(-SPEEDS[speed_idx]),
            KeyCode::Char('d') => session.spin(SPEEDS[speed_idx]),
            KeyCode::Char('s') | KeyCode::Char(' ') => session.stop(),

            KeyCode::Char('r') => {
                speed_idx = (speed_idx + 1).min(SPEEDS.len() - 1);
                print_speed(speed_idx);
                continue;
            }
            KeyCode::Char('f') => {
                speed_idx = speed_idx.saturating_sub(1);
                print_speed(speed_idx);
                continue;
            }

            KeyCode::Char(c @ '1'..='5') => {
                let deg = HEADINGS[c as usize - '1' as usize];
                session.set_position(deg, None).map(|o| o.map(|_| ()))
            }

            KeyCode::Char('q') | KeyCode::Esc => break,
            _ => continue,
        };

        match result {
            Ok(outcome) => report(&outcome),
            Err(e) => warn!("Command failed: {}", e),
        }
    }

    Ok(())
}

fn report(outcome: &Outcome<()>) {
    for w in outcome.warnings() {
        warn!("{}", w);
    }
}

fn print_speed(idx: usize) {
    info!("Jog speed: {} rpm", SPEEDS[idx]);
}
