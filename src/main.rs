use std::io;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use roller_link::config::{SerialConfig, SessionConfig, DEFAULT_BAUDRATE, DEFAULT_PORT};
use roller_link::console;
use roller_link::motor::{MotorSession, Outcome, SettlePolicy};

/// Host client for the RollerCAN serial bridge
#[derive(Parser, Debug)]
#[command(name = "roller", version, about)]
struct Cli {
    /// Serial port of the firmware bridge
    #[arg(short, long, default_value = DEFAULT_PORT)]
    port: String,

    #[arg(short, long, default_value_t = DEFAULT_BAUDRATE)]
    baud: u32,

    /// Reply read timeout
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Wait after each command before looking for a reply
    #[arg(long, default_value_t = 100)]
    settle_ms: u64,

    /// Stop waiting as soon as reply bytes arrive (settle_ms becomes the upper bound)
    #[arg(long)]
    poll_settle: bool,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Interactive console (default)
    Console,
    /// Run at a speed; stops after --for seconds, otherwise keeps spinning
    Speed {
        #[arg(allow_negative_numbers = true)]
        rpm: f64,
        #[arg(long = "for")]
        secs: Option<f64>,
    },
    /// Go to an absolute heading along the shortest path
    Position {
        #[arg(allow_negative_numbers = true)]
        deg: f64,
        /// Approach speed in rpm
        #[arg(long)]
        speed: Option<f64>,
    },
    /// Read the current position
    Read {
        /// Print the unwrapped multi-turn value
        #[arg(long)]
        raw: bool,
    },
    /// Stop the motor
    Stop,
    /// Bridge the motor to zenoh topics
    Bridge,
}

impl Cli {
    fn serial_config(&self) -> SerialConfig {
        SerialConfig {
            port: self.port.clone(),
            baudrate: self.baud,
            read_timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    fn session_config(&self) -> SessionConfig {
        let settle = Duration::from_millis(self.settle_ms);
        SessionConfig {
            settle: if self.poll_settle {
                SettlePolicy::UntilPending { poll: Duration::from_millis(5), max: settle }
            } else {
                SettlePolicy::Fixed(settle)
            },
            reply_timeout: Duration::from_millis(self.timeout_ms),
            ..SessionConfig::default()
        }
    }
}

fn print_warnings<V>(outcome: &Outcome<V>) {
    for w in outcome.warnings() {
        eprintln!("Warning: {}", w);
    }
}

fn run_once(cli: &Cli, cmd: &Cmd) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut session = MotorSession::open(&cli.serial_config(), cli.session_config())?;

    match *cmd {
        Cmd::Console => {
            let stdin = io::stdin();
            console::run(&mut session, stdin.lock(), &mut io::stdout())?;
        }
        Cmd::Speed { rpm, secs: Some(secs) } => {
            let outcome = session.move_for(rpm, Duration::try_from_secs_f64(secs)?)?;
            print_warnings(&outcome);
            if let Some(sampled) = outcome.value().sampled_rpm {
                println!("Measured speed: {:.2} rpm", sampled);
            }
        }
        Cmd::Speed { rpm, secs: None } => {
            print_warnings(&session.spin(rpm)?);
            println!("Spinning at {:.2} rpm", rpm);
            // Leave the motor running
            session.release();
            return Ok(());
        }
        Cmd::Position { deg, speed } => {
            let outcome = session.set_position(deg, speed)?;
            print_warnings(&outcome);
            let route = outcome.value();
            println!(
                "Move {:+.2}° (from {:.2}° to {:.2}°), target {}",
                route.delta_deg,
                route.from_deg(),
                route.to_deg(),
                route.target_raw
            );
            // Leave the position loop holding the target
            session.release();
            return Ok(());
        }
        Cmd::Read { raw } => {
            let outcome = session.get_position(raw)?;
            print_warnings(&outcome);
            println!("{:.2}", outcome.value());
            session.release();
            return Ok(());
        }
        Cmd::Stop => {
            print_warnings(&session.stop()?);
        }
        Cmd::Bridge => return Err("bridge runs on the async runtime".into()),
    }

    session.close();
    Ok(())
}

fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init(); // installs the subscriber globally

    let cli = Cli::parse();
    let cmd = cli.command.as_ref().unwrap_or(&Cmd::Console);

    let result = match cmd {
        Cmd::Bridge => tokio::runtime::Runtime::new()
            .map_err(Into::into)
            .and_then(|rt| {
                rt.block_on(roller_link::runtime::run(
                    cli.serial_config(),
                    cli.session_config(),
                ))
            }),
        other => run_once(&cli, other),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
