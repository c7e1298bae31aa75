// Zenoh bridge: remote commands in, motor status out
//
// The session blocks (settles, ramps, timed moves), so it lives on its own
// worker thread. The async loop drains commands, forwards them, and publishes
// the latest status at a fixed rate. A stop command also trips the cancel
// token so it does not wait behind a running timed move, and discards the
// motion commands still queued ahead of it.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::time::interval;
use tracing::{info, warn};

// local imports
use crate::config::{SerialConfig, SessionConfig, LOOP_HZ, TOPIC_CMD, TOPIC_HEALTH, TOPIC_STATE};
use crate::messages::{BridgeHealth, MotorCommand, MotorStatus};
use crate::motor::{CancelToken, Clock, MotorSession, RollerError, Transport};

/// What the worker sends back after each command
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub status: MotorStatus,
    /// `None` when the command was rejected before any I/O
    pub health: Option<BridgeHealth>,
}

/// Latest state known to the publishing side
pub struct Bridge {
    status: MotorStatus,
    health: BridgeHealth,
}

impl Bridge {
    pub fn new() -> Self {
        Self {
            status: MotorStatus::default(),
            health: BridgeHealth::Ok,
        }
    }

    /// Fold a worker report into the published state
    fn on_report(&mut self, report: WorkerReport) {
        if let Some(health) = report.health {
            if health != self.health {
                info!("Bridge health: {:?} -> {:?}", self.health, health);
            }
            self.health = health;
        }
        self.status = report.status;
    }

    pub fn status(&self) -> &MotorStatus {
        &self.status
    }

    pub fn health(&self) -> BridgeHealth {
        self.health
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one bridge command against the session; `Ok(true)` means degraded
pub fn execute<T: Transport, C: Clock>(
    session: &mut MotorSession<T, C>,
    cmd: MotorCommand,
) -> Result<bool, RollerError> {
    let degraded = match cmd {
        MotorCommand::SetSpeed { rpm } => session.set_speed(rpm)?.is_degraded(),
        MotorCommand::Spin { rpm } => session.spin(rpm)?.is_degraded(),
        MotorCommand::MoveFor { rpm, secs } => {
            let duration = Duration::try_from_secs_f64(secs).map_err(|_| {
                RollerError::InputContract(format!("invalid move duration {} s", secs))
            })?;
            session.move_for(rpm, duration)?.is_degraded()
        }
        MotorCommand::SetPosition { deg, speed_rpm } => {
            session.set_position(deg, speed_rpm)?.is_degraded()
        }
        MotorCommand::Stop => session.stop()?.is_degraded(),
        MotorCommand::Read => {
            let position = session.get_position(false)?;
            let speed = session.get_speed()?;
            position.is_degraded() || speed.is_degraded()
        }
    };
    Ok(degraded)
}

/// Drop the motion commands queued ahead of the last `Stop`; reads are kept
fn drop_superseded(pending: &mut VecDeque<MotorCommand>) {
    let Some(last_stop) = pending.iter().rposition(|c| *c == MotorCommand::Stop) else {
        return;
    };
    let before = pending.len();
    let mut idx = 0;
    pending.retain(|c| {
        let keep = idx >= last_stop || *c == MotorCommand::Read;
        idx += 1;
        keep
    });
    if pending.len() < before {
        info!("Stop discarded {} queued command(s)", before - pending.len());
    }
}

/// Worker thread body: execute commands in order until the sender goes away
pub fn worker_loop<T: Transport, C: Clock>(
    mut session: MotorSession<T, C>,
    commands: mpsc::Receiver<MotorCommand>,
    reports: UnboundedSender<WorkerReport>,
) {
    let mut pending = VecDeque::new();
    loop {
        if pending.is_empty() {
            match commands.recv() {
                Ok(cmd) => pending.push_back(cmd),
                Err(_) => break,
            }
        }
        pending.extend(commands.try_iter());
        drop_superseded(&mut pending);
        let Some(cmd) = pending.pop_front() else {
            break;
        };

        let health = match execute(&mut session, cmd) {
            Ok(false) => Some(BridgeHealth::Ok),
            Ok(true) => Some(BridgeHealth::Degraded),
            Err(e) if e.is_transport() => {
                warn!("Motor link failure: {}", e);
                Some(BridgeHealth::LinkDown)
            }
            Err(e) => {
                warn!("Rejected command: {}", e);
                None
            }
        };

        let report = WorkerReport {
            status: session.status(),
            health,
        };
        if reports.send(report).is_err() {
            break;
        }
    }
    session.close();
}

pub async fn run(
    serial: SerialConfig,
    config: SessionConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cancel = CancelToken::new();
    let session = MotorSession::open(&serial, config)?.with_cancel_token(cancel.clone());

    let (cmd_tx, cmd_rx) = mpsc::channel::<MotorCommand>();
    let (report_tx, mut report_rx) = unbounded_channel::<WorkerReport>();
    let worker = std::thread::spawn(move || worker_loop(session, cmd_rx, report_tx));

    info!("Opening Zenoh session...");
    let zenoh_session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let subscriber = zenoh_session.declare_subscriber(TOPIC_CMD).await?;
    let pub_state = zenoh_session.declare_publisher(TOPIC_STATE).await?;
    let pub_health = zenoh_session.declare_publisher(TOPIC_HEALTH).await?;

    let mut bridge = Bridge::new();
    let mut tick = interval(Duration::from_millis(1000 / LOOP_HZ));

    info!("Bridge started: {}Hz loop on {}", LOOP_HZ, serial.port);
    info!("Subscribed to: {}", TOPIC_CMD);
    info!("Publishing to: {}, {}", TOPIC_STATE, TOPIC_HEALTH);

    loop {
        tick.tick().await;

        // 1. Drain all pending commands (non-blocking), forward in order
        while let Ok(Some(sample)) = subscriber.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<MotorCommand>(&payload) {
                Ok(cmd) => {
                    info!("Received command: {:?}", &cmd);
                    if cmd == MotorCommand::Stop {
                        cancel.cancel();
                    }
                    if cmd_tx.send(cmd).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to parse command: {}", e);
                }
            }
        }

        // 2. Fold in whatever the worker finished since the last tick
        while let Ok(report) = report_rx.try_recv() {
            bridge.on_report(report);
        }
        if worker.is_finished() {
            warn!("Motor worker exited, shutting down bridge");
            return Err("motor worker exited".into());
        }

        // 3. Publish status
        let status_json = serde_json::to_string(bridge.status())?;
        pub_state.put(status_json).await?;

        // 4. Publish health
        let health_json = serde_json::to_string(&bridge.health())?;
        pub_health.put(health_json).await?;
    }
}
