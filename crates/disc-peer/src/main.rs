//! Disc peer
//!
//! A headless participant: joins a room through the relay, turns stdin
//! commands into input actions and runs the frame loop at 60 Hz.

mod commands;
mod config;
mod ws;

use std::f32::consts::PI;
use std::time::Instant;

use disc_core::{
    FeedbackDisplay, FrameEvent, FrameReport, Identity, InputAction, Quat, Session, Viewpoint,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::Command;
use crate::ws::WsTransport;

/// Logs go to stderr so they don't interleave with typed commands. The
/// peer opens no spans, so JSON lines are flat events.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("disc_peer=info,disc_core=info"));
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json")) {
        fmt.json().init();
    } else {
        fmt.compact().init();
    }
}

/// Local player's camera, turned by yaw only.
struct Camera {
    viewpoint: Viewpoint,
    yaw: f32,
}

impl Camera {
    fn turn(&mut self, degrees: f32) {
        self.yaw = (self.yaw + degrees.to_radians()).rem_euclid(2.0 * PI);
        self.viewpoint.rotation = Quat::from_rotation_y(self.yaw);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let identity = Identity::new(config::display_name(), config::room());
    let user = identity.session_user(&mut rand::rng());
    let url = identity.channel_url(&config::server_url());
    let disc_config = config::disc_config()?;

    let (transport, mut inbound) = ws::connect(&url).await?;
    let mut session = Session::new(user, disc_config, transport);
    let mut camera = Camera {
        viewpoint: Viewpoint::new(config::START_POSITION, Quat::IDENTITY),
        yaw: 0.0,
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(config::FRAME_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut pending: Vec<FrameEvent> = Vec::new();
    let mut last_frame = Instant::now();
    let mut last_report: Option<FrameReport> = None;
    let mut stdin_open = true;
    let mut inbound_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let dt = now.duration_since(last_frame).as_secs_f32();
                last_frame = now;

                let report = session.frame(dt, &camera.viewpoint, pending.drain(..));
                log_changes(last_report.as_ref(), &report);
                last_report = Some(report);
            }
            event = inbound.recv(), if inbound_open => match event {
                Some(event) => pending.push(event),
                None => inbound_open = false,
            },
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match commands::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => apply(command, &mut camera, &mut pending, &session),
                    Err(commands::CommandError::Empty) => {}
                    Err(err) => warn!(%err, "bad command"),
                },
                Ok(None) => stdin_open = false,
                Err(err) => {
                    warn!(error = %err, "stdin closed");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    session.teardown();
    Ok(())
}

fn apply(
    command: Command,
    camera: &mut Camera,
    pending: &mut Vec<FrameEvent>,
    session: &Session<WsTransport>,
) {
    match command {
        Command::PickUp => pending.push(FrameEvent::Input(InputAction::PickUp)),
        Command::Grab => pending.push(FrameEvent::Input(InputAction::Grab)),
        Command::Throw(direction) => {
            let direction = direction.unwrap_or_else(|| camera.viewpoint.forward());
            pending.push(FrameEvent::Input(InputAction::Throw { direction }));
        }
        Command::MoveTo(position) => camera.viewpoint.position = position,
        Command::Turn { degrees } => camera.turn(degrees),
        Command::Status => {
            let disc = session.disc();
            info!(
                user = session.user(),
                ownership = ?disc.ownership(),
                position = ?disc.pose().position,
                streak = disc.streak(),
                touched_ground = disc.touched_ground(),
                degraded = session.is_degraded(),
                frame = session.world().current_frame(),
                hash = session.world().compute_hash(),
                viewpoint = ?camera.viewpoint.position,
                "status"
            );
        }
        Command::Quit => {}
    }
}

/// Log what the UI would show: feedback texts, ownership and streak changes.
fn log_changes(previous: Option<&FrameReport>, report: &FrameReport) {
    for feedback in &report.feedback {
        let Some(text) = feedback.text() else {
            continue;
        };
        match feedback.display() {
            FeedbackDisplay::Announcement => info!(outcome = %feedback.outcome, "{text}"),
            FeedbackDisplay::FloatingText => {
                info!(outcome = %feedback.outcome, at = ?feedback.at, "{text}");
            }
        }
    }

    let Some(previous) = previous else {
        return;
    };
    if previous.ownership != report.ownership {
        info!(from = ?previous.ownership, to = ?report.ownership, "ownership changed");
    }
    if previous.streak != report.streak {
        info!(streak = report.streak, "streak");
    }
    if previous.catch_hint != report.catch_hint && report.catch_hint {
        info!("Catch it!");
    }
}
