use std::{env, time::Duration};

use anyhow::Context;
use disc_core::{DiscConfig, Vec3};

// Runtime settings, read from the environment (and `.env`).

pub fn server_url() -> String {
    env::var("DISC_SERVER_URL").unwrap_or_else(|_| "ws://127.0.0.1:3000/broadcast/".to_string())
}

pub fn display_name() -> String {
    env::var("DISC_DISPLAY_NAME").unwrap_or_else(|_| "guest".to_string())
}

pub fn room() -> String {
    env::var("DISC_ROOM").unwrap_or_else(|_| "plaza".to_string())
}

/// Scene tunables from the JSON file named by `DISC_CONFIG`, or defaults.
pub fn disc_config() -> anyhow::Result<DiscConfig> {
    match env::var("DISC_CONFIG") {
        Ok(path) => DiscConfig::load(&path).with_context(|| format!("loading {path}")),
        Err(_) => Ok(DiscConfig::default()),
    }
}

pub const FRAME_INTERVAL: Duration = Duration::from_millis(1000 / 60);

/// Where the local viewpoint starts, a couple of metres from the spawn.
pub const START_POSITION: Vec3 = Vec3::new(8.0, 1.6, 6.0);
