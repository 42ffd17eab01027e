//! Scene-tunable constants.
//!
//! Every field has a default matching the stock 2x2-parcel scene, so an
//! empty JSON object (or no file at all) yields a playable configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::math::Vec3;

/// Size of one parcel edge in metres.
pub const PARCEL_SIZE: f32 = 16.0;

/// Fixed timestep for physics simulation (60Hz).
pub const PHYSICS_DT: f32 = 1.0 / 60.0;

/// Tunables for the disc, its arena and the sync protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscConfig {
    /// Physics sub-step length in seconds.
    pub fixed_dt: f32,
    /// Upper bound on sub-steps per frame; leftover time is dropped.
    pub max_substeps: u32,
    /// Impulse magnitude applied along the throw direction.
    pub launch_speed: f32,
    /// Catches above this height are spectacular regardless of ground contact.
    pub high_catch_threshold: f32,
    /// Seconds between keep-alive pings.
    pub heartbeat_interval: f64,
    /// Seconds between pose broadcasts from the holder.
    pub resync_interval: f64,
    /// Where the disc sits relative to the viewpoint while held.
    pub hold_offset: Vec3,
    /// Catch reach. Compared as `distance² < catch_distance³`.
    pub catch_distance: f32,
    /// Reach for grabbing a disc nobody holds.
    pub grab_distance: f32,
    pub spawn_position: Vec3,
    pub disc_radius: f32,
    /// Mass in kilograms.
    pub disc_mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Height of the top of the ground slab.
    pub ground_height: f32,
    /// Arena footprint in parcels along x and z.
    pub parcels: (u32, u32),
    pub ground_restitution: f32,
    pub wall_restitution: f32,
    /// Vertical gravity in m/s².
    pub gravity: f32,
}

impl Default for DiscConfig {
    fn default() -> Self {
        Self {
            fixed_dt: PHYSICS_DT,
            max_substeps: 3,
            launch_speed: 50.0,
            high_catch_threshold: 1.5,
            heartbeat_interval: 10.0,
            resync_interval: 5.0,
            hold_offset: Vec3::new(0.0, 0.5, 1.0),
            catch_distance: 4.0,
            grab_distance: 6.0,
            spawn_position: Vec3::new(8.0, 0.49, 8.0),
            disc_radius: 0.2,
            disc_mass: 1.25,
            linear_damping: 0.4,
            angular_damping: 0.4,
            ground_height: 0.17,
            parcels: (2, 2),
            ground_restitution: 0.8,
            wall_restitution: 0.55,
            gravity: -9.82,
        }
    }
}

impl DiscConfig {
    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_dt > 0.0) {
            return Err(ConfigError::Invalid("fixed_dt must be positive"));
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::Invalid("max_substeps must be at least 1"));
        }
        if !(self.heartbeat_interval > 0.0) || !(self.resync_interval > 0.0) {
            return Err(ConfigError::Invalid("intervals must be positive"));
        }
        if !(self.disc_radius > 0.0) || !(self.disc_mass > 0.0) {
            return Err(ConfigError::Invalid("disc radius and mass must be positive"));
        }
        if self.parcels.0 == 0 || self.parcels.1 == 0 {
            return Err(ConfigError::Invalid("arena needs at least one parcel per side"));
        }
        Ok(())
    }

    /// Arena extent along x and z in metres.
    #[allow(clippy::cast_precision_loss)]
    pub fn arena_size(&self) -> (f32, f32) {
        (
            self.parcels.0 as f32 * PARCEL_SIZE,
            self.parcels.1 as f32 * PARCEL_SIZE,
        )
    }

    /// Squared-distance bound for a mid-air pick-up.
    pub fn catch_reach_squared(&self) -> f32 {
        self.catch_distance.powi(3)
    }

    pub fn grab_reach_squared(&self) -> f32 {
        self.grab_distance * self.grab_distance
    }
}
